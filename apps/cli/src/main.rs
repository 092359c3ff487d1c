//! `assetmint`: uploads one file and requests its mint.
//!
//! Configuration comes from `--config` (or `~/.config/assetmint/config.json`)
//! with `ASSETMINT_API_URL`, `ASSETMINT_API_KEY` and
//! `ASSETMINT_TIMEOUT_SECS` taking precedence. Ctrl-C cancels the upload.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use assetmint_protocol::types::UploadProgress;
use assetmint_transfer::FileSource;
use assetmint_upload::{
    AssetMetadata, ClientConfig, ErrorKind, ProgressCallback, UploadOrchestrator, UploadRequest,
};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Exit status used when the upload is interrupted.
const EXIT_CANCELLED: i32 = 130;

#[derive(Parser, Debug)]
#[command(name = "assetmint", version, about = "Upload an asset and request its mint")]
struct Cli {
    /// File to upload (image, GIF or video)
    file: PathBuf,

    /// Asset title (3-120 characters)
    #[arg(long)]
    title: String,

    /// Target collection (contract) id
    #[arg(long)]
    collection: String,

    /// Asset description (up to 255 characters)
    #[arg(long)]
    description: Option<String>,

    /// Asset location (up to 100 characters)
    #[arg(long)]
    location: Option<String>,

    /// Number of editions to mint (1-1000)
    #[arg(long)]
    editions: Option<u32>,

    /// Override the MIME type inferred from the file extension
    #[arg(long)]
    mime: Option<String>,

    /// Keep the asset private
    #[arg(long)]
    private: bool,

    /// Share the asset with the community
    #[arg(long)]
    share: bool,

    /// Skip thumbnail generation
    #[arg(long)]
    no_thumbnail: bool,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn metadata(&self) -> AssetMetadata {
        AssetMetadata {
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,assetmint=debug")),
        )
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => ClientConfig::load_default().context("failed to read default config")?,
    };
    Ok(config.apply_env())
}

/// Prints a progress line whenever the percent or status changes.
fn stderr_progress() -> ProgressCallback {
    let last: Mutex<Option<(u8, String)>> = Mutex::new(None);
    Arc::new(move |p: UploadProgress| {
        let mut last = last.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let changed = last
            .as_ref()
            .is_none_or(|(percent, status)| *percent != p.percent || *status != p.status);
        if changed {
            eprintln!("[{:>3}%] {}", p.percent, p.status);
            *last = Some((p.percent, p.status));
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    let orchestrator =
        UploadOrchestrator::from_config(&config).context("failed to initialise uploader")?;

    let mut source = FileSource::open(&cli.file)
        .with_context(|| format!("failed to open {}", cli.file.display()))?;
    if let Some(mime) = &cli.mime {
        source = source.with_mime_type(mime.clone());
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, cancelling upload");
                cancel.cancel();
            }
        });
    }

    let mut request = UploadRequest::new(Arc::new(source), cli.collection.clone(), cli.metadata())
        .with_private(cli.private)
        .with_share_with_community(cli.share)
        .with_disable_thumbnail(cli.no_thumbnail)
        .with_progress(stderr_progress())
        .with_cancel(cancel);
    request.editions = cli.editions;

    match orchestrator.upload(request).await {
        Ok(result) => {
            println!("file id:     {}", result.file_id);
            println!("upload id:   {}", result.upload_id);
            println!("mint status: {}", result.mint_status);
            if let Some(address) = &result.contract_address {
                println!("contract:    {address}");
            }
            if let Some(token) = &result.token_id {
                println!("token id:    {token}");
            }
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::Cancelled => {
            eprintln!("upload cancelled");
            std::process::exit(EXIT_CANCELLED);
        }
        Err(e) => Err(e.into()),
    }
}
