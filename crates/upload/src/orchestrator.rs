//! Upload pipeline driver.
//!
//! [`UploadOrchestrator::upload`] runs one asset through every stage in
//! order and reports progress through the request's callback. All state
//! of a run lives on the call's stack, so one orchestrator can serve
//! concurrent uploads.

use std::future::Future;
use std::sync::Arc;

use assetmint_protocol::constants::{APP_NAME, APP_VERSION};
use assetmint_protocol::messages::{
    CompleteUploadRequest, CompletedPart, PrepareUploadRequest, PrepareUploadResponse,
    StartMintRequest,
};
use assetmint_protocol::types::{
    ContentCategory, MetadataAttribute, MintMetadata, Stage, UploadSource,
};
use assetmint_transfer::{
    ByteSource, Chunk, ChunkProgress, ChunkResult, ChunkTransport, ReqwestChunkSink, plan_chunks,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::{BackendError, MintBackend};
use crate::config::{ClientConfig, ConfigError};
use crate::error::{RpcOperation, UploadError};
use crate::http::HttpMintBackend;
use crate::identity::{DeviceIdentity, FileIdentityStore};
use crate::progress::{Counters, ProgressEmitter, to_progress};
use crate::types::{AssetMetadata, UploadRequest, UploadResult};
use crate::validation::validate_request;

/// Drives uploads against one backend with one chunk transport.
pub struct UploadOrchestrator {
    backend: Arc<dyn MintBackend>,
    transport: ChunkTransport,
    identity: DeviceIdentity,
    app_name: String,
    app_version: String,
}

impl UploadOrchestrator {
    pub fn new(
        backend: Arc<dyn MintBackend>,
        transport: ChunkTransport,
        identity: DeviceIdentity,
    ) -> Self {
        Self {
            backend,
            transport,
            identity,
            app_name: APP_NAME.into(),
            app_version: APP_VERSION.into(),
        }
    }

    /// Overrides the `appName` / `appVersion` mint attributes.
    pub fn with_app_identity(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.app_name = name.into();
        self.app_version = version.into();
        self
    }

    /// Wires the HTTP backend, the HTTP chunk sink and the persisted
    /// device identity from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let backend = HttpMintBackend::new(&config.api_url, &config.api_key, config.request_timeout)?;
        let sink = ReqwestChunkSink::new(config.request_timeout)?;

        let identity = match config.resolved_identity_path() {
            Some(path) => DeviceIdentity::load_or_create(&FileIdentityStore::new(path)?)?,
            None => {
                warn!("no config directory available, using an ephemeral device identity");
                DeviceIdentity::generate()
            }
        };

        Ok(Self::new(
            Arc::new(backend),
            ChunkTransport::new(Arc::new(sink)),
            identity,
        )
        .with_app_identity(&config.app_name, &config.app_version))
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Uploads one asset and requests its mint.
    ///
    /// Progress starts at 0 and ends at 100 on success. Cancellation is
    /// checked before every stage after validation and before every chunk,
    /// and is raced against every network wait.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadResult, UploadError> {
        let cancel = request.cancel.clone().unwrap_or_default();
        let emitter = Arc::new(ProgressEmitter::new(request.on_progress.clone()));
        let mut counters = Counters::default();

        // 1. Validate
        self.enter(&emitter, Stage::Validating, &counters);
        let category = validate_request(&request)?;
        let mime_type = request.payload.mime_type().to_string();

        // 2. Prepare
        check_cancelled(&cancel)?;
        self.enter(&emitter, Stage::Preparing, &counters);
        let slot = self.prepare(&request, category, &cancel).await?;
        let file_id = slot.file_id.clone();

        // 3. Process
        check_cancelled(&cancel)?;
        self.enter(&emitter, Stage::Processing, &counters);
        let buffer = materialize(&request.payload).await?;
        let chunks = plan_chunks(buffer.len() as u64, &slot)
            .map_err(|e| UploadError::from_transfer(0, e))?;
        counters.total_chunks = chunks.len() as u32;
        debug!(%file_id, chunks = chunks.len(), chunk_size = slot.chunk_size, "payload split");

        // 4. Upload
        let results = self
            .upload_chunks(&chunks, &buffer, &mut counters, &emitter, &cancel)
            .await?;
        drop(buffer);

        // 5. Finalize
        check_cancelled(&cancel)?;
        self.enter(&emitter, Stage::Finalizing, &counters);
        let complete = CompleteUploadRequest {
            file_id: file_id.clone(),
            mime_type,
            chunks: results.into_iter().map(CompletedPart::from).collect(),
            disable_thumbnail: Some(request.disable_thumbnail),
        };
        let completed = rpc(
            &cancel,
            RpcOperation::Complete,
            self.backend.complete_upload(&complete),
        )
        .await?;
        if !completed.is_success() {
            return Err(UploadError::rejected(
                RpcOperation::Complete,
                format!("unexpected status {:?}", completed.status),
            ));
        }

        // 6. Request mint
        check_cancelled(&cancel)?;
        self.enter(&emitter, Stage::RequestingMint, &counters);
        let mint = StartMintRequest {
            file_id: file_id.clone(),
            editions: Some(request.editions.unwrap_or(1)),
            contract_id: Some(request.collection_id.clone()),
            share_with_community: Some(request.share_with_community),
            metadata: MintMetadata {
                attributes: self.build_attributes(&request.metadata),
            },
        };
        let minted = rpc(&cancel, RpcOperation::StartMint, self.backend.start_mint(&mint)).await?;
        let mint_status = minted
            .status
            .filter(|s| !s.is_empty())
            .ok_or_else(|| UploadError::rejected(RpcOperation::StartMint, "missing mint status"))?;

        // 7. Done
        self.enter(&emitter, Stage::Done, &counters);
        info!(%file_id, status = %mint_status, "upload complete, mint requested");

        Ok(UploadResult {
            file_id,
            upload_id: slot.upload_id,
            mint_status,
            contract_address: minted.contract_address,
            token_id: minted.token_id,
        })
    }

    fn enter(&self, emitter: &ProgressEmitter, stage: Stage, counters: &Counters) {
        debug!(?stage, "entering stage");
        emitter.emit(to_progress(stage, counters));
    }

    async fn prepare(
        &self,
        request: &UploadRequest,
        category: ContentCategory,
        cancel: &CancellationToken,
    ) -> Result<PrepareUploadResponse, UploadError> {
        let metadata = serde_json::to_string(&request.metadata)
            .map_err(|e| UploadError::Unexpected(format!("failed to encode metadata: {e}")))?;

        let prepare = PrepareUploadRequest {
            device_id: self.identity.as_str().to_string(),
            metadata,
            category,
            source: UploadSource::Upload,
            size: request.payload.len(),
            private: Some(request.private),
        };

        let slot = rpc(cancel, RpcOperation::Prepare, self.backend.prepare_upload(&prepare)).await?;
        if slot.file_id.trim().is_empty() {
            return Err(UploadError::rejected(
                RpcOperation::Prepare,
                "response is missing fileId",
            ));
        }
        debug!(file_id = %slot.file_id, upload_id = %slot.upload_id, "upload slot reserved");
        Ok(slot)
    }

    /// Sends every chunk in ascending part order.
    ///
    /// Chunks go one at a time. A bounded-concurrency variant would have to
    /// re-sort the results by part number before completion.
    async fn upload_chunks(
        &self,
        chunks: &[Chunk],
        buffer: &[u8],
        counters: &mut Counters,
        emitter: &Arc<ProgressEmitter>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ChunkResult>, UploadError> {
        let mut results = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            check_cancelled(cancel)?;
            counters.current_chunk = chunk.part_number;
            counters.chunk_fraction = 0.0;
            self.enter(emitter, Stage::Uploading, counters);

            let on_progress: ChunkProgress = {
                let emitter = Arc::clone(emitter);
                let snapshot = *counters;
                Arc::new(move |fraction| {
                    let live = Counters {
                        chunk_fraction: fraction,
                        ..snapshot
                    };
                    emitter.emit(to_progress(Stage::Uploading, &live));
                })
            };

            debug!(part = chunk.part_number, bytes = chunk.len(), "uploading chunk");
            let integrity_token = self
                .transport
                .send(&chunk.url, &buffer[chunk.range()], Some(on_progress), cancel)
                .await
                .map_err(|e| UploadError::from_transfer(chunk.part_number, e))?;

            results.push(ChunkResult {
                part_number: chunk.part_number,
                integrity_token,
            });
            counters.uploaded_chunks += 1;
            emitter.emit(to_progress(Stage::Uploading, counters));
        }

        Ok(results)
    }

    fn build_attributes(&self, metadata: &AssetMetadata) -> Vec<MetadataAttribute> {
        let mut attributes = vec![MetadataAttribute::string("title", &metadata.title)];
        if let Some(description) = &metadata.description {
            attributes.push(MetadataAttribute::string("description", description));
        }
        if let Some(location) = &metadata.location {
            attributes.push(MetadataAttribute::string("location", location));
        }
        attributes.push(MetadataAttribute::string("appName", &self.app_name));
        attributes.push(MetadataAttribute::string("appVersion", &self.app_version));
        attributes
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<(), UploadError> {
    if cancel.is_cancelled() {
        return Err(UploadError::Cancelled);
    }
    Ok(())
}

/// Awaits a backend call unless the upload is cancelled first.
async fn rpc<T>(
    cancel: &CancellationToken,
    operation: RpcOperation,
    call: impl Future<Output = Result<T, BackendError>>,
) -> Result<T, UploadError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(UploadError::Cancelled),
        result = call => result.map_err(|e| {
            warn!(%operation, error = %e, "backend call failed");
            UploadError::upstream(operation, e)
        }),
    }
}

/// Reads the whole payload off the async runtime.
async fn materialize(payload: &Arc<dyn ByteSource>) -> Result<Vec<u8>, UploadError> {
    let source = Arc::clone(payload);
    let len = source.len();
    let bytes = tokio::task::spawn_blocking(move || source.read_range(0, len))
        .await
        .map_err(|e| UploadError::Unexpected(format!("payload read task failed: {e}")))?
        .map_err(|e| UploadError::Unexpected(e.to_string()))?;

    if bytes.len() as u64 != len {
        return Err(UploadError::Unexpected(format!(
            "payload changed size: expected {len} bytes, read {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}
