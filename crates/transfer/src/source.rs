use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::TransferError;

/// Payload of an upload: a byte source with a known length and MIME type.
///
/// Implementations are chosen at the boundary that knows the concrete
/// input (a file on disk, a buffer already in memory); the upload engine
/// only sees this trait. `read_range` may block.
pub trait ByteSource: Send + Sync {
    /// Total payload length in bytes.
    fn len(&self) -> u64;

    /// MIME type of the payload.
    fn mime_type(&self) -> &str;

    /// Reads bytes `[start, end)`.
    fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>, TransferError>;

    /// Returns `true` for a zero-length payload.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_range(start: u64, end: u64, len: u64) -> Result<(), TransferError> {
    if start > end || end > len {
        return Err(TransferError::InvalidRange { start, end, len });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// A payload already held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Vec<u8>,
    mime_type: String,
}

impl MemorySource {
    pub fn new(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }
}

impl ByteSource for MemorySource {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>, TransferError> {
        check_range(start, end, self.len())?;
        Ok(self.data[start as usize..end as usize].to_vec())
    }
}

// ---------------------------------------------------------------------------
// FileSource
// ---------------------------------------------------------------------------

/// A payload read from a local file.
///
/// The length is captured when the source is opened.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    len: u64,
    mime_type: String,
}

impl FileSource {
    /// Opens `path`, inferring the MIME type from its extension.
    ///
    /// Unknown extensions get `application/octet-stream`, which the
    /// upload validator rejects.
    pub fn open(path: &Path) -> Result<Self, TransferError> {
        let len = std::fs::metadata(path)?.len();
        let mime_type = mime_from_path(path)
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(Self {
            path: path.to_path_buf(),
            len,
            mime_type,
        })
    }

    /// Overrides the inferred MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>, TransferError> {
        check_range(start, end, self.len)?;
        let mut file = std::fs::File::open(&self.path)?;
        file.seek(SeekFrom::Start(start))?;
        let mut buf = vec![0u8; (end - start) as usize];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// Infers a MIME type from a file extension.
pub fn mime_from_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("png") => Some("image/png"),
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("webp") => Some("image/webp"),
        Some("gif") => Some("image/gif"),
        Some("avif") => Some("image/avif"),
        Some("svg") => Some("image/svg+xml"),
        Some("mp4" | "m4v") => Some("video/mp4"),
        Some("mov") => Some("video/quicktime"),
        Some("webm") => Some("video/webm"),
        _ => None,
    }
}
