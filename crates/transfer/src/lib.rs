//! Chunked transfer of a single asset to pre-signed storage URLs.
//!
//! - [`ByteSource`] abstracts the payload (in-memory or file-backed).
//! - [`plan_chunks`] turns a backend upload slot into byte ranges.
//! - [`ChunkTransport`] PUTs one chunk with bounded retry, backoff and
//!   cancellation, returning the part's integrity token (ETag).

mod chunked;
mod http;
mod source;
mod transport;

pub use chunked::{Chunk, ChunkResult, plan_chunks};
pub use http::ReqwestChunkSink;
pub use source::{ByteSource, FileSource, MemorySource, mime_from_path};
pub use transport::{
    ByteProgress, ChunkProgress, ChunkSink, ChunkTransport, Headers, RetryPolicy,
    extract_integrity_token,
};

/// Size of the body frames streamed by [`ReqwestChunkSink`] (64 KiB).
///
/// Byte-level progress is reported once per frame.
pub const PROGRESS_FRAME_SIZE: usize = 64 * 1024;

/// Why a single PUT attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
    /// The transport aborted the request because of cancellation.
    #[error("aborted")]
    Aborted,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    /// The response carried no usable ETag header.
    #[error("missing integrity token")]
    MissingIntegrityToken,
}

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cancelled")]
    Cancelled,

    #[error("chunk upload failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: AttemptError },

    #[error("invalid chunk plan: {0}")]
    InvalidPlan(String),

    #[error("invalid byte range {start}..{end} for a source of {len} bytes")]
    InvalidRange { start: u64, end: u64, len: u64 },
}
