//! Backend RPC seam.

use std::future::Future;
use std::pin::Pin;

use assetmint_protocol::messages::{
    CompleteUploadRequest, CompleteUploadResponse, PrepareUploadRequest, PrepareUploadResponse,
    StartMintRequest, StartMintResponse,
};

/// Boxed future returned by [`MintBackend`] methods.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BackendError>> + Send + 'a>>;

/// Errors from a backend RPC.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid API key")]
    InvalidKey,

    /// The backend answered but the answer is unusable.
    #[error("{0}")]
    Rejected(String),
}

/// The three backend operations an upload needs.
///
/// [`HttpMintBackend`](crate::http::HttpMintBackend) talks to the real
/// service; tests implement this trait with in-memory mocks.
pub trait MintBackend: Send + Sync {
    /// Reserves an upload slot and pre-signed part URLs.
    fn prepare_upload<'a>(
        &'a self,
        request: &'a PrepareUploadRequest,
    ) -> BackendFuture<'a, PrepareUploadResponse>;

    /// Finalizes the multi-part upload with the ordered part tokens.
    fn complete_upload<'a>(
        &'a self,
        request: &'a CompleteUploadRequest,
    ) -> BackendFuture<'a, CompleteUploadResponse>;

    /// Submits the uploaded file to the minting pipeline.
    fn start_mint<'a>(&'a self, request: &'a StartMintRequest)
    -> BackendFuture<'a, StartMintResponse>;
}
