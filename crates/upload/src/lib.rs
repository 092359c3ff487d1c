//! Asset upload and mint submission.
//!
//! This crate implements the **client-side engine** that takes one file
//! from the caller to the minting pipeline. The backend is reached through
//! the [`MintBackend`] trait; [`HttpMintBackend`] is the production
//! implementation and tests substitute mocks.
//!
//! # Pipeline
//!
//! 1. **Validate**: size, MIME category, metadata, editions, collection id
//! 2. **Prepare**: request a file id and pre-signed part URLs
//! 3. **Process**: read the payload and split it into chunks
//! 4. **Upload**: PUT each chunk in order, retrying transient failures
//! 5. **Finalize**: hand the ordered ETags to the backend
//! 6. **Request mint**: submit the file with its metadata attributes

pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod orchestrator;
pub mod progress;
pub mod types;
pub mod validation;

// Re-export primary types for convenience.
pub use backend::{BackendError, MintBackend};
pub use config::{ClientConfig, ConfigError};
pub use error::{ErrorKind, RpcOperation, UploadError};
pub use http::HttpMintBackend;
pub use identity::{
    DeviceIdentity, FileIdentityStore, IdentityError, IdentityStore, MemoryIdentityStore,
};
pub use orchestrator::UploadOrchestrator;
pub use progress::{Counters, STAGE_RANGES, to_progress};
pub use types::{AssetMetadata, ProgressCallback, UploadRequest, UploadResult};
pub use validation::{ValidationError, validate_request};
