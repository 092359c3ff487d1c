//! Wire types shared by the assetmint upload client.
//!
//! Request and response payloads for the three backend operations
//! (prepare, complete, start-mint), plus the progress record emitted to
//! callers. All JSON is camelCase.

pub mod constants;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use messages::{
    CompleteUploadRequest, CompleteUploadResponse, CompletedPart, PrepareUploadRequest,
    PrepareUploadResponse, PresignedPart, StartMintRequest, StartMintResponse,
};
pub use types::{
    AttributeType, ContentCategory, MetadataAttribute, MintMetadata, Stage, UploadProgress,
    UploadSource,
};
