//! Request and result types for an upload run.

use std::sync::Arc;

use assetmint_protocol::types::UploadProgress;
use assetmint_transfer::ByteSource;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Callback receiving every progress emission, invoked synchronously.
pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// Descriptive metadata of an asset.
///
/// Serialized as JSON into the prepare request's `metadata` string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl AssetMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Everything one `upload()` call needs.
#[derive(Clone)]
pub struct UploadRequest {
    pub payload: Arc<dyn ByteSource>,
    pub collection_id: String,
    pub metadata: AssetMetadata,
    /// Edition count; `None` means one edition.
    pub editions: Option<u32>,
    pub share_with_community: bool,
    pub disable_thumbnail: bool,
    pub private: bool,
    pub on_progress: Option<ProgressCallback>,
    pub cancel: Option<CancellationToken>,
}

impl UploadRequest {
    pub fn new(
        payload: Arc<dyn ByteSource>,
        collection_id: impl Into<String>,
        metadata: AssetMetadata,
    ) -> Self {
        Self {
            payload,
            collection_id: collection_id.into(),
            metadata,
            editions: None,
            share_with_community: false,
            disable_thumbnail: false,
            private: false,
            on_progress: None,
            cancel: None,
        }
    }

    pub fn with_editions(mut self, editions: u32) -> Self {
        self.editions = Some(editions);
        self
    }

    pub fn with_share_with_community(mut self, share: bool) -> Self {
        self.share_with_community = share;
        self
    }

    pub fn with_disable_thumbnail(mut self, disable: bool) -> Self {
        self.disable_thumbnail = disable;
        self
    }

    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

impl std::fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadRequest")
            .field("payload_len", &self.payload.len())
            .field("mime_type", &self.payload.mime_type())
            .field("collection_id", &self.collection_id)
            .field("metadata", &self.metadata)
            .field("editions", &self.editions)
            .field("share_with_community", &self.share_with_community)
            .field("disable_thumbnail", &self.disable_thumbnail)
            .field("private", &self.private)
            .finish_non_exhaustive()
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub file_id: String,
    pub upload_id: String,
    pub mint_status: String,
    pub contract_address: Option<String>,
    pub token_id: Option<String>,
}
