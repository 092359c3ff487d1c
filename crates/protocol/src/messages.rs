use serde::{Deserialize, Serialize};

use crate::constants::COMPLETE_SUCCESS;
use crate::types::{ContentCategory, MintMetadata, UploadSource};

// ---------------------------------------------------------------------------
// Prepare
// ---------------------------------------------------------------------------

/// Requests upload slots for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareUploadRequest {
    pub device_id: String,
    /// Asset metadata serialized as a JSON string.
    pub metadata: String,
    pub category: ContentCategory,
    pub source: UploadSource,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
}

/// One pre-signed PUT target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedPart {
    /// 1-based part index.
    pub part_number: u32,
    pub url: String,
}

/// Upload slot issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareUploadResponse {
    #[serde(default)]
    pub file_id: String,
    #[serde(default)]
    pub upload_id: String,
    pub chunk_count: u32,
    pub chunk_size: u64,
    #[serde(default)]
    pub parts: Vec<PresignedPart>,
}

// ---------------------------------------------------------------------------
// Complete
// ---------------------------------------------------------------------------

/// Integrity token of one uploaded part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedPart {
    pub part_number: u32,
    pub e_tag: String,
}

/// Finalizes a multi-part upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteUploadRequest {
    pub file_id: String,
    pub mime_type: String,
    /// Every part, ordered by part number.
    pub chunks: Vec<CompletedPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_thumbnail: Option<bool>,
}

/// Result of the complete operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteUploadResponse {
    #[serde(default)]
    pub status: String,
}

impl CompleteUploadResponse {
    /// Returns `true` only for an explicit success status.
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case(COMPLETE_SUCCESS)
    }
}

// ---------------------------------------------------------------------------
// Start mint
// ---------------------------------------------------------------------------

/// Hands an uploaded file to the minting pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMintRequest {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_with_community: Option<bool>,
    pub metadata: MintMetadata,
}

/// Result of the start-mint operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMintResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}
