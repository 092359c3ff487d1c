//! Pre-network request validation.
//!
//! Runs before any backend call and is never retried.

use assetmint_protocol::constants::MAX_PAYLOAD_SIZE;
use assetmint_protocol::types::ContentCategory;

use crate::types::UploadRequest;

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 120;
pub const DESCRIPTION_MAX_CHARS: usize = 255;
pub const LOCATION_MAX_CHARS: usize = 100;
pub const EDITIONS_MIN: u32 = 1;
pub const EDITIONS_MAX: u32 = 1000;

/// Reasons a request is rejected before reaching the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("payload is empty")]
    EmptyPayload,

    #[error("payload is {size} bytes, the limit is {max} bytes")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("unsupported content type: {0}")]
    UnsupportedType(String),

    #[error("title must be {min}-{max} characters, got {len}")]
    TitleLength { len: usize, min: usize, max: usize },

    #[error("description must be at most {max} characters, got {len}")]
    DescriptionTooLong { len: usize, max: usize },

    #[error("location must be at most {max} characters, got {len}")]
    LocationTooLong { len: usize, max: usize },

    #[error("editions must be between {min} and {max}, got {value}")]
    EditionsOutOfRange { value: u32, min: u32, max: u32 },

    #[error("collection id is required")]
    MissingCollection,
}

impl ValidationError {
    /// Returns `true` for payload size failures.
    pub fn is_size(&self) -> bool {
        matches!(self, Self::EmptyPayload | Self::PayloadTooLarge { .. })
    }
}

/// Validates `request` and returns the content category of its payload.
///
/// Lengths are counted in characters, not bytes.
pub fn validate_request(request: &UploadRequest) -> Result<ContentCategory, ValidationError> {
    let size = request.payload.len();
    if size == 0 {
        return Err(ValidationError::EmptyPayload);
    }
    if size > MAX_PAYLOAD_SIZE {
        return Err(ValidationError::PayloadTooLarge {
            size,
            max: MAX_PAYLOAD_SIZE,
        });
    }

    let mime_type = request.payload.mime_type();
    let category = ContentCategory::from_mime(mime_type)
        .ok_or_else(|| ValidationError::UnsupportedType(mime_type.to_string()))?;

    let title_len = request.metadata.title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title_len) {
        return Err(ValidationError::TitleLength {
            len: title_len,
            min: TITLE_MIN_CHARS,
            max: TITLE_MAX_CHARS,
        });
    }

    if let Some(description) = &request.metadata.description {
        let len = description.chars().count();
        if len > DESCRIPTION_MAX_CHARS {
            return Err(ValidationError::DescriptionTooLong {
                len,
                max: DESCRIPTION_MAX_CHARS,
            });
        }
    }

    if let Some(location) = &request.metadata.location {
        let len = location.chars().count();
        if len > LOCATION_MAX_CHARS {
            return Err(ValidationError::LocationTooLong {
                len,
                max: LOCATION_MAX_CHARS,
            });
        }
    }

    if let Some(value) = request.editions
        && !(EDITIONS_MIN..=EDITIONS_MAX).contains(&value)
    {
        return Err(ValidationError::EditionsOutOfRange {
            value,
            min: EDITIONS_MIN,
            max: EDITIONS_MAX,
        });
    }

    if request.collection_id.trim().is_empty() {
        return Err(ValidationError::MissingCollection);
    }

    Ok(category)
}
