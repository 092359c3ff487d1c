use serde::{Deserialize, Serialize};

/// Content category the backend files an asset under.
///
/// GIFs are their own category even though they are `image/*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Image,
    Video,
    Gif,
}

impl ContentCategory {
    /// Detects the category from a MIME type.
    ///
    /// Matching ignores case and any `;` parameters. Returns `None` for
    /// anything that is not an image or video.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == "image/gif" {
            Some(Self::Gif)
        } else if essence.len() > "image/".len() && essence.starts_with("image/") {
            Some(Self::Image)
        } else if essence.len() > "video/".len() && essence.starts_with("video/") {
            Some(Self::Video)
        } else {
            None
        }
    }

    /// Wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Gif => "gif",
        }
    }
}

/// Origin of an asset. The SDK only ever sends `upload`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadSource {
    #[default]
    Upload,
}

/// Stage of a single upload run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validating,
    Preparing,
    Processing,
    Uploading,
    Finalizing,
    RequestingMint,
    Done,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Stage; 7] = [
        Stage::Validating,
        Stage::Preparing,
        Stage::Processing,
        Stage::Uploading,
        Stage::Finalizing,
        Stage::RequestingMint,
        Stage::Done,
    ];
}

/// Progress record handed to the caller's callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub stage: Stage,
    /// Overall progress, 0-100.
    pub percent: u8,
    pub uploaded_chunks: u32,
    pub total_chunks: u32,
    /// 1-based index of the chunk being worked on (0 before chunking).
    pub current_chunk: u32,
    pub status: String,
    /// Progress of the in-flight chunk, 0-100. Only set while uploading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_progress: Option<u8>,
}

/// Value type tag of a mint metadata attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    #[default]
    String,
    Number,
    Boolean,
}

/// A single `{key, value, type}` entry in the mint metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataAttribute {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
}

impl MetadataAttribute {
    /// Creates a string-typed attribute.
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            attr_type: AttributeType::String,
        }
    }
}

/// Metadata block of a start-mint request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintMetadata {
    pub attributes: Vec<MetadataAttribute>,
}

impl MintMetadata {
    /// Returns the value of the first attribute named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}
