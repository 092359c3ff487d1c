/// SDK identity reported in the `appName` mint attribute.
pub const APP_NAME: &str = "assetmint";

/// SDK version reported in the `appVersion` mint attribute.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest payload accepted for upload (100 MiB).
pub const MAX_PAYLOAD_SIZE: u64 = 100 * 1024 * 1024;

/// Content type sent with every chunk PUT.
pub const CHUNK_CONTENT_TYPE: &str = "application/octet-stream";

/// Backend route for the prepare operation.
pub const PREPARE_PATH: &str = "/uploads/prepare";

/// Backend route for the complete operation.
pub const COMPLETE_PATH: &str = "/uploads/complete";

/// Backend route for the start-mint operation.
pub const MINT_PATH: &str = "/mints";

/// Status string the complete operation returns on success.
pub const COMPLETE_SUCCESS: &str = "success";
