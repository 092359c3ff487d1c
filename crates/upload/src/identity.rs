//! Device identity and its persistence.
//!
//! The identity is a UUID generated once per installation and reused for
//! every prepare request. Where it is stored is the caller's choice.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors from identity persistence.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage for the device identifier.
pub trait IdentityStore: Send + Sync {
    /// Returns the stored identifier, if any.
    fn get(&self) -> Result<Option<String>, IdentityError>;

    /// Stores `device_id`, replacing any previous value.
    fn set(&self, device_id: &str) -> Result<(), IdentityError>;

    /// Forgets the stored identifier.
    fn clear(&self) -> Result<(), IdentityError>;
}

/// Opaque per-installation device identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceIdentity(String);

impl DeviceIdentity {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self(device_id.into())
    }

    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the stored identity, generating and storing one when the
    /// store is empty.
    pub fn load_or_create(store: &dyn IdentityStore) -> Result<Self, IdentityError> {
        if let Some(existing) = store.get()?
            && !existing.trim().is_empty()
        {
            return Ok(Self(existing));
        }
        let identity = Self::generate();
        store.set(&identity.0)?;
        debug!(device_id = %identity.0, "generated device identity");
        Ok(identity)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// FileIdentityStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device_id: Option<String>,
}

/// Identity persisted to a JSON file and cached in memory.
pub struct FileIdentityStore {
    path: PathBuf,
    cached: RwLock<Option<String>>,
}

impl FileIdentityStore {
    /// Opens the store, loading an existing identity from disk.
    pub fn new(path: PathBuf) -> Result<Self, IdentityError> {
        let cached = load_identity(&path)?;
        Ok(Self {
            path,
            cached: RwLock::new(cached),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, device_id: Option<&str>) -> Result<(), IdentityError> {
        let file = IdentityFile {
            device_id: device_id.map(str::to_string),
        };
        let json = serde_json::to_string_pretty(&file)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        debug!("persisted device identity to {:?}", self.path);
        Ok(())
    }
}

impl IdentityStore for FileIdentityStore {
    fn get(&self) -> Result<Option<String>, IdentityError> {
        Ok(self
            .cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn set(&self, device_id: &str) -> Result<(), IdentityError> {
        self.persist(Some(device_id))?;
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = Some(device_id.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), IdentityError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

fn load_identity(path: &Path) -> Result<Option<String>, IdentityError> {
    if !path.exists() {
        return Ok(None);
    }
    let data = std::fs::read_to_string(path)?;
    let file: IdentityFile = serde_json::from_str(&data)?;
    Ok(file.device_id)
}

/// Returns the default identity file path.
pub fn default_identity_path() -> Option<PathBuf> {
    crate::config::default_config_dir().map(|d| d.join("device.json"))
}

// ---------------------------------------------------------------------------
// MemoryIdentityStore
// ---------------------------------------------------------------------------

/// Process-local identity store.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    device_id: Mutex<Option<String>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self) -> Result<Option<String>, IdentityError> {
        Ok(self
            .device_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn set(&self, device_id: &str) -> Result<(), IdentityError> {
        *self.device_id.lock().unwrap_or_else(PoisonError::into_inner) = Some(device_id.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), IdentityError> {
        *self.device_id.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
