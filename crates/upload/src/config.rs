//! Client configuration.
//!
//! Read from `~/.config/assetmint/config.json` (or an explicit path) and
//! overridable from the environment:
//! - `ASSETMINT_API_URL`
//! - `ASSETMINT_API_KEY`
//! - `ASSETMINT_TIMEOUT_SECS`

use std::path::{Path, PathBuf};
use std::time::Duration;

use assetmint_protocol::constants::{APP_NAME, APP_VERSION};
use serde::{Deserialize, Serialize};

use crate::backend::BackendError;
use crate::identity::IdentityError;

pub const ENV_API_URL: &str = "ASSETMINT_API_URL";
pub const ENV_API_KEY: &str = "ASSETMINT_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "ASSETMINT_TIMEOUT_SECS";

const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors building a client from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("transfer error: {0}")]
    Transfer(#[from] assetmint_transfer::TransferError),
}

/// On-disk shape of the config file. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    app_name: Option<String>,
    #[serde(default)]
    app_version: Option<String>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    identity_path: Option<PathBuf>,
}

/// Settings needed to talk to the upload API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL the RPC paths are appended to.
    pub api_url: String,
    /// Bearer token; empty sends no `Authorization` header.
    pub api_key: String,
    /// Reported as the `appName` mint attribute.
    pub app_name: String,
    /// Reported as the `appVersion` mint attribute.
    pub app_version: String,
    /// Per-request timeout for RPCs and chunk PUTs.
    pub request_timeout: Duration,
    /// Device identity file; `None` uses the default location.
    pub identity_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            api_key: String::new(),
            app_name: APP_NAME.into(),
            app_version: APP_VERSION.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            identity_path: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from `path`.
    ///
    /// A missing file yields the defaults. A file that fails to parse is
    /// logged and ignored.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if !path.exists() {
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<ConfigFile>(&content) {
            Ok(file) => config.merge(file),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
            }
        }
        Ok(config)
    }

    /// Loads from the default location, or defaults when no config
    /// directory can be resolved.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    fn merge(&mut self, file: ConfigFile) {
        if let Some(url) = file.api_url.filter(|s| !s.is_empty()) {
            self.api_url = url;
        }
        if let Some(key) = file.api_key {
            self.api_key = key;
        }
        if let Some(name) = file.app_name.filter(|s| !s.is_empty()) {
            self.app_name = name;
        }
        if let Some(version) = file.app_version.filter(|s| !s.is_empty()) {
            self.app_version = version;
        }
        if let Some(secs) = file.request_timeout_secs.filter(|&s| s > 0) {
            self.request_timeout = Duration::from_secs(secs);
        }
        if file.identity_path.is_some() {
            self.identity_path = file.identity_path;
        }
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|s| !s.is_empty()) {
            self.api_url = url;
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = key;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %raw, "ignoring invalid {ENV_TIMEOUT_SECS}"),
            }
        }
        self
    }

    /// Identity file to use: the configured one or the default location.
    pub fn resolved_identity_path(&self) -> Option<PathBuf> {
        self.identity_path
            .clone()
            .or_else(crate::identity::default_identity_path)
    }
}

/// Returns `<platform config dir>/assetmint`.
pub fn default_config_dir() -> Option<PathBuf> {
    platform_config_dir().map(|d| d.join("assetmint"))
}

/// Returns the default config file path.
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|d| d.join("config.json"))
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join(".config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.app_name, APP_NAME);
        assert_eq!(config.app_version, APP_VERSION);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.api_key.is_empty());
        assert!(config.identity_path.is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(&tmp.path().join("config.json")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn load_partial_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"apiUrl":"https://mint.example.com","apiKey":"k1","requestTimeoutSecs":5}"#,
        )
        .unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.api_url, "https://mint.example.com");
        assert_eq!(config.api_key, "k1");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.app_name, APP_NAME);
    }

    #[test]
    fn corrupt_file_keeps_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{ broken").unwrap();
        assert_eq!(ClientConfig::load(&path).unwrap(), ClientConfig::default());
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "https://env.example.com"),
            (ENV_API_KEY, "env-key"),
            (ENV_TIMEOUT_SECS, "12"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::default()
            .apply_env_from(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.api_url, "https://env.example.com");
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.request_timeout, Duration::from_secs(12));
    }

    #[test]
    fn invalid_timeout_env_is_ignored() {
        let config = ClientConfig::default()
            .apply_env_from(|key| (key == ENV_TIMEOUT_SECS).then(|| "soon".to_string()));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn explicit_identity_path_wins() {
        let config = ClientConfig {
            identity_path: Some(PathBuf::from("/tmp/assetmint-id.json")),
            ..Default::default()
        };
        assert_eq!(
            config.resolved_identity_path(),
            Some(PathBuf::from("/tmp/assetmint-id.json"))
        );
    }
}
