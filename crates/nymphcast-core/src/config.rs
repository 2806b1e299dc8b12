//! Controller configuration.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default mount point of the primary external storage volume.
pub const DEFAULT_EXTERNAL_STORAGE_ROOT: &str = "/storage/emulated/0";

/// Default time to wait for a discovery round.
pub const DEFAULT_DISCOVERY_TIMEOUT_MS: u64 = 5000;

/// Controller configuration.
///
/// Every field has a default, so an empty TOML document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Client id announced to receivers on start.
    pub client_id: Option<String>,
    /// Root of the primary external storage volume.
    pub external_storage_root: String,
    /// Time `discover()` waits for a round to be delivered.
    pub discovery_timeout_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            external_storage_root: DEFAULT_EXTERNAL_STORAGE_ROOT.to_string(),
            discovery_timeout_ms: DEFAULT_DISCOVERY_TIMEOUT_MS,
        }
    }
}

impl ControllerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }
}
