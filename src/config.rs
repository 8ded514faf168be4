//! Configuration — namespaced TOML file, validated once at startup.
//!
//! The config file holds one table per monitoring profile:
//!
//! ```toml
//! [lambda]
//! min_poll_delay_ms = 1500
//! log_dir = "__logs/instance_availability"
//! api_key = "secret_..."
//! enable_voice_notifications = true
//! ```
//!
//! Any load or validation failure is a `ConfigError` and fatal before
//! the poll loop starts. Nothing here is re-checked per cycle.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Hard floor on the inter-poll delay. The upstream API rate-limits
/// anything more aggressive and answers with an HTML error page, so
/// configured values below this are clamped, not honored.
pub const MIN_POLL_DELAY_MS: u64 = 1100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("namespace '{0}' not found in the configuration file")]
    MissingNamespace(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One monitoring profile, parsed from its TOML namespace.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    pub min_poll_delay_ms: u64,
    pub log_dir: PathBuf,
    pub api_key: String,
    #[serde(default)]
    pub enable_voice_notifications: bool,
    /// Override for tests and staging; production uses the default.
    #[serde(default)]
    pub api_endpoint: Option<String>,
}

impl MonitorConfig {
    /// Load the given namespace from a TOML config file.
    pub fn load(path: &Path, namespace: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw, namespace)
    }

    /// Parse a namespace out of raw TOML text.
    pub fn from_toml_str(raw: &str, namespace: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = raw.parse()?;
        let section = table
            .get(namespace)
            .ok_or_else(|| ConfigError::MissingNamespace(namespace.to_string()))?;

        let config: MonitorConfig = section
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("api_key must not be empty".into()));
        }
        if self.log_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("log_dir must not be empty".into()));
        }
        Ok(())
    }

    /// Inter-poll wait, clamped to the enforced floor.
    pub fn effective_poll_delay(&self) -> Duration {
        Duration::from_millis(self.min_poll_delay_ms.max(MIN_POLL_DELAY_MS))
    }

    pub fn api_endpoint(&self) -> &str {
        self.api_endpoint
            .as_deref()
            .unwrap_or(crate::api::DEFAULT_API_ENDPOINT)
    }
}
