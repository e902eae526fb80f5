//! Client configuration.
//!
//! Resolution order: built-in defaults, then `config.toml`, then the
//! environment. Command-line flags are applied on top by the binary.

use crate::error::{Result, TaxError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_NOTIFICATION_TTL_SECS: u64 = 5;
pub const DEFAULT_LOG_FILTER: &str = "taxsync=info";
pub const SERVER_URL_ENV: &str = "TAXSYNC_SERVER_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the tax calculation service.
    pub server_url: String,
    /// Per-request timeout. Unset means requests wait indefinitely.
    pub request_timeout_secs: Option<u64>,
    /// How long a notification stays visible.
    pub notification_ttl_secs: u64,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: None,
            notification_ttl_secs: DEFAULT_NOTIFICATION_TTL_SECS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ClientConfig {
    /// Returns the default config file path: `<config_dir>/taxsync/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| TaxError::config("Could not determine config directory"))?;
        Ok(dir.join("taxsync").join("config.toml"))
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            TaxError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file at `path` (or the default location) and applies the environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => match Self::default_path() {
                Ok(path) => Self::load_from(&path)?,
                Err(_) => Self::default(),
            },
        };
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            config = config.with_server_url(url);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.server_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(TaxError::config(format!(
                "server_url must start with http:// or https://, got '{}'",
                self.server_url
            )));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(TaxError::config("request_timeout_secs must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ClientConfig::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.notification_ttl(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "server_url = \"https://tax.example.com\"\nrequest_timeout_secs = 10\n",
        )
        .unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.server_url, "https://tax.example.com");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.notification_ttl_secs, DEFAULT_NOTIFICATION_TTL_SECS);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        std::fs::write(&path, "server_url = \"ftp://nope\"\n").unwrap();
        assert!(matches!(
            ClientConfig::load_from(&path),
            Err(TaxError::Config(_))
        ));

        std::fs::write(&path, "server_url = [1, 2]\n").unwrap();
        assert!(matches!(
            ClientConfig::load_from(&path),
            Err(TaxError::Serialization { .. })
        ));
    }
}
