//! Configuration management for netledger.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ledger::DEFAULT_CAPACITY;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "netledger";

/// Default export subdirectory name.
const EXPORT_DIR_NAME: &str = "exports";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `NETLEDGER_`)
/// 2. TOML config file at `~/.config/netledger/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ledger configuration.
    pub ledger: LedgerConfig,
    /// Service configuration.
    pub service: ServiceConfig,
    /// Privacy configuration.
    pub privacy: PrivacyConfig,
    /// Export configuration.
    pub export: ExportConfig,
}

/// Ledger-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Maximum number of requests retained.
    pub capacity: usize,
}

/// Service-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Buffer size of the capture event channel.
    pub event_buffer: usize,
    /// Buffer size of the command channel.
    pub command_buffer: usize,
}

/// Privacy-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// Redact sensitive data before it reaches the ledger.
    pub redaction_enabled: bool,
    /// Response header names whose values are always redacted.
    pub sensitive_headers: Vec<String>,
    /// Use the built-in body patterns.
    pub builtin_patterns: bool,
    /// Additional body patterns (regex).
    pub body_patterns: Vec<String>,
    /// Replacement text for redacted content.
    pub placeholder: String,
}

/// Export-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for exported snapshots.
    /// Defaults to `~/.local/share/netledger/exports`
    pub directory: Option<PathBuf>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            event_buffer: 1024,
            command_buffer: 64,
        }
    }
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            redaction_enabled: true,
            sensitive_headers: default_sensitive_headers(),
            builtin_patterns: true,
            body_patterns: Vec::new(),
            placeholder: "[REDACTED]".to_string(),
        }
    }
}

/// Header names redacted by default.
fn default_sensitive_headers() -> Vec<String> {
    vec![
        "authorization".to_string(),
        "proxy-authorization".to_string(),
        "cookie".to_string(),
        "set-cookie".to_string(),
        "x-api-key".to_string(),
    ]
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("NETLEDGER_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.ledger.capacity == 0 {
            return Err(Error::config_validation(
                "ledger.capacity must be greater than 0",
            ));
        }

        if self.service.event_buffer == 0 || self.service.command_buffer == 0 {
            return Err(Error::config_validation(
                "service buffers must be greater than 0",
            ));
        }

        for pattern in &self.privacy.body_patterns {
            if regex::Regex::new(pattern).is_err() {
                return Err(Error::config_validation(format!(
                    "invalid regex pattern: {pattern}"
                )));
            }
        }

        Ok(())
    }

    /// Get the export directory, resolving defaults if not set.
    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(EXPORT_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.ledger.capacity, 500);
        assert!(config.privacy.redaction_enabled);
        assert!(config.privacy.builtin_patterns);
        assert!(config.export.directory.is_none());
    }

    #[test]
    fn test_default_service_config() {
        let service = ServiceConfig::default();
        assert_eq!(service.event_buffer, 1024);
        assert_eq!(service.command_buffer, 64);
    }

    #[test]
    fn test_default_privacy_config() {
        let privacy = PrivacyConfig::default();

        assert!(privacy.sensitive_headers.contains(&"set-cookie".to_string()));
        assert!(privacy.body_patterns.is_empty());
        assert_eq!(privacy.placeholder, "[REDACTED]");
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_capacity() {
        let mut config = Config::default();
        config.ledger.capacity = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("ledger.capacity"));
    }

    #[test]
    fn test_validate_zero_buffer() {
        let mut config = Config::default();
        config.service.command_buffer = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("buffers"));
    }

    #[test]
    fn test_validate_invalid_regex() {
        let mut config = Config::default();
        config.privacy.body_patterns = vec!["[invalid".to_string()];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("invalid regex"));
    }

    #[test]
    fn test_export_dir_default() {
        let config = Config::default();
        let path = config.export_dir();

        assert!(path.to_string_lossy().contains("netledger"));
        assert!(path.ends_with("exports"));
    }

    #[test]
    fn test_export_dir_custom() {
        let mut config = Config::default();
        config.export.directory = Some(PathBuf::from("/tmp/requests"));

        assert_eq!(config.export_dir(), PathBuf::from("/tmp/requests"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("netledger"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[ledger]\ncapacity = 50\n\n[privacy]\nredaction_enabled = false\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.ledger.capacity, 50);
        assert!(!config.privacy.redaction_enabled);
        assert_eq!(config.service, ServiceConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ledger]\ncapacity = 0\n").unwrap();

        assert!(Config::load_from(Some(path)).is_err());
    }

    #[test]
    fn test_ledger_config_deserialize() {
        let json = r#"{"capacity": 25}"#;
        let ledger: LedgerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(ledger.capacity, 25);
    }

    #[test]
    fn test_privacy_config_serialize() {
        let json = serde_json::to_string(&PrivacyConfig::default()).unwrap();
        assert!(json.contains("sensitive_headers"));
    }
}
