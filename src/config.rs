use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the claims REST API
    pub api_base_url: String,

    /// Path of the driver claim collection, relative to the base URL
    pub driver_claims_path: String,

    /// Path of the third-party claim collection, relative to the base URL
    pub third_party_claims_path: String,

    /// Request timeout for claim submission, in seconds
    pub request_timeout_secs: u64,

    /// Default tracing filter when RUST_LOG is not set
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            driver_claims_path: "/claims".to_string(),
            third_party_claims_path: "/third-party-claims".to_string(),
            request_timeout_secs: 30,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the platform-specific config directory.
    /// Creates default config if file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let config = Self::load_from(&config_path)?;
            tracing::info!("Loaded config from: {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            tracing::info!("Created default config at: {}", config_path.display());
            Ok(config)
        }
    }

    /// Load and validate configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            ConfigError::LoadFailed {
                path: path.display().to_string(),
                source,
            }
        };

        let content = fs::read_to_string(path).map_err(|e| load_failed(e.into()))?;
        let config: Config = serde_json::from_str(&content).map_err(|e| load_failed(e.into()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let save_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            ConfigError::SaveFailed {
                path: path.display().to_string(),
                source,
            }
        };

        let json = serde_json::to_string_pretty(self).map_err(|e| save_failed(e.into()))?;
        fs::write(path, json).map_err(|e| save_failed(e.into()))?;

        Ok(())
    }

    /// Check that the values are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid("api_base_url is empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must start with http:// or https://, got {}",
                url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory holding config.json and logs
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("claimdesk"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the config file path (for display purposes)
    pub fn config_path_display() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("claimdesk-config-{}-{}", name, std::process::id()))
            .join("config.json")
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.log_filter, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api_base_url": "https://claims.example.com"}"#).unwrap();
        assert_eq!(config.api_base_url, "https://claims.example.com");
        assert_eq!(config.driver_claims_path, "/claims");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.api_base_url = "ftp://claims".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.api_base_url = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_from_path() {
        let path = scratch_path("roundtrip");
        let mut config = Config::default();
        config.request_timeout_secs = 5;

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = scratch_path("missing");
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn test_load_from_invalid_json() {
        let path = scratch_path("invalid");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
