//! Configuration management module.

use crate::catalog::Brand;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub branding: BrandingConfig,
    pub export: ExportConfig,
}

/// Automation server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub url: String,
    /// Bearer token for authenticated deployments; empty disables auth.
    #[serde(default)]
    pub token: String,
    /// HTTP request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Display branding settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandingConfig {
    pub brand: Brand,
}

/// Export artifact handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory for artifacts when not prompting; empty means current dir.
    #[serde(default)]
    pub output_dir: String,
    /// Ask for a save location with the native dialog.
    pub prompt_for_path: bool,
}

impl AppConfig {
    /// Config file path under the platform config directory.
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "flowport")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Io(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.url.trim().is_empty() {
            return Err(ConfigError::Validation("Server URL cannot be empty".to_string()));
        }
        if !self.server.url.starts_with("http") {
            return Err(ConfigError::Validation(
                "Server URL must start with http:// or https://".to_string(),
            ));
        }
        if self.server.timeout_secs < 5 {
            return Err(ConfigError::Validation(
                "Request timeout must be at least 5 seconds".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: String::new(),
            prompt_for_path: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_url() {
        let mut config = AppConfig::default();
        config.server.url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_url_scheme() {
        let mut config = AppConfig::default();
        config.server.url = "ftp://invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_timeout_lower_bound() {
        let mut config = AppConfig::default();

        config.server.timeout_secs = 4;
        assert!(config.validate().is_err());

        config.server.timeout_secs = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_brand_round_trips_through_toml() {
        let mut config = AppConfig::default();
        config.branding.brand = Brand::Builder;

        let serialized = toml::to_string_pretty(&config).unwrap();
        assert!(serialized.contains("brand = \"builder\""));

        let parsed: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.branding.brand, Brand::Builder);
    }

    #[test]
    fn test_try_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::try_load(&dir.path().join("config.toml"));
        assert!(matches!(result, ConfigLoadResult::Missing));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.server.url = "https://flows.example.com".to_string();
        config.save(&path).unwrap();

        match AppConfig::try_load(&path) {
            ConfigLoadResult::Loaded(loaded) => {
                assert_eq!(loaded.server.url, "https://flows.example.com");
            }
            other => panic!("expected loaded config, got {other:?}"),
        }
    }
}
