//! Configuration loading and validation for ipsetctl

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ipset: IPSetSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        self.ipset.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// How the ipset tool is invoked
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IPSetSettings {
    /// Absolute path, or a bare program name looked up on PATH.
    #[serde(default = "default_binary")]
    #[validate(length(min = 1), custom = "validate_binary")]
    pub binary: String,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoggingSettings {
    #[validate(custom = "validate_level")]
    pub level: Option<String>,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_binary() -> String {
    ipset::runner::DEFAULT_BINARY.to_string()
}

impl Default for IPSetSettings {
    fn default() -> Self {
        Self {
            binary: default_binary(),
        }
    }
}

// Custom validators

fn validate_binary(binary: &str) -> Result<(), ValidationError> {
    let trimmed = binary.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("binary_empty"));
    }

    // Relative paths depend on the working directory of whoever runs us
    if !trimmed.starts_with('/') && trimmed.contains('/') {
        return Err(ValidationError::new("binary_relative_path"));
    }

    Ok(())
}

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn validate_level(level: &str) -> Result<(), ValidationError> {
    if !LEVELS.contains(&level.trim().to_ascii_lowercase().as_str()) {
        return Err(ValidationError::new("unknown_log_level"));
    }
    Ok(())
}

// Configuration loading implementation

impl Config {
    /// Load configuration from default search paths
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_file() {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(&path)
            }
            None => {
                tracing::info!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        Self::search_paths()
            .into_iter()
            .find(|p: &PathBuf| p.exists() && p.is_file())
    }

    /// Candidate files, first match wins
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/ipset/ipsetctl.yaml")];

        if let Some(home_path) = Self::home_config_path() {
            paths.push(home_path);
        }

        paths.push(PathBuf::from("./ipsetctl.yaml"));
        paths
    }

    /// Get home directory config path
    fn home_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/ipset/ipsetctl.yaml"))
    }

    /// Level handed to the log filter when RUST_LOG is unset
    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or("warn")
    }
}
