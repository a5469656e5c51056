//! Configuration management for Mailveil.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Command-line flags take precedence over
//! both and are applied by the binary, not here.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// The eight collection.field pairs anonymized by default.
pub const DEFAULT_TARGETS: [&str; 8] = [
    "commit.message",
    "message.body",
    "message.subject",
    "issue.desc",
    "issue_comment.comment",
    "pull_request.description",
    "pull_request_commit.message",
    "pull_request_comment.comment",
];

/// Main application configuration.
///
/// This is loaded from `~/.config/mailveil/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Run behavior settings
    pub run: RunConfig,
    /// People registry settings
    pub registry: RegistryConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `MAILVEIL_THRESHOLD`: Override the duplicate-identity threshold
    /// - `MAILVEIL_WINDOW_SIZE`: Override the batch window size
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        if let Ok(val) = std::env::var("MAILVEIL_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.run.threshold = threshold;
                tracing::debug!("Override run.threshold from env: {}", threshold);
            }
        }

        if let Ok(val) = std::env::var("MAILVEIL_WINDOW_SIZE") {
            if let Ok(window) = val.parse() {
                config.run.window_size = window;
                tracing::debug!("Override run.window_size from env: {}", window);
            }
        }

        Ok(config)
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/mailveil/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("org", "mailveil", "mailveil").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Validate the loaded values.
    ///
    /// # Errors
    /// Returns error if the threshold or window size is zero.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.run.threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "run.threshold".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.run.window_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "run.window_size".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Run behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Target `collection.field` pairs, processed in order
    pub targets: Vec<String>,
    /// Addresses shared by more than this many identities are treated as
    /// non-personal and excluded from the mapping
    pub threshold: usize,
    /// Number of document ids fetched per batched request
    pub window_size: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            targets: DEFAULT_TARGETS.iter().map(ToString::to_string).collect(),
            threshold: 10,
            window_size: 100,
        }
    }
}

/// People registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Collection holding person records
    pub collection: String,
    /// Field on each person record carrying the raw email text
    pub email_field: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            collection: "people".to_string(),
            email_field: "email".to_string(),
        }
    }
}
