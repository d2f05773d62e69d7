#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for otad
//!
//! This crate handles loading configuration from:
//! - Default values (hard-coded)
//! - Configuration file (/etc/otad/config.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use otad_errors::{ConfigError, Error};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub update: UpdateConfig,
}

/// Filesystem locations used by the update client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Directory holding the file-per-key preference store
    #[serde(default = "default_prefs_dir")]
    pub prefs_dir: PathBuf,
    /// Side-channel file the UI polls for the update deadline
    #[serde(default = "default_deadline_file")]
    pub deadline_file: PathBuf,
}

/// Update pipeline tunables
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateConfig {
    /// Explicit boot device, overriding hardware detection (test images)
    #[serde(default)]
    pub boot_device_override: Option<String>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            prefs_dir: default_prefs_dir(),
            deadline_file: default_deadline_file(),
        }
    }
}

fn default_prefs_dir() -> PathBuf {
    PathBuf::from("/var/lib/otad/prefs")
}

fn default_deadline_file() -> PathBuf {
    PathBuf::from("/tmp/update-check-response-deadline")
}

impl Config {
    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::ReadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate field-level constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured value is unusable.
    pub fn validate(&self) -> Result<(), Error> {
        if self.paths.prefs_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "paths.prefs_dir".to_string(),
                message: "must not be empty".to_string(),
            }
            .into());
        }
        if self.paths.deadline_file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "paths.deadline_file".to_string(),
                message: "must not be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
