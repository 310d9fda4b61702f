//! TOML settings file
//!
//! ```toml
//! [work]
//! thread_limit = 4
//!
//! [logging]
//! level = "warn"
//! file = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable pointing at an explicit settings file
pub const CONFIG_ENV: &str = "PLUG_CONFIG";

const CONFIG_DIR_NAME: &str = "plug";
const CONFIG_FILE_NAME: &str = "plug.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub work: WorkSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkSettings {
    /// 0 = all cores, n > 0 = exactly n, n < 0 = all cores minus |n|
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Whether to mirror diagnostics into the log file
    pub file: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "warn".to_string(),
            file: true,
        }
    }
}

impl Settings {
    /// Directory holding the settings and log files.
    ///
    /// `~/.config/plug` on Unix/macOS, the roaming config dir on Windows.
    pub fn config_dir() -> Option<PathBuf> {
        #[cfg(not(target_os = "windows"))]
        {
            dirs::home_dir().map(|home| home.join(".config").join(CONFIG_DIR_NAME))
        }

        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME))
        }
    }

    /// Path of the settings file, honouring `PLUG_CONFIG`.
    pub fn path() -> PathBuf {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        Self::config_dir().map_or_else(
            || PathBuf::from(CONFIG_FILE_NAME),
            |dir| dir.join(CONFIG_FILE_NAME),
        )
    }

    /// Load settings from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                value: self.logging.level.clone(),
            });
        }
        Ok(())
    }
}
