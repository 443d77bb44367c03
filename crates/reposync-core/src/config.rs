//! Configuration management for reposync.
//!
//! The file lives inside the git metadata directory and is only ever read.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the optional config file inside the git directory.
pub const CONFIG_FILE: &str = "reposync.toml";

/// reposync configuration loaded from `.git/reposync.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Generated commit message settings.
    #[serde(default)]
    pub messages: MessageConfig,

    /// History view settings.
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Config {
    /// Load config from a TOML file, falling back to defaults if it is missing.
    ///
    /// # Errors
    /// Returns error if the file exists but can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            file: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Load `reposync.toml` from a git directory, if one is known.
    ///
    /// # Errors
    /// Returns error if the file exists but can't be read or parsed.
    pub fn load_from_git_dir(git_dir: Option<&Path>) -> Result<Self> {
        git_dir.map_or_else(|| Ok(Self::default()), |dir| Self::load(dir.join(CONFIG_FILE)))
    }

    /// Bound applied to the inspector's fetch.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.general.fetch_timeout_secs)
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Remote used for fetch, pull and push.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Seconds before the inspector gives up on a fetch.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_remote() -> String {
    "origin".into()
}

const fn default_fetch_timeout_secs() -> u64 {
    10
}

/// Settings for generated commit messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageConfig {
    /// Prefix for messages generated by push-kind operations.
    #[serde(default = "default_auto_prefix")]
    pub auto_prefix: String,

    /// Prefix for emergency backup commits.
    #[serde(default = "default_backup_prefix")]
    pub backup_prefix: String,

    /// `chrono` format string for the timestamp suffix.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            auto_prefix: default_auto_prefix(),
            backup_prefix: default_backup_prefix(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

fn default_auto_prefix() -> String {
    "Auto-commit".into()
}

fn default_backup_prefix() -> String {
    "Emergency backup".into()
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S".into()
}

/// History view settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of entries shown by log views.
    #[serde(default = "default_log_limit")]
    pub log_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            log_limit: default_log_limit(),
        }
    }
}

const fn default_log_limit() -> usize {
    15
}
