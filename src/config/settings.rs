//! Configuration settings and validation.

use crate::{Error, Result};
use std::path::PathBuf;

/// Directory name used under the home directory when no settings dir is given.
pub const DEFAULT_SETTINGS_DIR: &str = ".docwatch-settings";

/// File name of the persisted watchlist inside a profile directory.
pub const WATCHLIST_FILE: &str = "watchlist.json";

/// Main configuration for docwatch.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one sub-directory per profile.
    pub settings_dir: PathBuf,

    /// Active profile name.
    pub profile: String,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of plain text.
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings_dir: default_settings_dir(),
            profile: "default".to_string(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// `~/.docwatch-settings`, or a relative fallback when there is no home.
#[must_use]
pub fn default_settings_dir() -> PathBuf {
    dirs::home_dir().map_or_else(
        || PathBuf::from(DEFAULT_SETTINGS_DIR),
        |home| home.join(DEFAULT_SETTINGS_DIR),
    )
}

impl Config {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.profile.trim().is_empty() {
            return Err(Error::config("profile cannot be empty"));
        }

        if self.profile.contains(['/', '\\']) || self.profile == ".." || self.profile == "." {
            return Err(Error::config(format!(
                "invalid profile name '{}', must be a plain directory name",
                self.profile
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "invalid log level '{}', must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.settings_dir.as_os_str().is_empty() {
            return Err(Error::config("settings_dir cannot be empty"));
        }

        Ok(())
    }

    /// Directory of the active profile.
    #[must_use]
    pub fn profile_path(&self) -> PathBuf {
        self.settings_dir.join(&self.profile)
    }

    /// Path of the persisted watchlist for the active profile.
    #[must_use]
    pub fn watchlist_path(&self) -> PathBuf {
        self.profile_path().join(WATCHLIST_FILE)
    }
}
