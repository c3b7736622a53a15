//! Configuration management for docwatch.
//!
//! Supports configuration from:
//! - Command-line arguments (highest priority)
//! - Environment variables
//! - Built-in defaults (lowest priority)

mod settings;

pub use settings::{default_settings_dir, Config, DEFAULT_SETTINGS_DIR, WATCHLIST_FILE};
