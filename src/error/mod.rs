//! Error types and Result aliases for docwatch.
//!
//! This module defines the error hierarchy used throughout the crate.
//! All public functions return `Result<T, Error>` or `Result<T>`.

use thiserror::Error;

/// Result type alias using docwatch's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for docwatch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Persisted document error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Pattern validation or resolution error.
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// Watchlist request error.
    #[error("watchlist error: {0}")]
    Watchlist(#[from] WatchlistError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The document file exists but could not be read.
    #[error("failed to load '{path}': {reason}")]
    Load { path: String, reason: String },

    /// The document could not be written.
    #[error("failed to save '{path}': {reason}")]
    Save { path: String, reason: String },

    /// The document is not valid JSON for its schema.
    #[error("corrupt document '{path}': {reason}")]
    Corrupt { path: String, reason: String },

    /// The document parsed but violates its invariants.
    #[error("invalid document '{path}': {reason}")]
    Invalid { path: String, reason: String },
}

/// Pattern errors.
#[derive(Error, Debug)]
pub enum PatternError {
    /// Blank pattern.
    #[error("pattern is empty")]
    Empty,

    /// Pattern does not name an absolute location.
    #[error("pattern must be an absolute path: '{0}'")]
    NotAbsolute(String),

    /// Malformed glob syntax.
    #[error("invalid pattern '{pattern}': {reason}")]
    Invalid { pattern: String, reason: String },

    /// `~` could not be expanded.
    #[error("home directory is not available")]
    HomeUnavailable,

    /// The pattern could not be expanded into files.
    #[error("failed to resolve pattern '{pattern}': {reason}")]
    Resolve { pattern: String, reason: String },
}

/// Errors reported by watchlist requests.
#[derive(Error, Debug)]
pub enum WatchlistError {
    /// `remove` was asked for a pattern in neither set.
    #[error("no existing rule for pattern '{0}'")]
    NoMatchingRule(String),

    /// The path is not in the tracked inventory.
    #[error("untracked file: '{0}'")]
    UntrackedFile(String),

    /// The path has no pending diff.
    #[error("file already marked as resolved: '{0}'")]
    AlreadyResolved(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl StorageError {
    /// Create a corrupt-document error.
    pub fn corrupt(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        Self::Corrupt {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl PatternError {
    /// Create an invalid-pattern error.
    pub fn invalid(pattern: impl Into<String>, reason: impl ToString) -> Self {
        Self::Invalid {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }
}
