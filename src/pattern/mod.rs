//! Pattern validation and expansion.
//!
//! Patterns are absolute glob expressions (`~` expands to the home
//! directory). A pattern naming an existing directory tracks every file
//! below it.

use glob::{MatchOptions, Pattern};
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use crate::error::PatternError;
use crate::Result;

/// Glob matching rules: `*` stops at separators and hidden entries need an
/// explicit leading dot.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Files matched by one pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    /// Regular files matched.
    pub files: Vec<PathBuf>,

    /// Entries that could not be read while expanding the pattern.
    pub skipped: Vec<String>,
}

impl From<Vec<PathBuf>> for Matches {
    fn from(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            skipped: Vec::new(),
        }
    }
}

/// Expands patterns into concrete files.
pub trait PatternResolver {
    /// Return every regular file matched by `pattern`.
    ///
    /// Entries that fail individually are reported in [`Matches::skipped`]
    /// rather than failing the whole pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern as a whole cannot be expanded.
    fn resolve(&self, pattern: &str) -> Result<Matches>;

    /// Normalize `pattern`, rejecting malformed input.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is empty, relative or not a valid glob.
    fn validate(&self, pattern: &str) -> Result<String> {
        validate_pattern(pattern)
    }
}

impl<F> PatternResolver for F
where
    F: Fn(&str) -> Result<Vec<PathBuf>>,
{
    fn resolve(&self, pattern: &str) -> Result<Matches> {
        self(pattern).map(Matches::from)
    }
}

/// Filesystem resolver backed by the `glob` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobResolver;

impl PatternResolver for GlobResolver {
    fn resolve(&self, pattern: &str) -> Result<Matches> {
        let expression = if Path::new(pattern).is_dir() {
            directory_pattern(pattern)
        } else {
            pattern.to_string()
        };

        let entries = glob::glob_with(&expression, MATCH_OPTIONS).map_err(|e| {
            PatternError::Resolve {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        })?;

        let mut matches = Matches::default();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => matches.files.push(path),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "Skipping unreadable entry");
                    matches.skipped.push(format!(
                        "unreadable entry '{}' under '{pattern}': {}",
                        e.path().display(),
                        e.error()
                    ));
                }
            }
        }

        tracing::debug!(
            pattern = %pattern,
            files = matches.files.len(),
            skipped = matches.skipped.len(),
            "Resolved pattern"
        );
        Ok(matches)
    }
}

/// `dir/**/*` with the directory part escaped.
fn directory_pattern(dir: &str) -> String {
    let escaped = Pattern::escape(dir.trim_end_matches(['/', MAIN_SEPARATOR]));
    format!("{escaped}{MAIN_SEPARATOR}**{MAIN_SEPARATOR}*")
}

/// Validate and normalize a pattern.
///
/// Trims whitespace, expands a leading `~`, requires an absolute path,
/// strips trailing separators and checks glob syntax.
///
/// # Errors
///
/// Returns an error if the pattern is empty, relative, malformed, or uses
/// `~` without a home directory.
pub fn validate_pattern(pattern: &str) -> Result<String> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Err(PatternError::Empty.into());
    }

    let mut expanded = expand_home(trimmed)?;
    if !Path::new(&expanded).is_absolute() {
        return Err(PatternError::NotAbsolute(trimmed.to_string()).into());
    }

    while expanded.len() > 1 && expanded.ends_with(['/', MAIN_SEPARATOR]) {
        expanded.pop();
    }

    Pattern::new(&expanded).map_err(|e| PatternError::invalid(&expanded, e))?;
    Ok(expanded)
}

/// Make `path` absolute against `base` and drop `.` and `..` components.
///
/// Normalization is lexical; symlinks are not followed.
#[must_use]
pub fn absolute_path(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn expand_home(pattern: &str) -> Result<String> {
    let rest = match pattern.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', MAIN_SEPARATOR]) => rest,
        _ => return Ok(pattern.to_string()),
    };

    let home = dirs::home_dir().ok_or(PatternError::HomeUnavailable)?;
    let home = home.to_str().ok_or(PatternError::HomeUnavailable)?;
    Ok(format!("{}{rest}", home.trim_end_matches(['/', MAIN_SEPARATOR])))
}
