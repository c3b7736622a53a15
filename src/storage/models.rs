//! Data models for the persisted watchlist.
//!
//! The on-disk document has exactly three top-level keys:
//! `included`, `excluded` and `tracked`. Diff kinds are stored as the
//! strings `"None"`, `"added"`, `"removed"` and `"changed"`; anything else
//! fails deserialization.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::Metadata;
use std::time::UNIX_EPOCH;

use super::document::Document;

/// Pending change state of a tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DiffKind {
    /// No pending change.
    #[default]
    #[serde(rename = "None")]
    None,
    /// New since the last scan.
    #[serde(rename = "added")]
    Added,
    /// Missing since the last scan; the entry is a tombstone.
    #[serde(rename = "removed")]
    Removed,
    /// Size or mtime differs from the last scan.
    #[serde(rename = "changed")]
    Changed,
}

impl DiffKind {
    /// All diff kinds, in display order.
    pub const ALL: [Self; 4] = [Self::None, Self::Added, Self::Removed, Self::Changed];

    /// Persisted string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
        }
    }

    /// Whether the entry is waiting to be resolved.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiffKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "invalid diff option '{s}', must be one of: {}",
                    Self::ALL.map(Self::as_str).join(", ")
                )
            })
    }
}

/// Metadata fingerprint and pending diff of one tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FileState {
    /// Size in bytes (0 for a tombstone).
    pub size: u64,

    /// Modification time in seconds since the Unix epoch (0 for a tombstone).
    pub mtime: f64,

    /// Pending change.
    pub diff: DiffKind,
}

impl FileState {
    /// Create a state with no pending diff.
    #[must_use]
    pub const fn new(size: u64, mtime: f64) -> Self {
        Self {
            size,
            mtime,
            diff: DiffKind::None,
        }
    }

    /// Placeholder kept for a vanished file until it is resolved.
    #[must_use]
    pub const fn tombstone() -> Self {
        Self {
            size: 0,
            mtime: 0.0,
            diff: DiffKind::Removed,
        }
    }

    /// Build a state from filesystem metadata.
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let mtime = metadata.modified().map_or(0.0, |modified| {
            match modified.duration_since(UNIX_EPOCH) {
                Ok(since) => since.as_secs_f64(),
                Err(before) => -before.duration().as_secs_f64(),
            }
        });
        Self::new(metadata.len(), mtime)
    }

    /// Set the pending diff.
    #[must_use]
    pub const fn with_diff(mut self, diff: DiffKind) -> Self {
        self.diff = diff;
        self
    }

    /// Compare size and mtime, ignoring the diff.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn same_fingerprint(&self, other: &Self) -> bool {
        self.size == other.size && self.mtime == other.mtime
    }
}

/// The persisted root object of a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    /// Patterns whose matches are tracked.
    pub included: BTreeSet<String>,

    /// Patterns whose matches are suppressed even if included.
    pub excluded: BTreeSet<String>,

    /// Absolute path to state.
    pub tracked: BTreeMap<String, FileState>,
}

impl Watchlist {
    /// Patterns present in both sets.
    #[must_use]
    pub fn overlapping_patterns(&self) -> Vec<&str> {
        self.included
            .intersection(&self.excluded)
            .map(String::as_str)
            .collect()
    }

    /// Consistency self-check.
    ///
    /// Diff values outside [`DiffKind`] cannot be represented once loaded;
    /// they are rejected when the document is parsed.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn validate(&self) -> bool {
        let overlap = self.overlapping_patterns();
        if !overlap.is_empty() {
            tracing::error!(patterns = ?overlap, "Overlapping included and excluded patterns");
            return false;
        }

        if self
            .tracked
            .values()
            .any(|state| state.diff == DiffKind::Removed && (state.size != 0 || state.mtime != 0.0))
        {
            tracing::error!("Removed entry carries file metadata");
            return false;
        }

        true
    }
}

impl Document for Watchlist {
    const KIND: &'static str = "watchlist";

    fn validate(&self) -> bool {
        Self::validate(self)
    }
}
