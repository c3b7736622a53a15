//! Watchlist change tracking.
//!
//! This module provides:
//! - Include/exclude pattern rules with mutual exclusivity
//! - Scanning that diffs the resolved file set against the last inventory
//! - Querying and resolving pending diffs
//!
//! Every mutation is saved before it returns. A failed save leaves the
//! in-memory watchlist as it was before the call.

mod registry;
mod resolution;
mod tracker;

use std::path::{Path, PathBuf};

use crate::pattern::{GlobResolver, PatternResolver};
use crate::storage::{JsonStore, Watchlist};
use crate::{Config, Result};

pub use registry::{PatternChange, PatternRules};
pub use resolution::{CommitReport, DiffHandler, DiffSummary};
pub use tracker::ScanReport;

/// Owns one profile's watchlist and its storage handle.
///
/// The document is read when the manager is opened and again at the start of
/// every [`track`](Self::track). Other operations work on the in-memory copy
/// and save it before returning; call [`reload`](Self::reload) to pick up
/// edits made through another handle in between.
#[derive(Debug)]
pub struct WatchlistManager<R = GlobResolver> {
    store: JsonStore<Watchlist>,
    data: Watchlist,
    resolver: R,
}

impl WatchlistManager<GlobResolver> {
    /// Open the watchlist at `path`, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_resolver(path, GlobResolver)
    }

    /// Open the watchlist of the configured profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or created.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open(config.watchlist_path())
    }
}

impl<R: PatternResolver> WatchlistManager<R> {
    /// Open the watchlist at `path` with a custom pattern resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or created.
    pub fn with_resolver(path: impl Into<PathBuf>, resolver: R) -> Result<Self> {
        let store = JsonStore::new(path);
        let data = store.load_or_create()?;
        Ok(Self {
            store,
            data,
            resolver,
        })
    }

    /// Current in-memory watchlist.
    #[must_use]
    pub const fn data(&self) -> &Watchlist {
        &self.data
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Re-read the backing document, discarding the in-memory copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn reload(&mut self) -> Result<()> {
        self.data = self.store.load_or_create()?;
        Ok(())
    }

    /// Save the current data; on failure apply `undo` to restore the prior state.
    fn persist_or_revert(&mut self, undo: impl FnOnce(&mut Watchlist)) -> Result<()> {
        if let Err(e) = self.store.save(&self.data) {
            undo(&mut self.data);
            return Err(e);
        }
        Ok(())
    }
}
