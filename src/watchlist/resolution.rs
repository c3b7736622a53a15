//! Querying and acknowledging pending diffs.

use std::collections::BTreeMap;

use super::WatchlistManager;
use crate::error::WatchlistError;
use crate::pattern::PatternResolver;
use crate::storage::{DiffKind, FileState};
use crate::Result;

/// Processes one pending file on behalf of [`WatchlistManager::commit`].
pub trait DiffHandler {
    /// Handle `path`. Return `true` to resolve its diff, `false` to leave it pending.
    fn handle(&mut self, path: &str, state: &FileState) -> bool;
}

impl<F> DiffHandler for F
where
    F: FnMut(&str, &FileState) -> bool,
{
    fn handle(&mut self, path: &str, state: &FileState) -> bool {
        self(path, state)
    }
}

/// Pending paths grouped by diff kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub added: Vec<String>,
    pub changed: Vec<String>,
    pub removed: Vec<String>,
}

impl DiffSummary {
    /// Number of pending paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.changed.len() + self.removed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of a commit pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Entries the handler accepted and that were resolved.
    pub resolved: usize,
    /// Entries the handler declined; they stay pending.
    pub skipped: usize,
}

impl<R: PatternResolver> WatchlistManager<R> {
    /// Tracked entries whose diff equals `kind`.
    #[must_use]
    pub fn diff_filter(&self, kind: DiffKind) -> BTreeMap<String, FileState> {
        self.data
            .tracked
            .iter()
            .filter(|(_, state)| state.diff == kind)
            .map(|(path, state)| (path.clone(), *state))
            .collect()
    }

    /// Every tracked entry, in path order.
    #[must_use]
    pub const fn list(&self) -> &BTreeMap<String, FileState> {
        &self.data.tracked
    }

    /// All entries with a pending diff, in path order.
    #[must_use]
    pub fn diff_queue(&self) -> Vec<(String, FileState)> {
        self.data
            .tracked
            .iter()
            .filter(|(_, state)| state.diff.is_pending())
            .map(|(path, state)| (path.clone(), *state))
            .collect()
    }

    /// Pending paths grouped by kind.
    #[must_use]
    pub fn diff_summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        for (path, state) in &self.data.tracked {
            match state.diff {
                DiffKind::Added => summary.added.push(path.clone()),
                DiffKind::Changed => summary.changed.push(path.clone()),
                DiffKind::Removed => summary.removed.push(path.clone()),
                DiffKind::None => {}
            }
        }
        summary
    }

    /// Acknowledge the pending diff of `path`.
    ///
    /// A `removed` tombstone is deleted outright; any other diff is reset to
    /// `None`, keeping size and mtime. Returns the diff that was resolved.
    ///
    /// # Errors
    ///
    /// Returns [`WatchlistError::UntrackedFile`] if `path` is not tracked,
    /// [`WatchlistError::AlreadyResolved`] if it has no pending diff, or an
    /// error if the save fails.
    pub fn diff_mark_resolved(&mut self, path: &str) -> Result<DiffKind> {
        let Some(state) = self.data.tracked.get_mut(path) else {
            tracing::error!(path = %path, "Untracked file");
            return Err(WatchlistError::UntrackedFile(path.to_string()).into());
        };

        let previous = *state;
        match previous.diff {
            DiffKind::None => {
                tracing::error!(path = %path, "File already marked as resolved");
                return Err(WatchlistError::AlreadyResolved(path.to_string()).into());
            }
            DiffKind::Removed => {
                self.data.tracked.remove(path);
            }
            DiffKind::Added | DiffKind::Changed => state.diff = DiffKind::None,
        }

        let key = path.to_string();
        self.persist_or_revert(|data| {
            data.tracked.insert(key, previous);
        })?;

        tracing::debug!(path = %path, diff = %previous.diff, "Marked resolved");
        Ok(previous.diff)
    }

    /// Hand every pending entry to `handler`, added first, then changed,
    /// then removed, resolving the ones it accepts.
    ///
    /// # Errors
    ///
    /// Returns an error if resolving an accepted entry cannot be saved.
    pub fn commit<H: DiffHandler>(&mut self, handler: &mut H) -> Result<CommitReport> {
        let mut report = CommitReport::default();

        for kind in [DiffKind::Added, DiffKind::Changed, DiffKind::Removed] {
            let files = self.diff_filter(kind);
            if files.is_empty() {
                tracing::info!("No {kind} files to commit");
                continue;
            }

            tracing::info!(count = files.len(), "Committing {kind} file(s)");
            for (path, state) in files {
                if handler.handle(&path, &state) {
                    self.diff_mark_resolved(&path)?;
                    report.resolved += 1;
                } else {
                    tracing::warn!(path = %path, diff = %kind, "Left pending");
                    report.skipped += 1;
                }
            }
        }

        Ok(report)
    }
}
