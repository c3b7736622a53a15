//! Scanning: resolve patterns, diff against the last inventory, persist.
//!
//! Change detection compares size and mtime only; file contents are never
//! read. Per-pattern and per-file failures are logged and recorded in the
//! [`ScanReport`] without aborting the scan.

use std::collections::{BTreeMap, BTreeSet};

use super::WatchlistManager;
use crate::pattern::PatternResolver;
use crate::storage::{DiffKind, FileState};
use crate::Result;

/// Statistics of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Unique files matched by included patterns.
    pub included_files: usize,
    /// Unique files matched by excluded patterns.
    pub excluded_files: usize,
    /// Included files dropped by an exclusion.
    pub ignored: usize,
    /// Entries in the inventory after the scan, tombstones included.
    pub tracked: usize,
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
    pub unchanged: usize,
    /// Pattern and file level failures that were skipped.
    pub warnings: Vec<String>,
}

impl<R: PatternResolver> WatchlistManager<R> {
    /// Resolve all patterns and record which tracked files were added,
    /// removed or changed since the previous scan.
    ///
    /// The document is re-read first, so edits made by another handle since
    /// this one was opened are scanned against.
    ///
    /// Scanning never resolves a pending diff: an entry whose size and mtime
    /// are unchanged keeps whatever diff it had.
    ///
    /// # Errors
    ///
    /// Returns an error if the watchlist cannot be reloaded or the updated
    /// watchlist cannot be saved.
    pub fn track(&mut self) -> Result<ScanReport> {
        self.reload()?;
        let mut report = ScanReport::default();

        tracing::info!(
            included = self.data.included.len(),
            excluded = self.data.excluded.len(),
            "Resolving patterns"
        );

        let included_files = self.resolve_all(&self.data.included, &mut report.warnings);
        let excluded_files = self.resolve_all(&self.data.excluded, &mut report.warnings);
        report.included_files = included_files.len();
        report.excluded_files = excluded_files.len();

        let targets: BTreeSet<&String> = included_files.difference(&excluded_files).collect();
        report.ignored = included_files.len() - targets.len();

        tracing::info!(
            included = report.included_files,
            excluded = report.excluded_files,
            ignored = report.ignored,
            "Matched files"
        );

        let mut tracked = BTreeMap::new();
        for path in targets {
            match std::fs::metadata(path) {
                Ok(metadata) if metadata.is_file() => {
                    tracked.insert(path.clone(), FileState::from_metadata(&metadata));
                }
                Ok(_) => {
                    tracing::warn!(path = %path, "Not a regular file, skipping");
                    report.warnings.push(format!("not a regular file: '{path}'"));
                }
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Failed to stat file, skipping");
                    report.warnings.push(format!("failed to stat '{path}': {e}"));
                }
            }
        }

        for (path, state) in &mut tracked {
            state.diff = match self.data.tracked.get(path) {
                None => {
                    report.added += 1;
                    DiffKind::Added
                }
                Some(previous)
                    if previous.diff == DiffKind::Removed
                        || !previous.same_fingerprint(state) =>
                {
                    report.changed += 1;
                    DiffKind::Changed
                }
                Some(previous) => {
                    report.unchanged += 1;
                    previous.diff
                }
            };
        }

        for path in self.data.tracked.keys() {
            if !tracked.contains_key(path) {
                tracked.insert(path.clone(), FileState::tombstone());
                report.removed += 1;
            }
        }
        report.tracked = tracked.len();

        let previous = std::mem::replace(&mut self.data.tracked, tracked);
        self.persist_or_revert(|data| data.tracked = previous)?;

        tracing::info!(
            tracked = report.tracked,
            added = report.added,
            removed = report.removed,
            changed = report.changed,
            unchanged = report.unchanged,
            warnings = report.warnings.len(),
            "Scan complete"
        );

        Ok(report)
    }

    /// Union of the files matched by `patterns`, as UTF-8 path strings.
    fn resolve_all(
        &self,
        patterns: &BTreeSet<String>,
        warnings: &mut Vec<String>,
    ) -> BTreeSet<String> {
        let mut files = BTreeSet::new();

        for pattern in patterns {
            let matched = match self.resolver.resolve(pattern) {
                Ok(matched) => matched,
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "Failed to resolve pattern");
                    warnings.push(e.to_string());
                    continue;
                }
            };

            warnings.extend(matched.skipped);

            for path in matched.files {
                match path.into_os_string().into_string() {
                    Ok(path) => {
                        files.insert(path);
                    }
                    Err(raw) => {
                        tracing::warn!(path = ?raw, "Skipping non UTF-8 path");
                        warnings.push(format!("non UTF-8 path: {raw:?}"));
                    }
                }
            }
        }

        files
    }
}
