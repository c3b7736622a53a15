//! Integration tests for pattern rules, scanning and resolution.

use docwatch::pattern::absolute_path;
use docwatch::{DiffKind, FileState, WatchlistManager};
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    _tmp: TempDir,
    files: PathBuf,
    watchlist: WatchlistManager,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let files = tmp.path().join("files");
        fs::create_dir(&files).unwrap();
        let watchlist =
            WatchlistManager::open(tmp.path().join("profile").join("watchlist.json")).unwrap();
        Self {
            _tmp: tmp,
            files,
            watchlist,
        }
    }

    fn write(&self, name: &str, content: &str) -> String {
        let path = self.files.join(name);
        fs::write(&path, content).unwrap();
        key(&path)
    }

    fn pattern(&self, glob: &str) -> String {
        format!("{}/{glob}", self.files.display())
    }

    fn diff(&self, path: &str) -> DiffKind {
        self.watchlist.list()[path].diff
    }

    fn reopen(&self) -> WatchlistManager {
        WatchlistManager::open(self.watchlist.path()).unwrap()
    }
}

fn key(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

/// Included `*.txt` with two files: both become `added`.
#[test]
fn test_first_scan_adds_matches() {
    let mut fx = Fixture::new();
    let a = fx.write("a.txt", "alpha");
    let b = fx.write("b.txt", "beta");
    fx.write("notes.md", "ignored by pattern");

    fx.watchlist.include(&fx.pattern("*.txt")).unwrap();
    let report = fx.watchlist.track().unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(
        fx.watchlist.list().keys().cloned().collect::<Vec<_>>(),
        vec![a.clone(), b.clone()]
    );
    assert_eq!(fx.diff(&a), DiffKind::Added);
    assert_eq!(fx.diff(&b), DiffKind::Added);
    assert_eq!(fx.watchlist.list()[&a].size, 5);
}

/// Resolve both, delete one from disk, rescan, then resolve the tombstone.
#[test]
fn test_removed_file_lifecycle() {
    let mut fx = Fixture::new();
    let a = fx.write("a.txt", "alpha");
    let b = fx.write("b.txt", "beta");
    fx.watchlist.include(&fx.pattern("*.txt")).unwrap();
    fx.watchlist.track().unwrap();

    fx.watchlist.diff_mark_resolved(&a).unwrap();
    fx.watchlist.diff_mark_resolved(&b).unwrap();
    assert_eq!(fx.diff(&a), DiffKind::None);
    assert_eq!(fx.diff(&b), DiffKind::None);

    fs::remove_file(&b).unwrap();
    let report = fx.watchlist.track().unwrap();
    assert_eq!(report.removed, 1);
    assert_eq!(fx.diff(&a), DiffKind::None);
    assert_eq!(fx.watchlist.list()[&b], FileState::tombstone());

    fx.watchlist.diff_mark_resolved(&b).unwrap();
    assert!(!fx.watchlist.list().contains_key(&b));
    assert!(!fx.reopen().list().contains_key(&b));
}

/// A resolved tombstone whose file comes back is added again.
#[test]
fn test_resolved_tombstone_is_readded() {
    let mut fx = Fixture::new();
    let a = fx.write("a.txt", "alpha");
    fx.watchlist.include(&fx.pattern("*.txt")).unwrap();
    fx.watchlist.track().unwrap();
    fx.watchlist.diff_mark_resolved(&a).unwrap();

    fs::remove_file(&a).unwrap();
    fx.watchlist.track().unwrap();
    fx.watchlist.diff_mark_resolved(&a).unwrap();
    assert!(fx.watchlist.list().is_empty());

    fx.write("a.txt", "alpha again");
    fx.watchlist.track().unwrap();
    assert_eq!(fx.diff(&a), DiffKind::Added);
}

/// Relative paths with `.` and `..` resolve to the tracked key.
#[test]
fn test_resolve_relative_path() {
    let mut fx = Fixture::new();
    let a = fx.write("a.txt", "alpha");
    fs::create_dir(fx.files.join("sub")).unwrap();
    fx.watchlist.include(&fx.pattern("*.txt")).unwrap();
    fx.watchlist.track().unwrap();

    let cwd = fx.files.join("sub");
    let path = absolute_path(Path::new(".././a.txt"), &cwd);
    assert_eq!(key(&path), a);
    assert_eq!(fx.watchlist.diff_mark_resolved(&key(&path)).unwrap(), DiffKind::Added);
    assert_eq!(fx.diff(&a), DiffKind::None);
}

/// Include then exclude moves the pattern; include again moves it back.
#[test]
fn test_include_exclude_round_trip() {
    let mut fx = Fixture::new();
    let pattern = fx.pattern("*.log");

    fx.watchlist.include(&pattern).unwrap();
    fx.watchlist.exclude(&pattern).unwrap();
    assert!(fx.watchlist.patterns().included.is_empty());
    assert!(fx.watchlist.patterns().excluded.contains(&pattern));

    fx.watchlist.include(&pattern).unwrap();
    assert!(fx.watchlist.patterns().included.contains(&pattern));
    assert!(fx.watchlist.patterns().excluded.is_empty());

    let saved = fx.reopen();
    assert!(saved.validate());
    assert!(saved.patterns().included.contains(&pattern));
}

/// A size change between scans is reported as `changed`.
#[test]
fn test_size_change_is_detected() {
    let mut fx = Fixture::new();
    let a = fx.write("a.txt", "alpha");
    fx.watchlist.include(&fx.pattern("*.txt")).unwrap();
    fx.watchlist.track().unwrap();
    fx.watchlist.diff_mark_resolved(&a).unwrap();

    fx.write("a.txt", "alpha, but longer");
    let report = fx.watchlist.track().unwrap();

    assert_eq!(report.changed, 1);
    assert_eq!(fx.diff(&a), DiffKind::Changed);
    assert_eq!(fx.watchlist.list()[&a].size, 17);
}

#[test]
fn test_mtime_change_is_detected() {
    let mut fx = Fixture::new();
    let a = fx.write("a.txt", "alpha");
    set_file_mtime(&a, FileTime::from_unix_time(1_600_000_000, 0)).unwrap();
    fx.watchlist.include(&fx.pattern("*.txt")).unwrap();
    fx.watchlist.track().unwrap();
    fx.watchlist.diff_mark_resolved(&a).unwrap();
    assert!((fx.watchlist.list()[&a].mtime - 1_600_000_000.0).abs() < 1e-6);

    set_file_mtime(&a, FileTime::from_unix_time(1_600_000_100, 0)).unwrap();
    fx.watchlist.track().unwrap();
    assert_eq!(fx.diff(&a), DiffKind::Changed);
}

/// Same size and same mtime is indistinguishable from no edit.
#[test]
fn test_same_size_same_mtime_edit_is_not_detected() {
    let mut fx = Fixture::new();
    let a = fx.write("a.txt", "alpha");
    let pinned = FileTime::from_unix_time(1_600_000_000, 0);
    set_file_mtime(&a, pinned).unwrap();
    fx.watchlist.include(&fx.pattern("*.txt")).unwrap();
    fx.watchlist.track().unwrap();
    fx.watchlist.diff_mark_resolved(&a).unwrap();

    fx.write("a.txt", "omega");
    set_file_mtime(&a, pinned).unwrap();
    fx.watchlist.track().unwrap();
    assert_eq!(fx.diff(&a), DiffKind::None);
}

/// Scanning twice without filesystem changes is a no-op and keeps pending diffs.
#[test]
fn test_track_is_idempotent() {
    let mut fx = Fixture::new();
    let a = fx.write("a.txt", "alpha");
    let b = fx.write("b.txt", "beta");
    let c = fx.write("c.txt", "gamma");
    fx.watchlist.include(&fx.pattern("*.txt")).unwrap();
    fx.watchlist.track().unwrap();

    // a: added, b: changed, c: removed tombstone.
    fx.watchlist.diff_mark_resolved(&b).unwrap();
    fx.write("b.txt", "beta, edited");
    fs::remove_file(&c).unwrap();
    fx.watchlist.track().unwrap();

    let first = fx.watchlist.list().clone();
    let report = fx.watchlist.track().unwrap();
    let second = fx.watchlist.list().clone();

    assert_eq!(first, second);
    assert_eq!(report.added, 0);
    assert_eq!(report.changed, 0);
    assert_eq!(fx.diff(&a), DiffKind::Added);
    assert_eq!(fx.diff(&b), DiffKind::Changed);
    assert_eq!(fx.diff(&c), DiffKind::Removed);
    assert_eq!(fx.reopen().list(), &second);
}

/// Sub-second mtimes survive a save and reload bit for bit.
#[test]
fn test_rescan_after_reopen_with_fractional_mtimes() {
    let mut fx = Fixture::new();
    let mut paths = Vec::new();
    for i in 0..200u32 {
        let path = fx.write(&format!("f{i:04}.txt"), "same content");
        let nanos = (234_567_890 + i * 7_919_311) % 1_000_000_000;
        set_file_mtime(&path, FileTime::from_unix_time(1_700_000_000 + i64::from(i), nanos))
            .unwrap();
        paths.push(path);
    }
    fx.watchlist.include(&fx.pattern("*.txt")).unwrap();
    fx.watchlist.track().unwrap();
    for path in &paths {
        fx.watchlist.diff_mark_resolved(path).unwrap();
    }
    let before = fx.watchlist.list().clone();

    let mut reopened = fx.reopen();
    assert_eq!(reopened.list(), &before);
    let report = reopened.track().unwrap();

    assert_eq!(report.changed, 0);
    assert_eq!(report.unchanged, paths.len());
    assert!(reopened.diff_filter(DiffKind::Changed).is_empty());
    assert_eq!(reopened.list(), &before);
}

/// Excluding files that are already tracked turns them into tombstones.
#[test]
fn test_exclusion_untracks_files() {
    let mut fx = Fixture::new();
    let a = fx.write("a.txt", "alpha");
    let secret = fx.write("secret.txt", "hidden");
    fx.watchlist.include(&fx.pattern("*.txt")).unwrap();
    fx.watchlist.track().unwrap();

    fx.watchlist.exclude(&fx.pattern("secret.txt")).unwrap();
    let report = fx.watchlist.track().unwrap();

    assert_eq!(report.ignored, 1);
    assert_eq!(fx.diff(&a), DiffKind::Added);
    assert_eq!(fx.watchlist.list()[&secret], FileState::tombstone());
}

/// A directory pattern tracks everything below it.
#[test]
fn test_directory_pattern() {
    let mut fx = Fixture::new();
    fs::create_dir_all(fx.files.join("deep").join("er")).unwrap();
    let top = fx.write("top.pdf", "%PDF");
    let deep = fx.write("deep/er/inner.txt", "inner");

    let dir = fx.files.to_str().unwrap().to_string();
    fx.watchlist.include(&format!("{dir}/")).unwrap();
    fx.watchlist.track().unwrap();

    let tracked: Vec<_> = fx.watchlist.list().keys().cloned().collect();
    assert_eq!(tracked, vec![deep, top]);
}

/// Every diff kind in the saved document is one of the four known strings.
#[test]
fn test_persisted_diff_values() {
    let mut fx = Fixture::new();
    let a = fx.write("a.txt", "alpha");
    let b = fx.write("b.txt", "beta");
    fx.watchlist.include(&fx.pattern("*.txt")).unwrap();
    fx.watchlist.track().unwrap();
    fx.watchlist.diff_mark_resolved(&a).unwrap();
    fs::remove_file(&b).unwrap();
    fx.watchlist.track().unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(fx.watchlist.path()).unwrap()).unwrap();
    let tracked = raw["tracked"].as_object().unwrap();
    assert_eq!(tracked[&a]["diff"], "None");
    assert_eq!(tracked[&b]["diff"], "removed");
    assert_eq!(tracked[&b]["size"], 0);
    for state in tracked.values() {
        let diff = state["diff"].as_str().unwrap();
        assert!(["None", "added", "removed", "changed"].contains(&diff));
    }
}

/// Commit hands pending entries to the handler and resolves accepted ones.
#[test]
fn test_commit_resolves_accepted_entries() {
    let mut fx = Fixture::new();
    let a = fx.write("a.txt", "alpha");
    let b = fx.write("b.txt", "beta");
    fx.watchlist.include(&fx.pattern("*.txt")).unwrap();
    fx.watchlist.track().unwrap();

    let mut handler = |path: &str, _: &FileState| path.ends_with("a.txt");
    let report = fx.watchlist.commit(&mut handler).unwrap();

    assert_eq!(report.resolved, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(fx.diff(&a), DiffKind::None);
    assert_eq!(fx.diff(&b), DiffKind::Added);
}
