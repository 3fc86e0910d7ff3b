//! Git status tracker with one snapshot per repository.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use canopy_core::{FxHashMap, GitConfig, StatusPair, fx_hash_map};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::command::{run, run_checked};
use crate::error::VcsError;
use crate::porcelain::parse_porcelain;
use crate::snapshot::StatusSnapshot;

/// Tracks git status for every repository it has been asked to reload.
///
/// One tracker is meant to be shared (via `Arc`) by everything that needs
/// status information; it is never reached through a global. Lookups read
/// the most recent snapshot and never trigger a reload.
///
/// Paths are compared as given, so callers should pass canonical absolute
/// paths (git reports the repository root with symlinks resolved).
///
/// # Examples
///
/// ```no_run
/// use canopy_core::GitConfig;
/// use canopy_vcs::GitTracker;
/// use camino::Utf8Path;
///
/// # async fn demo() -> Result<(), canopy_vcs::VcsError> {
/// let tracker = GitTracker::new(&GitConfig::default());
/// if tracker.probe_available().await {
///     tracker.reload(Utf8Path::new("/srv/app/src")).await?;
///     let status = tracker.get_status(Utf8Path::new("/srv/app/src/main.rs"));
///     println!("{status:?}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GitTracker {
    program: String,
    show_ignored: bool,
    snapshots: RwLock<FxHashMap<Utf8PathBuf, Arc<StatusSnapshot>>>,
}

impl GitTracker {
    /// Creates a tracker from the `git` configuration section.
    #[must_use]
    pub fn new(config: &GitConfig) -> Self {
        Self {
            program: config.command.clone(),
            show_ignored: config.show_ignored,
            snapshots: RwLock::new(fx_hash_map()),
        }
    }

    /// The configured git executable.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Capability probe: runs `git --version`.
    ///
    /// Never fails; a missing or broken executable reads as `false`. Callers
    /// are expected to cache the answer.
    pub async fn probe_available(&self) -> bool {
        let cwd = std::env::temp_dir();
        let cwd = Utf8Path::from_path(&cwd).unwrap_or(Utf8Path::new("."));
        match run(&self.program, cwd, &["--version"]).await {
            Ok(finished) if finished.success => true,
            Ok(finished) => {
                debug!(program = %self.program, stderr = %finished.stderr, "version probe failed");
                false
            }
            Err(err) => {
                debug!(program = %self.program, error = %err, "version probe failed");
                false
            }
        }
    }

    /// Returns the root of the repository containing `path`, or `None` when
    /// `path` is not inside a work tree.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Spawn`] if git cannot be run.
    pub async fn repository_root(&self, path: &Utf8Path) -> Result<Option<Utf8PathBuf>, VcsError> {
        if !tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir()) {
            debug!(path = %path, "not an existing directory, no repository");
            return Ok(None);
        }

        let finished = run(&self.program, path, &["rev-parse", "--show-toplevel"]).await?;
        if !finished.success {
            debug!(path = %path, stderr = %finished.stderr, "not inside a work tree");
            return Ok(None);
        }

        let root = String::from_utf8(finished.stdout)
            .map_err(|err| VcsError::NonUtf8Root(String::from_utf8_lossy(err.as_bytes()).into_owned()))?;
        let root = root.trim();
        Ok((!root.is_empty()).then(|| Utf8PathBuf::from(root)))
    }

    /// Re-runs `git status` for the repository containing `path` and replaces
    /// its snapshot.
    ///
    /// Returns the new snapshot, or `None` (a no-op) when `path` is outside
    /// any repository.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError`] if git cannot be run or `git status` fails. The
    /// previous snapshot is kept in that case.
    pub async fn reload(&self, path: &Utf8Path) -> Result<Option<Arc<StatusSnapshot>>, VcsError> {
        let Some(root) = self.repository_root(path).await? else {
            return Ok(None);
        };

        let mut args = vec!["status", "--porcelain", "-z", "--untracked-files=all"];
        if self.show_ignored {
            args.push("--ignored");
        }
        let stdout = run_checked(&self.program, &root, &args).await?;

        let snapshot = Arc::new(StatusSnapshot::from_entries(
            root.clone(),
            parse_porcelain(&stdout, &root),
        ));
        info!(root = %root, entries = snapshot.len(), "reloaded git status");

        self.snapshots.write().insert(root, Arc::clone(&snapshot));
        Ok(Some(snapshot))
    }

    /// The latest snapshot of the repository containing `path`.
    ///
    /// When several tracked repositories contain `path` (nested repositories),
    /// the innermost one wins. Returns an empty snapshot when none does.
    #[must_use]
    pub fn get_statuses(&self, path: &Utf8Path) -> Arc<StatusSnapshot> {
        self.snapshots
            .read()
            .iter()
            .filter(|(root, _)| path.starts_with(root))
            .max_by_key(|(root, _)| root.as_str().len())
            .map(|(_, snapshot)| Arc::clone(snapshot))
            .unwrap_or_default()
    }

    /// Status of a single path, or `None` when it is clean or unknown.
    #[must_use]
    pub fn get_status(&self, path: &Utf8Path) -> Option<StatusPair> {
        self.get_statuses(path).get(path)
    }

    /// Installs a snapshot computed elsewhere, replacing the one for its root.
    pub fn install(&self, snapshot: StatusSnapshot) -> Arc<StatusSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.snapshots
            .write()
            .insert(snapshot.root().to_owned(), Arc::clone(&snapshot));
        snapshot
    }

    /// Roots of every repository with a snapshot.
    #[must_use]
    pub fn tracked_roots(&self) -> Vec<Utf8PathBuf> {
        self.snapshots.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::StatusCode;

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|out| out.status.success())
    }

    fn canonical_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().canonicalize().unwrap()).unwrap();
        (dir, path)
    }

    fn git(dir: &Utf8Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    #[tokio::test]
    async fn test_missing_git_is_unavailable() {
        let config = GitConfig {
            command: "canopy-no-such-git".into(),
            ..GitConfig::default()
        };
        let tracker = GitTracker::new(&config);
        assert!(!tracker.probe_available().await);

        let (_guard, dir) = canonical_tempdir();
        let err = tracker.reload(&dir).await.unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_lookup_without_snapshot_is_empty() {
        let tracker = GitTracker::new(&GitConfig::default());
        assert!(tracker.get_statuses(Utf8Path::new("/r/a")).is_empty());
        assert_eq!(tracker.get_status(Utf8Path::new("/r/a")), None);
    }

    #[test]
    fn test_innermost_repository_wins() {
        let tracker = GitTracker::new(&GitConfig::default());
        let outer_pair = StatusPair::new(StatusCode::Modified, StatusCode::Unmodified);
        let inner_pair = StatusPair::new(StatusCode::Untracked, StatusCode::Untracked);
        tracker.install(StatusSnapshot::from_entries(
            "/r".into(),
            vec![("/r/vendor/lib/a".into(), outer_pair)],
        ));
        tracker.install(StatusSnapshot::from_entries(
            "/r/vendor/lib".into(),
            vec![("/r/vendor/lib/a".into(), inner_pair)],
        ));

        assert_eq!(tracker.get_status(Utf8Path::new("/r/vendor/lib/a")), Some(inner_pair));
        assert_eq!(tracker.get_statuses(Utf8Path::new("/r/vendor")).root(), "/r");
    }

    #[tokio::test]
    async fn test_reload_outside_repository_is_noop() {
        if !git_available() {
            return;
        }
        let (_guard, dir) = canonical_tempdir();
        let tracker = GitTracker::new(&GitConfig::default());

        // A temp dir nested inside some enclosing work tree would be tracked.
        if tracker.repository_root(&dir).await.unwrap().is_some() {
            return;
        }

        assert!(tracker.reload(&dir).await.unwrap().is_none());
        assert!(tracker.tracked_roots().is_empty());
        assert_eq!(tracker.get_status(&dir.join("anything")), None);
    }

    #[tokio::test]
    async fn test_reload_missing_directory_is_noop() {
        let (_guard, dir) = canonical_tempdir();
        let tracker = GitTracker::new(&GitConfig::default());
        assert!(tracker.reload(&dir.join("gone")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reload_reports_untracked_files_and_aggregates() {
        if !git_available() {
            return;
        }
        let (_guard, dir) = canonical_tempdir();
        git(&dir, &["init", "-q"]);
        std::fs::create_dir(dir.join("src")).unwrap();
        std::fs::write(dir.join("src/main.rs"), "fn main() {}").unwrap();
        std::fs::write(dir.join("README.md"), "hi").unwrap();

        let tracker = GitTracker::new(&GitConfig::default());
        let snapshot = tracker.reload(&dir.join("src")).await.unwrap().unwrap();
        assert_eq!(snapshot.root(), dir.as_path());

        let untracked = StatusPair::new(StatusCode::Untracked, StatusCode::Untracked);
        assert_eq!(tracker.get_status(&dir.join("src/main.rs")), Some(untracked));
        assert_eq!(tracker.get_status(&dir.join("README.md")), Some(untracked));
        assert_eq!(tracker.get_status(&dir.join("src")), Some(untracked));
        assert_eq!(tracker.get_status(&dir), None);
    }

    #[tokio::test]
    async fn test_reload_twice_is_stable() {
        if !git_available() {
            return;
        }
        let (_guard, dir) = canonical_tempdir();
        git(&dir, &["init", "-q"]);
        std::fs::write(dir.join("a.txt"), "a").unwrap();

        let tracker = GitTracker::new(&GitConfig::default());
        let first = tracker.reload(&dir).await.unwrap().unwrap();
        let second = tracker.reload(&dir).await.unwrap().unwrap();
        assert_eq!(*first, *second);
        assert_eq!(tracker.tracked_roots(), vec![dir]);
    }
}
