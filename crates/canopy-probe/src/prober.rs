//! Directory listing with concurrent per-entry probes.

use std::ffi::OsStr;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use canopy_core::{Permissions, StatSnapshot};
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::error::ProbeError;
use crate::fs::{AccessMode, Filesystem, LocalFs};

/// Raw metadata for one directory entry.
///
/// Produced by [`Prober::list`] and [`Prober::probe`]; the tree turns these
/// into [`Node`](canopy_core::Node)s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryProbe {
    /// Entry name (final path component, or the drive root itself).
    pub name: String,

    /// Absolute path.
    pub path: Utf8PathBuf,

    /// The link target (or the entry itself) exists.
    pub exists: bool,

    /// The entry is a directory, following symbolic links.
    pub directory: bool,

    /// The entry itself is a symbolic link.
    pub symbolic_link: bool,

    /// Results of the three access checks.
    pub permissions: Permissions,

    /// `lstat` snapshot, kept only for symbolic links.
    pub lstat: Option<StatSnapshot>,
}

/// Returns `true` for drive-root paths such as `C:\` or `d:/`.
///
/// # Examples
///
/// ```
/// use canopy_probe::is_drive_root;
///
/// assert!(is_drive_root("C:\\"));
/// assert!(is_drive_root("d:/"));
/// assert!(!is_drive_root("C:\\Users"));
/// assert!(!is_drive_root("/"));
/// ```
#[must_use]
pub fn is_drive_root(path: &str) -> bool {
    matches!(
        path.as_bytes(),
        [letter, b':', b'\\' | b'/'] if letter.is_ascii_alphabetic()
    )
}

/// Lists directories and resolves per-entry metadata.
///
/// Every entry is probed concurrently; results are recombined in listing
/// order, so a slow entry never reorders its siblings. An entry whose probe
/// fails is dropped and logged. Output is not sorted.
///
/// # Cloning
///
/// `Prober` is cheaply cloneable; clones share the same [`Filesystem`].
///
/// # Examples
///
/// ```no_run
/// use canopy_probe::Prober;
/// use camino::Utf8Path;
///
/// # async fn demo() -> Result<(), canopy_probe::ProbeError> {
/// let prober = Prober::local();
/// for entry in prober.list(Utf8Path::new("/srv/app")).await? {
///     println!("{} dir={}", entry.name, entry.directory);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Prober {
    fs: Arc<dyn Filesystem>,
}

impl Default for Prober {
    fn default() -> Self {
        Self::local()
    }
}

impl Prober {
    /// Creates a prober over the given filesystem.
    #[must_use]
    pub fn new(fs: Arc<dyn Filesystem>) -> Self {
        Self { fs }
    }

    /// Creates a prober over the local filesystem.
    #[must_use]
    pub fn local() -> Self {
        Self::new(Arc::new(LocalFs))
    }

    /// The underlying filesystem.
    #[must_use]
    pub fn filesystem(&self) -> &Arc<dyn Filesystem> {
        &self.fs
    }

    /// Lists `dir` and probes every entry.
    ///
    /// On Windows the synthetic empty-path root lists the drive roots instead
    /// of a directory.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::ReadDir`] if the directory itself cannot be
    /// listed. Entry-level failures never fail the listing.
    pub async fn list(&self, dir: &Utf8Path) -> Result<Vec<EntryProbe>, ProbeError> {
        if cfg!(windows) && dir.as_str().is_empty() {
            let roots = self
                .fs
                .list_roots()
                .await
                .map_err(|source| ProbeError::read_dir(dir, source))?;
            let probes = roots.iter().map(|root| self.probe(Utf8Path::new(root)));
            return Ok(collect_entries(join_all(probes).await));
        }

        let names = self
            .fs
            .read_dir(dir)
            .await
            .map_err(|source| ProbeError::read_dir(dir, source))?;
        debug!(dir = %dir, count = names.len(), "probing directory entries");

        let probes = names.iter().map(|name| self.probe_name(dir, name));
        Ok(collect_entries(join_all(probes).await))
    }

    async fn probe_name(&self, dir: &Utf8Path, name: &OsStr) -> Result<EntryProbe, ProbeError> {
        let name = name
            .to_str()
            .ok_or_else(|| ProbeError::NonUtf8Name(name.to_owned()))?;
        self.probe(&dir.join(name)).await
    }

    /// Probes a single entry.
    ///
    /// The three access checks and `stat` degrade to `false`/absent on
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Vanished`] if `lstat` fails, i.e. the entry no
    /// longer exists.
    pub async fn probe(&self, path: &Utf8Path) -> Result<EntryProbe, ProbeError> {
        let (stat, lstat, readable, writable, executable) = tokio::join!(
            self.fs.stat(path),
            self.fs.lstat(path),
            self.fs.access(path, AccessMode::Read),
            self.fs.access(path, AccessMode::Write),
            self.fs.access(path, AccessMode::Execute),
        );

        let lstat = lstat.map_err(|source| ProbeError::vanished(path, source))?;
        let stat = match stat {
            Ok(stat) => Some(stat),
            Err(err) => {
                debug!(path = %path, error = %err, "stat failed, treating target as absent");
                None
            }
        };

        let symbolic_link = lstat.is_symlink();
        let directory = (cfg!(windows) && is_drive_root(path.as_str()))
            || stat.is_some_and(|stat| stat.is_dir());
        let name = path.file_name().unwrap_or(path.as_str()).to_owned();

        Ok(EntryProbe {
            name,
            path: path.to_owned(),
            exists: stat.is_some(),
            directory,
            symbolic_link,
            permissions: Permissions {
                readable,
                writable,
                executable,
            },
            lstat: symbolic_link.then_some(lstat),
        })
    }
}

fn collect_entries(results: Vec<Result<EntryProbe, ProbeError>>) -> Vec<EntryProbe> {
    results
        .into_iter()
        .filter_map(|result| match result {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "dropping entry from listing");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::ffi::OsString;
    use std::io;

    use async_trait::async_trait;
    use canopy_core::FileKind;

    /// In-memory filesystem: a flat directory with configurable failures.
    #[derive(Debug, Default)]
    struct FakeFs {
        order: Vec<String>,
        entries: BTreeMap<String, FileKind>,
        vanished: Vec<String>,
        unwritable: Vec<String>,
    }

    impl FakeFs {
        fn with(mut self, name: &str, kind: FileKind) -> Self {
            self.order.push(name.to_owned());
            self.entries.insert(name.to_owned(), kind);
            self
        }

        fn vanish(mut self, name: &str) -> Self {
            self.vanished.push(name.to_owned());
            self
        }

        fn lookup(&self, path: &Utf8Path) -> io::Result<FileKind> {
            let name = path.file_name().unwrap_or_default();
            self.entries
                .get(name)
                .copied()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
    }

    #[async_trait]
    impl Filesystem for FakeFs {
        async fn read_dir(&self, dir: &Utf8Path) -> io::Result<Vec<OsString>> {
            if dir.as_str() != "/r" {
                return Err(io::Error::from(io::ErrorKind::NotFound));
            }
            Ok(self.order.iter().map(OsString::from).collect())
        }

        async fn list_roots(&self) -> io::Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn stat(&self, path: &Utf8Path) -> io::Result<StatSnapshot> {
            let kind = match self.lookup(path)? {
                FileKind::Symlink => FileKind::Directory,
                kind => kind,
            };
            Ok(StatSnapshot {
                kind,
                ..StatSnapshot::default()
            })
        }

        async fn lstat(&self, path: &Utf8Path) -> io::Result<StatSnapshot> {
            let name = path.file_name().unwrap_or_default();
            if self.vanished.iter().any(|v| v == name) {
                return Err(io::Error::from(io::ErrorKind::NotFound));
            }
            Ok(StatSnapshot {
                kind: self.lookup(path)?,
                ..StatSnapshot::default()
            })
        }

        async fn access(&self, path: &Utf8Path, mode: AccessMode) -> bool {
            let name = path.file_name().unwrap_or_default();
            match mode {
                AccessMode::Write => !self.unwritable.iter().any(|u| u == name),
                AccessMode::Read => true,
                AccessMode::Execute => false,
            }
        }
    }

    fn prober(fs: FakeFs) -> Prober {
        Prober::new(Arc::new(fs))
    }

    fn five_entries() -> FakeFs {
        FakeFs::default()
            .with("e1", FileKind::File)
            .with("e2", FileKind::Directory)
            .with("e3", FileKind::File)
            .with("e4", FileKind::File)
            .with("e5", FileKind::Symlink)
    }

    #[tokio::test]
    async fn test_list_keeps_listing_order() {
        let entries = prober(five_entries()).list(Utf8Path::new("/r")).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["e1", "e2", "e3", "e4", "e5"]);
    }

    #[tokio::test]
    async fn test_failing_entry_is_dropped() {
        let fs = five_entries().vanish("e3");
        let entries = prober(fs).list(Utf8Path::new("/r")).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["e1", "e2", "e4", "e5"]);
    }

    #[tokio::test]
    async fn test_unlistable_directory_is_error() {
        let err = prober(five_entries())
            .list(Utf8Path::new("/elsewhere"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::ReadDir { .. }));
    }

    #[tokio::test]
    async fn test_symlink_to_directory() {
        let entries = prober(five_entries()).list(Utf8Path::new("/r")).await.unwrap();
        let link = entries.iter().find(|e| e.name == "e5").unwrap();
        assert!(link.symbolic_link);
        assert!(link.directory);
        assert!(link.lstat.is_some_and(|s| s.is_symlink()));

        let file = entries.iter().find(|e| e.name == "e1").unwrap();
        assert!(!file.symbolic_link);
        assert!(file.lstat.is_none());
    }

    #[tokio::test]
    async fn test_failed_access_downgrades_single_bit() {
        let mut fs = five_entries();
        fs.unwritable.push("e4".to_owned());
        let entries = prober(fs).list(Utf8Path::new("/r")).await.unwrap();

        let e4 = entries.iter().find(|e| e.name == "e4").unwrap();
        assert!(e4.permissions.readable);
        assert!(!e4.permissions.writable);
        assert!(e4.permissions.readonly());

        let e1 = entries.iter().find(|e| e.name == "e1").unwrap();
        assert!(!e1.permissions.readonly());
    }

    #[tokio::test]
    async fn test_local_listing() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        std::fs::write(root.join("file.txt"), "x").unwrap();
        std::fs::create_dir(root.join("nested")).unwrap();

        let mut entries = Prober::local().list(&root).await.unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "file.txt");
        assert!(!entries[0].directory);
        assert!(entries[0].exists);
        assert_eq!(entries[1].name, "nested");
        assert!(entries[1].directory);
        assert_eq!(entries[1].path, root.join("nested"));
    }

    #[test]
    fn test_drive_roots() {
        assert!(is_drive_root("C:\\"));
        assert!(is_drive_root("z:/"));
        assert!(!is_drive_root("C:"));
        assert!(!is_drive_root("1:\\"));
        assert!(!is_drive_root("C:\\x"));
    }
}
