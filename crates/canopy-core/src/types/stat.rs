//! Raw stat snapshots.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// The type of a filesystem object as reported by `stat`/`lstat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// A regular file.
    #[default]
    File,
    /// A directory.
    Directory,
    /// A symbolic link (only ever reported by `lstat`).
    Symlink,
    /// Sockets, fifos, devices.
    Other,
}

/// A point-in-time copy of the metadata fields the tree cares about.
///
/// Nodes keep the `lstat` snapshot of symbolic links so a renderer can show
/// link details without another syscall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatSnapshot {
    /// Object type.
    pub kind: FileKind,
    /// Size in bytes.
    pub len: u64,
    /// Last modification time, when the platform reports one.
    pub modified: Option<SystemTime>,
    /// Whether the permission bits mark the object read-only.
    pub readonly: bool,
}

impl StatSnapshot {
    /// Builds a snapshot from standard library metadata.
    #[must_use]
    pub fn from_metadata(metadata: &std::fs::Metadata) -> Self {
        let file_type = metadata.file_type();
        let kind = if file_type.is_symlink() {
            FileKind::Symlink
        } else if file_type.is_dir() {
            FileKind::Directory
        } else if file_type.is_file() {
            FileKind::File
        } else {
            FileKind::Other
        };

        Self {
            kind,
            len: metadata.len(),
            modified: metadata.modified().ok(),
            readonly: metadata.permissions().readonly(),
        }
    }

    /// Returns `true` for directories.
    #[inline]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, FileKind::Directory)
    }

    /// Returns `true` for symbolic links.
    #[inline]
    #[must_use]
    pub const fn is_symlink(&self) -> bool {
        matches!(self.kind, FileKind::Symlink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_metadata_directory() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = std::fs::metadata(dir.path()).unwrap();
        let snapshot = StatSnapshot::from_metadata(&metadata);
        assert!(snapshot.is_dir());
        assert!(!snapshot.is_symlink());
    }

    #[test]
    fn test_from_metadata_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, "hello").unwrap();

        let snapshot = StatSnapshot::from_metadata(&std::fs::metadata(&path).unwrap());
        assert_eq!(snapshot.kind, FileKind::File);
        assert_eq!(snapshot.len, 5);
        assert!(snapshot.modified.is_some());
    }
}
