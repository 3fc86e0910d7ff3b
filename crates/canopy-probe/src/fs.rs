//! Filesystem primitives behind an object-safe trait.
//!
//! The prober never talks to the OS directly: every syscall goes through
//! [`Filesystem`], so listings can be exercised against in-memory fakes and
//! hosts can substitute remote or virtual filesystems.

use std::ffi::OsString;
use std::io;

use async_trait::async_trait;
use camino::Utf8Path;
use canopy_core::StatSnapshot;

/// One of the three independent access checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// `R_OK`.
    Read,
    /// `W_OK`.
    Write,
    /// `X_OK`.
    Execute,
}

/// Filesystem primitives used by the [`Prober`](crate::Prober).
///
/// `read_dir`, `list_roots`, `stat` and `lstat` report failures as
/// [`io::Error`]; the prober decides which of them are fatal to a listing.
/// `access` is non-throwing: any failure reads as `false`.
#[async_trait]
pub trait Filesystem: Send + Sync + std::fmt::Debug {
    /// Lists the entry names of `dir` in the order the OS returns them.
    async fn read_dir(&self, dir: &Utf8Path) -> io::Result<Vec<OsString>>;

    /// Lists the filesystem roots (drive letters) on multi-root platforms.
    async fn list_roots(&self) -> io::Result<Vec<String>>;

    /// Metadata following symbolic links.
    async fn stat(&self, path: &Utf8Path) -> io::Result<StatSnapshot>;

    /// Metadata of the entry itself.
    async fn lstat(&self, path: &Utf8Path) -> io::Result<StatSnapshot>;

    /// Whether the current process passes the given access check.
    async fn access(&self, path: &Utf8Path, mode: AccessMode) -> bool;
}

/// The local filesystem, via `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl Filesystem for LocalFs {
    async fn read_dir(&self, dir: &Utf8Path) -> io::Result<Vec<OsString>> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name());
        }
        Ok(names)
    }

    async fn list_roots(&self) -> io::Result<Vec<String>> {
        if !cfg!(windows) {
            return Ok(Vec::new());
        }
        let mut roots = Vec::new();
        for letter in b'A'..=b'Z' {
            let root = format!("{}:\\", letter as char);
            if tokio::fs::metadata(&root).await.is_ok() {
                roots.push(root);
            }
        }
        Ok(roots)
    }

    async fn stat(&self, path: &Utf8Path) -> io::Result<StatSnapshot> {
        let metadata = tokio::fs::metadata(path).await?;
        Ok(StatSnapshot::from_metadata(&metadata))
    }

    async fn lstat(&self, path: &Utf8Path) -> io::Result<StatSnapshot> {
        let metadata = tokio::fs::symlink_metadata(path).await?;
        Ok(StatSnapshot::from_metadata(&metadata))
    }

    #[cfg(unix)]
    async fn access(&self, path: &Utf8Path, mode: AccessMode) -> bool {
        use nix::unistd::{AccessFlags, access};

        let flags = match mode {
            AccessMode::Read => AccessFlags::R_OK,
            AccessMode::Write => AccessFlags::W_OK,
            AccessMode::Execute => AccessFlags::X_OK,
        };
        let path = path.to_owned();
        tokio::task::spawn_blocking(move || access(path.as_std_path(), flags).is_ok())
            .await
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    async fn access(&self, path: &Utf8Path, mode: AccessMode) -> bool {
        let Ok(metadata) = tokio::fs::metadata(path).await else {
            return false;
        };
        match mode {
            AccessMode::Read => true,
            AccessMode::Write => !metadata.permissions().readonly(),
            AccessMode::Execute => {
                metadata.is_dir()
                    || path.extension().is_some_and(|ext| {
                        ["exe", "bat", "cmd", "com"]
                            .iter()
                            .any(|known| ext.eq_ignore_ascii_case(known))
                    })
            }
        }
    }
}
