//! Resolving buffer ids to paths.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use canopy_core::{BufferId, FxHashMap};
use parking_lot::RwLock;

/// Host-provided buffer information.
///
/// Write events only carry a [`BufferId`]; the notifier asks the host which
/// file that buffer holds before acting. `None` means the buffer is unknown
/// or has no file, and the event is ignored.
#[async_trait]
pub trait BufferLookup: Send + Sync {
    /// Absolute path of the file loaded in `buffer`.
    async fn buffer_path(&self, buffer: BufferId) -> Option<Utf8PathBuf>;
}

#[derive(Debug, Default)]
struct Buffers {
    next: u32,
    by_id: FxHashMap<BufferId, Utf8PathBuf>,
    by_path: FxHashMap<Utf8PathBuf, BufferId>,
}

/// An in-memory [`BufferLookup`] for hosts without an editor.
///
/// Assigns ids starting at 1, one per distinct path.
///
/// # Examples
///
/// ```
/// use canopy_notify::BufferTable;
/// use camino::Utf8Path;
///
/// let table = BufferTable::new();
/// let id = table.open("/r/src/lib.rs");
/// assert_eq!(table.open("/r/src/lib.rs"), id);
/// assert_eq!(table.path(id).as_deref(), Some(Utf8Path::new("/r/src/lib.rs")));
/// ```
#[derive(Debug, Default)]
pub struct BufferTable {
    inner: RwLock<Buffers>,
}

impl BufferTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the buffer for `path`, allocating one if needed.
    pub fn open(&self, path: impl Into<Utf8PathBuf>) -> BufferId {
        let path = path.into();
        let mut buffers = self.inner.write();
        if let Some(id) = buffers.by_path.get(&path) {
            return *id;
        }
        buffers.next += 1;
        let id = BufferId(buffers.next);
        buffers.by_id.insert(id, path.clone());
        buffers.by_path.insert(path, id);
        id
    }

    /// Forgets a buffer, returning its path.
    pub fn close(&self, id: BufferId) -> Option<Utf8PathBuf> {
        let mut buffers = self.inner.write();
        let path = buffers.by_id.remove(&id)?;
        buffers.by_path.remove(&path);
        Some(path)
    }

    /// Path of an open buffer.
    #[must_use]
    pub fn path(&self, id: BufferId) -> Option<Utf8PathBuf> {
        self.inner.read().by_id.get(&id).cloned()
    }

    /// Buffer currently holding `path`.
    #[must_use]
    pub fn find(&self, path: &Utf8Path) -> Option<BufferId> {
        self.inner.read().by_path.get(path).copied()
    }

    /// Number of open buffers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    /// Returns `true` if no buffer is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BufferLookup for BufferTable {
    async fn buffer_path(&self, buffer: BufferId) -> Option<Utf8PathBuf> {
        self.path(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_one_and_are_reused_per_path() {
        let table = BufferTable::new();
        let a = table.open("/r/a");
        let b = table.open("/r/b");
        assert_eq!(a, BufferId(1));
        assert_eq!(b, BufferId(2));
        assert_eq!(table.open("/r/a"), a);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_close_forgets_both_directions() {
        let table = BufferTable::new();
        let id = table.open("/r/a");
        assert_eq!(table.close(id).as_deref(), Some(Utf8Path::new("/r/a")));
        assert!(table.find(Utf8Path::new("/r/a")).is_none());
        assert!(table.path(id).is_none());
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_unknown_buffer() {
        let table = BufferTable::new();
        assert!(table.buffer_path(BufferId(9)).await.is_none());
    }
}
