//! Event types.
//!
//! The host delivers [`HostEvent`]s on a broadcast channel; the filesystem
//! bridge ([`FsWatcher`](crate::FsWatcher)) produces [`FileEvent`]s that a
//! host can translate into buffer-written events.
//!
//! # Event Flow
//!
//! ```text
//! host editor / FsWatcher
//!        │
//!        ▼
//!   HostEvent::BufferWritten(id)   (broadcast)
//!        │
//!        ▼
//!   Debouncer (trailing event wins)
//!        │
//!        ▼
//!   StatusChangeNotifier::process_write
//! ```

use std::time::Instant;

use camino::Utf8PathBuf;
use canopy_core::BufferId;

use crate::diff::IGNORE_FILE_NAME;

/// An event raised by the host editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HostEvent {
    /// The buffer with this id was written to disk.
    BufferWritten(BufferId),
}

impl HostEvent {
    /// The buffer a write event refers to.
    #[inline]
    #[must_use]
    pub const fn written_buffer(self) -> Option<BufferId> {
        match self {
            Self::BufferWritten(id) => Some(id),
        }
    }
}

/// A debounced on-disk change with a UTF-8 path guarantee.
///
/// The event does not distinguish between create, modify and delete; the
/// debouncer abstracts those away.
///
/// # Examples
///
/// ```
/// use canopy_notify::FileEvent;
/// use camino::Utf8PathBuf;
///
/// let event = FileEvent::new(Utf8PathBuf::from("/r/.gitignore"));
/// assert_eq!(event.file_name(), Some(".gitignore"));
/// assert!(event.is_ignore_rules());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Absolute path of the changed entry.
    pub path: Utf8PathBuf,

    /// When the event was received.
    pub timestamp: Instant,
}

impl FileEvent {
    /// Creates an event for `path`, timestamped now.
    #[inline]
    #[must_use]
    pub fn new(path: Utf8PathBuf) -> Self {
        Self {
            path,
            timestamp: Instant::now(),
        }
    }

    /// Final path component.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }

    /// Returns `true` if the changed file holds ignore rules.
    #[inline]
    #[must_use]
    pub fn is_ignore_rules(&self) -> bool {
        self.file_name() == Some(IGNORE_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_buffer() {
        let event = HostEvent::BufferWritten(BufferId(4));
        assert_eq!(event.written_buffer(), Some(BufferId(4)));
    }

    #[test]
    fn test_file_event_name() {
        let event = FileEvent::new(Utf8PathBuf::from("/r/src/lib.rs"));
        assert_eq!(event.file_name(), Some("lib.rs"));
        assert!(!event.is_ignore_rules());
    }
}
