//! Error types for the canopy-notify crate.
//!
//! This module provides the [`NotifyError`] type for errors raised while
//! watching the filesystem or processing a write event.

use camino::Utf8PathBuf;
use canopy_vcs::VcsError;

/// Errors that can occur during change notification.
///
/// # Error Recovery Strategy
///
/// - **Notify errors** ([`NotifyError::Notify`]): fatal for the watcher
/// - **Path not found** ([`NotifyError::PathNotFound`]): fatal, the watched path must exist
/// - **Channel closed** ([`NotifyError::ChannelClosed`]): fatal, communication broken
/// - **Non-UTF-8 path** ([`NotifyError::NonUtf8Path`]): recoverable, the event is skipped
/// - **VCS errors** ([`NotifyError::Vcs`]): recoverable unless git is missing;
///   the pass is dropped and the previous baseline kept
/// - **I/O errors** ([`NotifyError::Io`]): fatal
///
/// # Examples
///
/// ```
/// use canopy_notify::NotifyError;
///
/// fn handle_error(err: NotifyError) {
///     if err.is_fatal() {
///         eprintln!("stopping: {err}");
///     } else {
///         eprintln!("skipping event: {err}");
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Failed to initialize or operate the notify watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The specified path does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The event channel was closed unexpectedly.
    #[error("event channel closed unexpectedly")]
    ChannelClosed,

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// Reloading VCS status failed.
    #[error("status reload failed: {0}")]
    Vcs(#[from] VcsError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotifyError {
    /// Creates a new [`NotifyError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Returns `true` if processing can continue with the next event.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::NonUtf8Path(_) => true,
            Self::Vcs(err) => err.is_recoverable(),
            Self::Notify(_) | Self::PathNotFound(_) | Self::ChannelClosed | Self::Io(_) => false,
        }
    }

    /// Returns `true` if this error is fatal (watching should stop).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::PathNotFound(path) => Some(path),
            Self::Notify(_) | Self::ChannelClosed | Self::NonUtf8Path(_) | Self::Vcs(_) | Self::Io(_) => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_path_not_found_is_fatal() {
        let err = NotifyError::path_not_found("/r/missing");
        assert!(err.is_fatal());
        assert_eq!(err.path().map(|p| p.as_str()), Some("/r/missing"));
        assert_eq!(err.to_string(), "path does not exist: /r/missing");
    }

    #[test]
    fn test_non_utf8_is_recoverable() {
        let err = NotifyError::NonUtf8Path(PathBuf::from("x"));
        assert!(err.is_recoverable());
        assert!(err.path().is_none());
    }

    #[test]
    fn test_vcs_recoverability_follows_source() {
        let missing = NotifyError::from(VcsError::spawn(
            "git",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ));
        assert!(missing.is_fatal());

        let failed = NotifyError::from(VcsError::CommandFailed {
            program: "git".into(),
            args: "status".into(),
            dir: "/r".into(),
            stderr: String::new(),
        });
        assert!(failed.is_recoverable());
    }

    #[test]
    fn test_channel_closed_display() {
        assert!(NotifyError::ChannelClosed.to_string().contains("channel closed"));
    }
}
