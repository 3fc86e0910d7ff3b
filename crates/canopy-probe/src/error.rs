//! Error types for the canopy-probe crate.

use std::ffi::OsString;

use camino::Utf8PathBuf;

/// Errors that can occur while probing the filesystem.
///
/// # Error Recovery Strategy
///
/// - **Listing errors** ([`ProbeError::ReadDir`]): the directory itself could
///   not be read. Callers degrade to an empty listing.
/// - **Entry errors** ([`ProbeError::Vanished`], [`ProbeError::NonUtf8Name`]):
///   one entry is dropped from the listing; its siblings are unaffected.
///
/// Individual permission and `stat` probes never produce an error; they read
/// as `false` or absent instead.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The directory could not be listed.
    #[error("failed to list directory {path}: {source}")]
    ReadDir {
        /// The directory being listed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The entry disappeared between listing and probing.
    #[error("entry vanished while probing {path}: {source}")]
    Vanished {
        /// The entry's path.
        path: Utf8PathBuf,
        /// The `lstat` error.
        #[source]
        source: std::io::Error,
    },

    /// An entry name is not valid UTF-8.
    #[error("entry name is not valid UTF-8: {}", _0.to_string_lossy())]
    NonUtf8Name(OsString),
}

impl ProbeError {
    /// Creates a new [`ProbeError::ReadDir`] error.
    #[inline]
    pub fn read_dir(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::ReadDir {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ProbeError::Vanished`] error.
    #[inline]
    pub fn vanished(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Vanished {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if the error concerns a single entry of a listing.
    #[inline]
    #[must_use]
    pub const fn is_entry_level(&self) -> bool {
        matches!(self, Self::Vanished { .. } | Self::NonUtf8Name(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_read_dir_is_not_entry_level() {
        let err = ProbeError::read_dir("/r", io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(!err.is_entry_level());
        assert!(err.to_string().contains("/r"));
    }

    #[test]
    fn test_vanished_is_entry_level() {
        let err = ProbeError::vanished("/r/a", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.is_entry_level());
        assert!(err.to_string().contains("/r/a"));
    }
}
