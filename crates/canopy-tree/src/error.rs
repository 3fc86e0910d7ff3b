//! Error types for the canopy-tree crate.

use camino::Utf8PathBuf;
use canopy_core::NodeId;

/// Errors that can occur while building or mutating a [`NodeTree`].
///
/// # Error Recovery Strategy
///
/// - **Construction errors** ([`TreeError::InvalidRoot`],
///   [`TreeError::InvalidPattern`]): fatal for the tree being opened.
/// - **Stale ids** ([`TreeError::NodeNotFound`]): the node was pruned by a
///   concurrent reload or collapse; callers drop the request.
///
/// Directory listing failures are not errors: the directory is shown empty.
///
/// # Examples
///
/// ```
/// use canopy_core::NodeId;
/// use canopy_tree::TreeError;
///
/// let err = TreeError::NodeNotFound(NodeId(7));
/// assert!(err.is_recoverable());
/// ```
///
/// [`NodeTree`]: crate::NodeTree
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The root path cannot be used.
    #[error("invalid tree root {path}: {reason}")]
    InvalidRoot {
        /// The rejected root.
        path: Utf8PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// An ignore pattern failed to compile.
    #[error("invalid ignore pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// The underlying glob error.
        #[source]
        source: ignore::Error,
    },

    /// No node with this id is materialized.
    #[error("node {0} is not in the tree")]
    NodeNotFound(NodeId),
}

impl TreeError {
    /// Creates a new [`TreeError::InvalidRoot`] error.
    #[inline]
    pub fn invalid_root(path: impl Into<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the tree itself is still usable after this error.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NodeNotFound(_))
    }
}
