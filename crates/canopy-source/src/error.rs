//! Error types for the canopy-source crate.

use canopy_tree::TreeError;

/// Errors raised by a [`Source`](crate::Source).
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// A tree operation failed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// A column task panicked or was aborted.
    #[error("column task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SourceError {
    /// Returns `true` if the source stays usable after this error.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Tree(err) => err.is_recoverable(),
            Self::Task(_) => false,
        }
    }
}
