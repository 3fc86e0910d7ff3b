//! Host editor buffer handles.

use serde::{Deserialize, Serialize};

/// Identifier of a buffer in the host editor.
///
/// Write events carry only this number; the path is resolved through the
/// host's buffer lookup before anything else happens.
///
/// # Examples
///
/// ```
/// use canopy_core::BufferId;
///
/// let id = BufferId::new(7);
/// assert_eq!(id.as_u32(), 7);
/// assert_eq!(id.to_string(), "#7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferId(pub u32);

impl BufferId {
    /// Creates a buffer id.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the inner value.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for BufferId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BufferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
