//! Two-slot VCS status codes.
//!
//! This module provides [`StatusCode`], one slot of the short-status format,
//! and [`StatusPair`], the `(index, worktree)` pair a path carries.

use serde::{Deserialize, Serialize};

/// One slot of a short-format status line.
///
/// Every variant except [`Mixed`](Self::Mixed) maps to a character of the
/// porcelain format. `Mixed` is synthetic: directories receive it when their
/// descendants disagree in that slot.
///
/// # Examples
///
/// ```
/// use canopy_core::StatusCode;
///
/// assert_eq!(StatusCode::from_char('M'), Some(StatusCode::Modified));
/// assert_eq!(StatusCode::from_char('?'), Some(StatusCode::Untracked));
/// assert_eq!(StatusCode::Modified.as_char(), 'M');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// Slot unchanged (` `).
    #[default]
    Unmodified,
    /// Modified (`M`, also used for type changes `T`).
    Modified,
    /// Added (`A`).
    Added,
    /// Deleted (`D`).
    Deleted,
    /// Renamed (`R`).
    Renamed,
    /// Copied (`C`).
    Copied,
    /// Unmerged (`U`).
    Unmerged,
    /// Untracked (`?`).
    Untracked,
    /// Ignored (`!`).
    Ignored,
    /// Descendants disagree (synthetic, directories only).
    Mixed,
}

impl StatusCode {
    /// Parses one slot character of the porcelain format.
    ///
    /// Returns `None` for characters outside the format.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        Some(match c {
            ' ' | '.' => Self::Unmodified,
            'M' | 'T' => Self::Modified,
            'A' => Self::Added,
            'D' => Self::Deleted,
            'R' => Self::Renamed,
            'C' => Self::Copied,
            'U' => Self::Unmerged,
            '?' => Self::Untracked,
            '!' => Self::Ignored,
            _ => return None,
        })
    }

    /// Returns the porcelain character for this code (`*` for mixed).
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Unmodified => ' ',
            Self::Modified => 'M',
            Self::Added => 'A',
            Self::Deleted => 'D',
            Self::Renamed => 'R',
            Self::Copied => 'C',
            Self::Unmerged => 'U',
            Self::Untracked => '?',
            Self::Ignored => '!',
            Self::Mixed => '*',
        }
    }

    /// Merges two slot values: equal values are kept, different ones become
    /// [`Mixed`](Self::Mixed).
    #[inline]
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        if self == other { self } else { Self::Mixed }
    }
}

/// The `(index, worktree)` status of one path.
///
/// # Examples
///
/// ```
/// use canopy_core::{StatusCode, StatusPair};
///
/// let staged = StatusPair::new(StatusCode::Modified, StatusCode::Unmodified);
/// let unstaged = StatusPair::new(StatusCode::Unmodified, StatusCode::Modified);
///
/// let merged = staged.merge(unstaged);
/// assert!(merged.is_mixed());
/// assert_eq!(merged.to_string(), "**");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StatusPair {
    /// Staged (index) slot, `X` in the porcelain format.
    pub index: StatusCode,
    /// Unstaged (worktree) slot, `Y` in the porcelain format.
    pub worktree: StatusCode,
}

impl StatusPair {
    /// Creates a pair.
    #[inline]
    #[must_use]
    pub const fn new(index: StatusCode, worktree: StatusCode) -> Self {
        Self { index, worktree }
    }

    /// Parses the two status characters of a porcelain line.
    #[must_use]
    pub const fn from_chars(x: char, y: char) -> Option<Self> {
        match (StatusCode::from_char(x), StatusCode::from_char(y)) {
            (Some(index), Some(worktree)) => Some(Self { index, worktree }),
            _ => None,
        }
    }

    /// Slot-wise merge; see [`StatusCode::merge`].
    #[inline]
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            index: self.index.merge(other.index),
            worktree: self.worktree.merge(other.worktree),
        }
    }

    /// Aggregates a set of descendant pairs into a directory status.
    ///
    /// Returns `None` when there is nothing to aggregate. The result is mixed
    /// exactly when the inputs are not all identical.
    ///
    /// # Examples
    ///
    /// ```
    /// use canopy_core::{StatusCode, StatusPair};
    ///
    /// let m = StatusPair::new(StatusCode::Unmodified, StatusCode::Modified);
    /// assert_eq!(StatusPair::aggregate([m, m]), Some(m));
    /// assert_eq!(StatusPair::aggregate(std::iter::empty()), None);
    /// ```
    pub fn aggregate(pairs: impl IntoIterator<Item = Self>) -> Option<Self> {
        pairs.into_iter().reduce(Self::merge)
    }

    /// Returns `true` if either slot is [`StatusCode::Mixed`].
    #[inline]
    #[must_use]
    pub fn is_mixed(self) -> bool {
        self.index == StatusCode::Mixed || self.worktree == StatusCode::Mixed
    }

    /// Returns `true` if something is staged in the index.
    #[inline]
    #[must_use]
    pub fn is_staged(self) -> bool {
        !matches!(
            self.index,
            StatusCode::Unmodified | StatusCode::Untracked | StatusCode::Ignored
        )
    }
}

impl std::fmt::Display for StatusPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.index.as_char(), self.worktree.as_char())
    }
}
