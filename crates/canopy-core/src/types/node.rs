//! Tree node types.
//!
//! A [`Node`] mirrors one filesystem entry, or the synthetic root of a tree.
//! Nodes are addressed by [`NodeId`], which is derived from the absolute path
//! so the same entry keeps the same id across reloads.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use super::stat::StatSnapshot;
use crate::hash::path_hash;

const ROOT_TAG: u8 = 0;
const CHILD_TAG: u8 = 1;

/// An opaque identifier for a tree node.
///
/// # Examples
///
/// ```
/// use canopy_core::NodeId;
/// use camino::Utf8Path;
///
/// let a = NodeId::for_path(Utf8Path::new("/srv/app/main.rs"));
/// let b = NodeId::for_path(Utf8Path::new("/srv/app/main.rs"));
/// assert_eq!(a, b);
///
/// // The synthetic root never collides with an entry of the same path.
/// assert_ne!(NodeId::for_root(Utf8Path::new("/srv/app")), NodeId::for_path(Utf8Path::new("/srv/app")));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Id of the ordinary entry at `path`.
    #[inline]
    #[must_use]
    pub fn for_path(path: &Utf8Path) -> Self {
        Self(path_hash(CHILD_TAG, path.as_str()))
    }

    /// Id of the synthetic root of a tree rooted at `path`.
    #[inline]
    #[must_use]
    pub fn for_root(path: &Utf8Path) -> Self {
        Self(path_hash(ROOT_TAG, path.as_str()))
    }

    /// Returns the inner u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Distinguishes the synthetic tree root from ordinary entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The root of the tree.
    Root,
    /// A listed directory entry.
    Child,
}

/// Access permissions of the current process on an entry.
///
/// Each bit comes from an independent probe; a failed probe reads as `false`.
///
/// # Examples
///
/// ```
/// use canopy_core::Permissions;
///
/// let perms = Permissions { readable: true, writable: false, executable: false };
/// assert!(perms.readonly());
/// assert!(!Permissions::default().readonly());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Permissions {
    /// `R_OK` succeeded.
    pub readable: bool,
    /// `W_OK` succeeded.
    pub writable: bool,
    /// `X_OK` succeeded.
    pub executable: bool,
}

impl Permissions {
    /// Readable but not writable.
    #[inline]
    #[must_use]
    pub const fn readonly(self) -> bool {
        self.readable && !self.writable
    }
}

/// One entry of the mirrored filesystem tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identifier derived from the path.
    pub uid: NodeId,

    /// Root or ordinary entry.
    pub kind: NodeKind,

    /// Absolute path.
    pub path: Utf8PathBuf,

    /// Display name (the final path component for entries).
    pub name: String,

    /// The entry is a directory (symlinks to directories included).
    pub directory: bool,

    /// The entry can have children.
    pub expandable: bool,

    /// The name marks the entry as hidden.
    pub hidden: bool,

    /// The entry itself is a symbolic link.
    pub symbolic_link: bool,

    /// Access permissions.
    pub permissions: Permissions,

    /// `lstat` snapshot, kept for symbolic links.
    pub lstat: Option<StatSnapshot>,
}

impl Node {
    /// Creates the synthetic root node for a tree rooted at `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use canopy_core::{Node, NodeKind, Permissions};
    /// use camino::Utf8Path;
    ///
    /// let root = Node::root(Utf8Path::new("/srv/app"), Permissions::default());
    /// assert_eq!(root.kind, NodeKind::Root);
    /// assert_eq!(root.name, "app");
    /// assert!(root.directory && root.expandable);
    /// ```
    #[must_use]
    pub fn root(path: &Utf8Path, permissions: Permissions) -> Self {
        let name = path.file_name().unwrap_or(path.as_str()).to_owned();
        Self {
            uid: NodeId::for_root(path),
            kind: NodeKind::Root,
            path: path.to_owned(),
            name,
            directory: true,
            expandable: true,
            hidden: false,
            symbolic_link: false,
            permissions,
            lstat: None,
        }
    }

    /// Returns `true` for the synthetic tree root.
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.kind == NodeKind::Root
    }

    /// Readable but not writable.
    #[inline]
    #[must_use]
    pub const fn readonly(&self) -> bool {
        self.permissions.readonly()
    }

    /// The directory a VCS reload for this node should cover: the node itself
    /// for directories, its parent otherwise.
    #[must_use]
    pub fn containing_dir(&self) -> &Utf8Path {
        if self.directory {
            &self.path
        } else {
            self.path.parent().unwrap_or(&self.path)
        }
    }

    /// Returns `true` if `name` marks a hidden entry.
    #[inline]
    #[must_use]
    pub fn is_hidden_name(name: &str) -> bool {
        name.starts_with('.')
    }
}
