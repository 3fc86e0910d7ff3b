//! In-memory mirror of a filesystem subtree.
//!
//! [`NodeTree`] is the authoritative structure the rest of the workspace
//! reads and mutates. It starts with just the root; directories are listed
//! through the [`Prober`](canopy_probe::Prober) only when loaded, filtered by
//! [`EntryFilter`] and ordered by a [`Comparator`].
//!
//! # Architecture
//!
//! ```text
//! NodeTree
//!     │
//!     ├── RwLock<TreeState>
//!     │       ├── slots: NodeId → { node, parent, children }
//!     │       └── paths: path → NodeId
//!     │
//!     ├── EntryFilter (hidden + gitignore-style patterns)
//!     ├── Comparator (SortConfig or custom closure)
//!     └── Prober (directory listing)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod filter;
mod sort;
mod tree;

pub use error::TreeError;
pub use filter::EntryFilter;
pub use sort::Comparator;
pub use tree::NodeTree;
