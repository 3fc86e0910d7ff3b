//! Domain types for the canopy tree engine.
//!
//! # Module Organization
//!
//! - [`node`] - Tree nodes, identifiers, and permissions
//! - [`stat`] - Raw stat snapshots kept for symlinks
//! - [`status`] - Two-slot VCS status codes
//! - [`buffer`] - Host editor buffer handles
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use canopy_core::{Node, NodeId, StatusCode, StatusPair};
//! ```

mod buffer;
mod node;
mod stat;
mod status;

pub use buffer::BufferId;
pub use node::{Node, NodeId, NodeKind, Permissions};
pub use stat::{FileKind, StatSnapshot};
pub use status::{StatusCode, StatusPair};
