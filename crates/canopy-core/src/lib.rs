//! Core types, configuration, and errors for the canopy tree engine.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace:
//!
//! - [`Node`] and [`NodeId`], the unit of the mirrored filesystem tree
//! - [`StatusCode`] and [`StatusPair`], the two-slot VCS status of a path
//! - [`BufferId`], the host editor's handle for a written buffer
//! - [`Config`] and its per-component sections
//! - [`ConfigError`] for configuration failures
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)
//!
//! # Crate Dependencies
//!
//! ```text
//! canopy-cli ──► canopy-source ──► canopy-tree ──► canopy-probe ──► canopy-core
//!                             ├──► canopy-notify ──► canopy-vcs ──────────►
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{
    Config, GitConfig, GitIcons, NotifyConfig, SortConfig, TreeConfig, WatchConfig,
};
pub use error::ConfigError;
pub use hash::{FxBuildHasher, FxHashMap, FxHashSet, fx_hash_map, fx_hash_set, path_hash};
pub use types::{
    BufferId, FileKind, Node, NodeId, NodeKind, Permissions, StatSnapshot, StatusCode, StatusPair,
};
