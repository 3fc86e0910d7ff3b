//! Fast hash collections and deterministic path hashing.
//!
//! The Fx hash algorithm (from `rustc-hash`) is unseeded, so the same input
//! hashes to the same value in every process. Node identifiers rely on that:
//! a node's [`NodeId`](crate::NodeId) is the Fx hash of its absolute path and
//! stays stable across reloads and restarts, which lets a renderer diff rows by
//! identity.
//!
//! # Examples
//!
//! ```
//! use canopy_core::{FxHashMap, fx_hash_map, path_hash};
//!
//! let mut map: FxHashMap<&str, i32> = fx_hash_map();
//! map.insert("key", 42);
//!
//! assert_eq!(path_hash(0, "/tmp/a"), path_hash(0, "/tmp/a"));
//! assert_ne!(path_hash(0, "/tmp/a"), path_hash(1, "/tmp/a"));
//! ```

use std::hash::{Hash, Hasher};

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// The hasher used by [`FxHashMap`] and [`FxHashSet`].
pub type FxBuildHasher = rustc_hash::FxBuildHasher;

/// Creates a new empty [`FxHashMap`].
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}

/// Creates a new empty [`FxHashSet`].
#[inline]
#[must_use]
pub fn fx_hash_set<V>() -> FxHashSet<V> {
    FxHashSet::default()
}

/// Hashes a path string under a domain tag.
///
/// The tag separates identifier namespaces that may share a path (the
/// synthetic tree root and an ordinary entry, for example).
#[must_use]
pub fn path_hash(tag: u8, path: &str) -> u64 {
    let mut hasher = rustc_hash::FxHasher::default();
    tag.hash(&mut hasher);
    path.hash(&mut hasher);
    hasher.finish()
}
