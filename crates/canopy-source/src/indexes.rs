//! Per-column sets of marked row indexes.
//!
//! Columns mark rows worth jumping to (the git column marks every row with
//! a status). Hosts walk the marks with [`ColumnIndexes::next`] and
//! [`ColumnIndexes::prev`].

use std::collections::BTreeSet;

use canopy_core::{FxHashMap, fx_hash_map};
use parking_lot::Mutex;

/// Marked row indexes, keyed by column name.
#[derive(Debug)]
pub struct ColumnIndexes {
    sets: Mutex<FxHashMap<&'static str, BTreeSet<usize>>>,
}

impl Default for ColumnIndexes {
    fn default() -> Self {
        Self {
            sets: Mutex::new(fx_hash_map()),
        }
    }
}

impl ColumnIndexes {
    /// Creates empty index sets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that edits the set of one column.
    #[inline]
    #[must_use]
    pub fn scope(&self, name: &'static str) -> IndexScope<'_> {
        IndexScope { name, indexes: self }
    }

    /// First marked index strictly after `from`.
    #[must_use]
    pub fn next(&self, name: &str, from: usize) -> Option<usize> {
        let sets = self.sets.lock();
        let set = sets.get(name)?;
        set.range(from.saturating_add(1)..).next().copied()
    }

    /// Last marked index strictly before `from`.
    #[must_use]
    pub fn prev(&self, name: &str, from: usize) -> Option<usize> {
        let sets = self.sets.lock();
        let set = sets.get(name)?;
        set.range(..from).next_back().copied()
    }

    /// Every marked index of a column, ascending.
    #[must_use]
    pub fn get(&self, name: &str) -> Vec<usize> {
        self.sets
            .lock()
            .get(name)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Drops every mark. Row indexes shift on a full render.
    pub fn clear(&self) {
        self.sets.lock().clear();
    }

    fn add(&self, name: &'static str, index: usize) {
        self.sets.lock().entry(name).or_default().insert(index);
    }

    fn remove(&self, name: &'static str, index: usize) {
        if let Some(set) = self.sets.lock().get_mut(name) {
            set.remove(&index);
        }
    }
}

/// Edits the index set of a single column.
#[derive(Debug, Clone, Copy)]
pub struct IndexScope<'a> {
    name: &'static str,
    indexes: &'a ColumnIndexes,
}

impl IndexScope<'_> {
    /// Column this scope belongs to.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Marks a row.
    pub fn add(&self, index: usize) {
        self.indexes.add(self.name, index);
    }

    /// Unmarks a row.
    pub fn remove(&self, index: usize) {
        self.indexes.remove(self.name, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_and_prev_are_strict() {
        let indexes = ColumnIndexes::new();
        let git = indexes.scope("git");
        for index in [2, 5, 9] {
            git.add(index);
        }

        assert_eq!(indexes.next("git", 0), Some(2));
        assert_eq!(indexes.next("git", 2), Some(5));
        assert_eq!(indexes.next("git", 9), None);
        assert_eq!(indexes.prev("git", 9), Some(5));
        assert_eq!(indexes.prev("git", 2), None);
        assert_eq!(indexes.prev("git", usize::MAX), Some(9));
    }

    #[test]
    fn test_scopes_are_independent() {
        let indexes = ColumnIndexes::new();
        indexes.scope("git").add(1);
        indexes.scope("readonly").add(3);
        indexes.scope("git").remove(1);
        indexes.scope("git").remove(7);

        assert!(indexes.get("git").is_empty());
        assert_eq!(indexes.get("readonly"), [3]);
        assert_eq!(indexes.next("unknown", 0), None);

        indexes.clear();
        assert!(indexes.get("readonly").is_empty());
    }
}
