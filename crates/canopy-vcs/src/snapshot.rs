//! Immutable per-repository status snapshots.

use camino::{Utf8Path, Utf8PathBuf};
use canopy_core::{FxHashMap, StatusPair, fx_hash_map};

/// A point-in-time mapping from absolute path to [`StatusPair`] for one
/// repository.
///
/// Snapshots are never mutated after construction; the tracker replaces them
/// wholesale on reload. Besides the entries reported by git, every directory
/// strictly inside the repository root that has status-bearing descendants
/// carries the slot-wise merge of their pairs (see [`StatusPair::merge`]), so
/// a directory is mixed exactly when its descendants disagree.
///
/// # Examples
///
/// ```
/// use canopy_core::{StatusCode, StatusPair};
/// use canopy_vcs::StatusSnapshot;
/// use camino::{Utf8Path, Utf8PathBuf};
///
/// let staged = StatusPair::new(StatusCode::Modified, StatusCode::Unmodified);
/// let unstaged = StatusPair::new(StatusCode::Unmodified, StatusCode::Modified);
/// let snapshot = StatusSnapshot::from_entries(
///     Utf8PathBuf::from("/r"),
///     vec![
///         (Utf8PathBuf::from("/r/src/a.rs"), staged),
///         (Utf8PathBuf::from("/r/src/b.rs"), unstaged),
///     ],
/// );
///
/// assert!(snapshot.get(Utf8Path::new("/r/src")).is_some_and(StatusPair::is_mixed));
/// assert_eq!(snapshot.get(Utf8Path::new("/r")), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    root: Utf8PathBuf,
    statuses: FxHashMap<Utf8PathBuf, StatusPair>,
}

impl StatusSnapshot {
    /// Builds a snapshot from explicit entries, adding directory aggregates.
    ///
    /// Explicit entries win over aggregates for the same path.
    #[must_use]
    pub fn from_entries(
        root: Utf8PathBuf,
        entries: impl IntoIterator<Item = (Utf8PathBuf, StatusPair)>,
    ) -> Self {
        let mut statuses: FxHashMap<Utf8PathBuf, StatusPair> = entries.into_iter().collect();

        let mut aggregates: FxHashMap<Utf8PathBuf, StatusPair> = fx_hash_map();
        for (path, pair) in &statuses {
            for ancestor in path.ancestors().skip(1) {
                if ancestor == root.as_path() || !ancestor.starts_with(&root) {
                    break;
                }
                aggregates
                    .entry(ancestor.to_owned())
                    .and_modify(|merged| *merged = merged.merge(*pair))
                    .or_insert(*pair);
            }
        }

        for (dir, pair) in aggregates {
            statuses.entry(dir).or_insert(pair);
        }

        Self { root, statuses }
    }

    /// The repository root this snapshot describes (empty for the empty
    /// snapshot).
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Status of one path, if it has one.
    #[inline]
    #[must_use]
    pub fn get(&self, path: &Utf8Path) -> Option<StatusPair> {
        self.statuses.get(path).copied()
    }

    /// Returns `true` if `path` has an entry.
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.statuses.contains_key(path)
    }

    /// Iterates over all `(path, status)` entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&Utf8Path, StatusPair)> {
        self.statuses
            .iter()
            .map(|(path, pair)| (path.as_path(), *pair))
    }

    /// Iterates over all paths with an entry.
    pub fn paths(&self) -> impl Iterator<Item = &Utf8Path> {
        self.statuses.keys().map(Utf8PathBuf::as_path)
    }

    /// Number of entries, aggregates included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Returns `true` if the snapshot has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::StatusCode;
    use proptest::prelude::*;

    const M_: StatusPair = StatusPair::new(StatusCode::Modified, StatusCode::Unmodified);
    const _M: StatusPair = StatusPair::new(StatusCode::Unmodified, StatusCode::Modified);
    const UNTRACKED: StatusPair = StatusPair::new(StatusCode::Untracked, StatusCode::Untracked);
    const IGNORED: StatusPair = StatusPair::new(StatusCode::Ignored, StatusCode::Ignored);

    fn snapshot(entries: &[(&str, StatusPair)]) -> StatusSnapshot {
        StatusSnapshot::from_entries(
            Utf8PathBuf::from("/r"),
            entries
                .iter()
                .map(|(path, pair)| (Utf8PathBuf::from(*path), *pair)),
        )
    }

    #[test]
    fn test_identical_descendants_are_not_mixed() {
        let snap = snapshot(&[("/r/d/a", UNTRACKED), ("/r/d/e/b", UNTRACKED)]);
        assert_eq!(snap.get(Utf8Path::new("/r/d")), Some(UNTRACKED));
        assert_eq!(snap.get(Utf8Path::new("/r/d/e")), Some(UNTRACKED));
    }

    #[test]
    fn test_differing_descendants_are_mixed() {
        let snap = snapshot(&[("/r/d/a", M_), ("/r/d/e/b", _M)]);
        let dir = snap.get(Utf8Path::new("/r/d")).unwrap();
        assert!(dir.is_mixed());
        assert_eq!(snap.get(Utf8Path::new("/r/d/e")), Some(_M));
    }

    #[test]
    fn test_root_is_not_aggregated() {
        let snap = snapshot(&[("/r/a", M_)]);
        assert_eq!(snap.get(Utf8Path::new("/r")), None);
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn test_clean_directory_has_no_status() {
        let snap = snapshot(&[("/r/d/a", M_)]);
        assert_eq!(snap.get(Utf8Path::new("/r/clean")), None);
    }

    #[test]
    fn test_explicit_directory_entry_wins() {
        let snap = snapshot(&[("/r/target", IGNORED), ("/r/target/x", M_)]);
        assert_eq!(snap.get(Utf8Path::new("/r/target")), Some(IGNORED));
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = StatusSnapshot::default();
        assert!(snap.is_empty());
        assert_eq!(snap.root(), "");
    }

    fn pair_strategy() -> impl Strategy<Value = StatusPair> {
        prop::sample::select(vec![M_, _M, UNTRACKED, IGNORED])
    }

    fn entry_strategy() -> impl Strategy<Value = (Utf8PathBuf, StatusPair)> {
        (
            prop::collection::vec(prop::sample::select(vec!["d0", "d1", "d2"]), 0..3),
            prop::sample::select(vec!["f0", "f1", "f2"]),
            pair_strategy(),
        )
            .prop_map(|(dirs, file, pair)| {
                let mut path = Utf8PathBuf::from("/r");
                for dir in dirs {
                    path.push(dir);
                }
                path.push(file);
                (path, pair)
            })
    }

    proptest! {
        #[test]
        fn prop_directory_mixed_iff_descendants_differ(
            entries in prop::collection::vec(entry_strategy(), 1..12)
        ) {
            let snap = StatusSnapshot::from_entries(Utf8PathBuf::from("/r"), entries.clone());
            let explicit: FxHashMap<Utf8PathBuf, StatusPair> = entries.into_iter().collect();

            for (path, pair) in snap.iter() {
                if explicit.contains_key(path) {
                    continue;
                }
                let descendants: Vec<StatusPair> = explicit
                    .iter()
                    .filter(|(file, _)| file.starts_with(path))
                    .map(|(_, pair)| *pair)
                    .collect();
                prop_assert!(!descendants.is_empty());
                let all_equal = descendants.iter().all(|p| *p == descendants[0]);
                prop_assert_eq!(pair.is_mixed(), !all_equal);
            }
        }
    }
}
