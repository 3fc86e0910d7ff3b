//! Changed-path computation between two status snapshots.

use camino::{Utf8Path, Utf8PathBuf};
use canopy_core::{FxHashMap, FxHashSet, StatusPair, fx_hash_set};
use canopy_vcs::StatusSnapshot;

/// Name of the file whose edits can change the status of arbitrary paths.
pub const IGNORE_FILE_NAME: &str = ".gitignore";

/// Computes the set of paths whose status differs between two snapshots.
///
/// A path is changed when it appears in only one snapshot, or in both with
/// different pairs. The result depends only on membership, so
/// `diff(a, b) == diff(b, a)` and `diff(s, s)` is empty.
///
/// When `written_file` is the ignore-rules file, every key of both snapshots
/// is returned: ignore edits can flip any path.
///
/// # Examples
///
/// ```
/// use canopy_core::{StatusCode, StatusPair};
/// use canopy_notify::diff_statuses;
/// use canopy_vcs::StatusSnapshot;
/// use camino::Utf8PathBuf;
///
/// let m_ = StatusPair::new(StatusCode::Modified, StatusCode::Unmodified);
/// let _m = StatusPair::new(StatusCode::Unmodified, StatusCode::Modified);
/// let before = StatusSnapshot::from_entries(
///     "/r".into(),
///     vec![("/r/a".into(), m_), ("/r/b".into(), _m)],
/// );
/// let after = StatusSnapshot::from_entries("/r".into(), vec![("/r/b".into(), _m)]);
///
/// let changed = diff_statuses(&before, &after, Some("a"));
/// assert_eq!(changed.len(), 1);
/// assert!(changed.contains(&Utf8PathBuf::from("/r/a")));
/// ```
#[must_use]
pub fn diff_statuses(
    previous: &StatusSnapshot,
    current: &StatusSnapshot,
    written_file: Option<&str>,
) -> FxHashSet<Utf8PathBuf> {
    let mut changed = fx_hash_set();

    if written_file == Some(IGNORE_FILE_NAME) {
        changed.extend(current.paths().map(Utf8Path::to_path_buf));
        changed.extend(previous.paths().map(Utf8Path::to_path_buf));
        return changed;
    }

    let mut remaining: FxHashMap<&Utf8Path, StatusPair> = previous.iter().collect();
    for (path, status) in current.iter() {
        match remaining.remove(path) {
            Some(before) if before == status => {}
            _ => {
                changed.insert(path.to_path_buf());
            }
        }
    }

    // Present before, absent now: reverted to clean.
    changed.extend(remaining.into_keys().map(Utf8Path::to_path_buf));
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::StatusCode;
    use proptest::prelude::*;

    const M_: StatusPair = StatusPair::new(StatusCode::Modified, StatusCode::Unmodified);
    const _M: StatusPair = StatusPair::new(StatusCode::Unmodified, StatusCode::Modified);
    const UNTRACKED: StatusPair = StatusPair::new(StatusCode::Untracked, StatusCode::Untracked);

    fn snapshot(entries: &[(&str, StatusPair)]) -> StatusSnapshot {
        StatusSnapshot::from_entries(
            "/r".into(),
            entries
                .iter()
                .map(|(path, pair)| (Utf8PathBuf::from(*path), *pair)),
        )
    }

    fn sorted(set: FxHashSet<Utf8PathBuf>) -> Vec<String> {
        let mut paths: Vec<String> = set.into_iter().map(Utf8PathBuf::into_string).collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_fixed_file_is_reported() {
        let before = snapshot(&[("/r/a", M_), ("/r/b", _M)]);
        let after = snapshot(&[("/r/b", _M)]);
        assert_eq!(sorted(diff_statuses(&before, &after, Some("a"))), ["/r/a"]);
    }

    #[test]
    fn test_ignore_file_returns_full_union() {
        let before = snapshot(&[("/r/a", M_), ("/r/b", _M)]);
        let after = snapshot(&[("/r/b", _M)]);
        assert_eq!(
            sorted(diff_statuses(&before, &after, Some(".gitignore"))),
            ["/r/a", "/r/b"]
        );
    }

    #[test]
    fn test_changed_pair_and_new_path() {
        let before = snapshot(&[("/r/a", _M)]);
        let after = snapshot(&[("/r/a", M_), ("/r/new", UNTRACKED)]);
        assert_eq!(
            sorted(diff_statuses(&before, &after, None)),
            ["/r/a", "/r/new"]
        );
    }

    #[test]
    fn test_aggregated_directories_participate() {
        let before = snapshot(&[("/r/d/a", M_), ("/r/d/b", M_)]);
        let after = snapshot(&[("/r/d/a", M_), ("/r/d/b", _M)]);
        assert_eq!(
            sorted(diff_statuses(&before, &after, Some("b"))),
            ["/r/d", "/r/d/b"]
        );
    }

    fn snapshot_strategy() -> impl Strategy<Value = StatusSnapshot> {
        prop::collection::vec(
            (
                prop::sample::select(vec!["/r/a", "/r/b", "/r/d/c", "/r/d/e", "/r/f/g"]),
                prop::sample::select(vec![M_, _M, UNTRACKED]),
            ),
            0..6,
        )
        .prop_map(|entries| {
            StatusSnapshot::from_entries(
                "/r".into(),
                entries
                    .into_iter()
                    .map(|(path, pair)| (Utf8PathBuf::from(path), pair)),
            )
        })
    }

    proptest! {
        #[test]
        fn prop_diff_is_symmetric(a in snapshot_strategy(), b in snapshot_strategy()) {
            prop_assert_eq!(diff_statuses(&a, &b, None), diff_statuses(&b, &a, None));
        }

        #[test]
        fn prop_diff_with_self_is_empty(s in snapshot_strategy()) {
            prop_assert!(diff_statuses(&s, &s, None).is_empty());
        }

        #[test]
        fn prop_ignore_file_covers_every_key(a in snapshot_strategy(), b in snapshot_strategy()) {
            let changed = diff_statuses(&a, &b, Some(IGNORE_FILE_NAME));
            prop_assert!(a.paths().chain(b.paths()).all(|p| changed.contains(p)));
            prop_assert_eq!(changed.len(), a.paths().chain(b.paths()).collect::<FxHashSet<_>>().len());
        }
    }
}
