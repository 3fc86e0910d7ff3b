//! Parser for `git status --porcelain -z` output.
//!
//! Each record is `XY PATH\0`. Renames and copies carry a second field with
//! the source path: `XY PATH\0ORIG_PATH\0`. Paths are relative to the
//! repository root.

use camino::{Utf8Path, Utf8PathBuf};
use canopy_core::StatusPair;
use tracing::debug;

/// Parses NUL-separated porcelain v1 output into absolute-path entries.
///
/// Records with unknown status characters or non-UTF-8 paths are skipped.
/// Directory entries (ignored or untracked directories end in `/`) are
/// stored without the trailing separator.
///
/// # Examples
///
/// ```
/// use canopy_core::{StatusCode, StatusPair};
/// use canopy_vcs::parse_porcelain;
/// use camino::Utf8Path;
///
/// let entries = parse_porcelain(b" M src/lib.rs\0?? notes.txt\0", Utf8Path::new("/r"));
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[0].0, "/r/src/lib.rs");
/// assert_eq!(entries[0].1, StatusPair::new(StatusCode::Unmodified, StatusCode::Modified));
/// ```
pub fn parse_porcelain(output: &[u8], root: &Utf8Path) -> Vec<(Utf8PathBuf, StatusPair)> {
    let mut entries = Vec::new();
    let mut fields = output.split(|&byte| byte == 0);

    while let Some(record) = fields.next() {
        let [x, y, b' ', path @ ..] = record else {
            if !record.is_empty() {
                debug!(record = %String::from_utf8_lossy(record), "skipping malformed status record");
            }
            continue;
        };

        if matches!(*x, b'R' | b'C') || matches!(*y, b'R' | b'C') {
            fields.next();
        }

        let Some(pair) = StatusPair::from_chars(char::from(*x), char::from(*y)) else {
            debug!(x = %char::from(*x), y = %char::from(*y), "skipping unknown status code");
            continue;
        };

        let Ok(path) = std::str::from_utf8(path) else {
            debug!(path = %String::from_utf8_lossy(path), "skipping non-UTF-8 path");
            continue;
        };
        let path = path.strip_suffix('/').unwrap_or(path);
        if path.is_empty() {
            continue;
        }

        entries.push((root.join(path), pair));
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::StatusCode;

    fn pair(x: char, y: char) -> StatusPair {
        StatusPair::from_chars(x, y).unwrap()
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_porcelain(b"", Utf8Path::new("/r")).is_empty());
    }

    #[test]
    fn test_parse_basic_records() {
        let output = b"M  staged.rs\0 M unstaged.rs\0?? new.txt\0";
        let entries = parse_porcelain(output, Utf8Path::new("/r"));

        assert_eq!(
            entries,
            vec![
                (Utf8PathBuf::from("/r/staged.rs"), pair('M', ' ')),
                (Utf8PathBuf::from("/r/unstaged.rs"), pair(' ', 'M')),
                (Utf8PathBuf::from("/r/new.txt"), pair('?', '?')),
            ]
        );
    }

    #[test]
    fn test_parse_rename_skips_source_path() {
        let output = b"R  new_name.rs\0old_name.rs\0 M other.rs\0";
        let entries = parse_porcelain(output, Utf8Path::new("/r"));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "/r/new_name.rs");
        assert_eq!(entries[0].1.index, StatusCode::Renamed);
        assert_eq!(entries[1].0, "/r/other.rs");
    }

    #[test]
    fn test_parse_directory_entry_strips_slash() {
        let entries = parse_porcelain(b"!! target/\0", Utf8Path::new("/r"));
        assert_eq!(entries, vec![(Utf8PathBuf::from("/r/target"), pair('!', '!'))]);
    }

    #[test]
    fn test_parse_skips_unknown_codes() {
        let entries = parse_porcelain(b"ZZ weird\0 D gone.rs\0", Utf8Path::new("/r"));
        assert_eq!(entries, vec![(Utf8PathBuf::from("/r/gone.rs"), pair(' ', 'D'))]);
    }

    #[test]
    fn test_parse_paths_with_spaces() {
        let entries = parse_porcelain(b"?? my notes.txt\0", Utf8Path::new("/r"));
        assert_eq!(entries[0].0, "/r/my notes.txt");
    }
}
