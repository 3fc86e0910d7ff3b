//! Path filtering for filesystem watch events.
//!
//! Filters run on the blocking watcher thread before an event reaches the
//! channel, so cheap predicates keep bursts (e.g. a `git commit` rewriting
//! `.git/`) from flooding the consumer.
//!
//! # Examples
//!
//! ```
//! use canopy_notify::{PathFilter, SkipDirsFilter};
//! use camino::Utf8Path;
//!
//! let filter = SkipDirsFilter::default();
//!
//! assert!(filter.should_process(Utf8Path::new("/r/src/lib.rs")));
//! assert!(!filter.should_process(Utf8Path::new("/r/.git/index")));
//! ```

use camino::Utf8Path;
use smallvec::SmallVec;

/// A predicate deciding which changed paths are forwarded.
///
/// Filters must be [`Send`] and [`Sync`] because they are called from the
/// blocking watcher thread, and `'static` to be moved into it.
pub trait PathFilter: Send + Sync + 'static {
    /// Returns `true` if a change at `path` should be forwarded.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

/// Rejects paths below any directory with one of the given names.
///
/// The default skips `.git` internals.
#[derive(Debug, Clone)]
pub struct SkipDirsFilter {
    names: SmallVec<[String; 4]>,
}

impl Default for SkipDirsFilter {
    fn default() -> Self {
        Self::new(&[".git"])
    }
}

impl SkipDirsFilter {
    /// Creates a filter skipping the named directories.
    #[must_use]
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|name| (*name).to_owned()).collect(),
        }
    }

    /// Adds another directory name to skip.
    #[must_use]
    pub fn with_dir(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }
}

impl PathFilter for SkipDirsFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        !path
            .components()
            .any(|component| self.names.iter().any(|name| name == component.as_str()))
    }
}
