//! Listing filters: hidden entries and ignore patterns.

use std::sync::atomic::{AtomicBool, Ordering};

use camino::Utf8Path;
use canopy_core::{Node, TreeConfig};
use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::TreeError;

/// Decides which probed entries become nodes.
///
/// Patterns use gitignore syntax and are anchored at the tree root, so
/// `target` hides every `target` entry while `/target` hides only the one at
/// the top.
#[derive(Debug)]
pub struct EntryFilter {
    show_hidden: AtomicBool,
    ignore: Gitignore,
}

impl EntryFilter {
    /// Compiles the filter for a tree rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidPattern`] if a pattern does not compile.
    pub fn new(root: &Utf8Path, config: &TreeConfig) -> Result<Self, TreeError> {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in &config.ignore_patterns {
            builder
                .add_line(None, pattern)
                .map_err(|source| TreeError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
        }
        let ignore = builder.build().map_err(|source| TreeError::InvalidPattern {
            pattern: config.ignore_patterns.join(", "),
            source,
        })?;

        Ok(Self {
            show_hidden: AtomicBool::new(config.show_hidden),
            ignore,
        })
    }

    /// Whether hidden entries are listed.
    #[inline]
    pub fn show_hidden(&self) -> bool {
        self.show_hidden.load(Ordering::Relaxed)
    }

    /// Toggles hidden entries; takes effect on the next load.
    #[inline]
    pub fn set_show_hidden(&self, show: bool) {
        self.show_hidden.store(show, Ordering::Relaxed);
    }

    /// Returns `true` if `node` should appear in its parent's listing.
    pub fn accepts(&self, node: &Node) -> bool {
        if node.hidden && !self.show_hidden() {
            return false;
        }
        !self.ignore.matched(&node.path, node.directory).is_ignore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use canopy_core::{NodeId, NodeKind, Permissions};

    fn node(path: &str, directory: bool) -> Node {
        let path = Utf8PathBuf::from(path);
        let name = path.file_name().unwrap().to_owned();
        Node {
            uid: NodeId::for_path(&path),
            kind: NodeKind::Child,
            hidden: Node::is_hidden_name(&name),
            name,
            path,
            directory,
            expandable: directory,
            symbolic_link: false,
            permissions: Permissions::default(),
            lstat: None,
        }
    }

    fn filter(patterns: &[&str]) -> EntryFilter {
        let config = TreeConfig {
            ignore_patterns: patterns.iter().map(ToString::to_string).collect(),
            ..TreeConfig::default()
        };
        EntryFilter::new(Utf8Path::new("/r"), &config).unwrap()
    }

    #[test]
    fn test_hidden_toggle() {
        let filter = filter(&[]);
        let dotfile = node("/r/.env", false);
        assert!(!filter.accepts(&dotfile));
        filter.set_show_hidden(true);
        assert!(filter.accepts(&dotfile));
    }

    #[test]
    fn test_ignore_patterns() {
        let filter = filter(&["*.log", "/build", "node_modules/"]);
        assert!(!filter.accepts(&node("/r/debug.log", false)));
        assert!(!filter.accepts(&node("/r/build", true)));
        assert!(filter.accepts(&node("/r/src/build", true)));
        assert!(!filter.accepts(&node("/r/web/node_modules", true)));
        assert!(filter.accepts(&node("/r/node_modules", false)));
        assert!(filter.accepts(&node("/r/main.rs", false)));
    }
}
