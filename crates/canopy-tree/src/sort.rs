//! Sibling ordering.

use std::cmp::Ordering;
use std::sync::Arc;

use canopy_core::{Node, SortConfig};

type CompareFn = dyn Fn(&Node, &Node) -> Ordering + Send + Sync;

/// Orders the children of a directory.
///
/// Built from [`SortConfig`] by default; hosts with their own rules can
/// supply a closure through [`Comparator::custom`]. Whatever the rule, the
/// order must be total so repeated loads produce identical child lists.
///
/// # Examples
///
/// ```
/// use canopy_core::SortConfig;
/// use canopy_tree::Comparator;
///
/// let by_config = Comparator::from_config(&SortConfig::default());
/// let by_name = Comparator::custom(|a, b| a.name.cmp(&b.name));
/// # let _ = (by_config, by_name);
/// ```
#[derive(Clone)]
pub struct Comparator {
    compare: Arc<CompareFn>,
}

impl std::fmt::Debug for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comparator").finish_non_exhaustive()
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::from_config(&SortConfig::default())
    }
}

impl Comparator {
    /// Directories first (when configured), then by name.
    ///
    /// Case-insensitive comparison falls back to the exact name so that
    /// `Readme` and `README` still have a fixed order.
    #[must_use]
    pub fn from_config(config: &SortConfig) -> Self {
        let SortConfig {
            directories_first,
            case_sensitive,
        } = *config;

        Self::custom(move |a, b| {
            let kind = if directories_first {
                b.directory.cmp(&a.directory)
            } else {
                Ordering::Equal
            };
            kind.then_with(|| {
                if case_sensitive {
                    a.name.cmp(&b.name)
                } else {
                    cmp_ignore_case(&a.name, &b.name).then_with(|| a.name.cmp(&b.name))
                }
            })
        })
    }

    /// Wraps an arbitrary ordering.
    #[must_use]
    pub fn custom(compare: impl Fn(&Node, &Node) -> Ordering + Send + Sync + 'static) -> Self {
        Self {
            compare: Arc::new(compare),
        }
    }

    /// Compares two siblings.
    #[inline]
    #[must_use]
    pub fn compare(&self, a: &Node, b: &Node) -> Ordering {
        (self.compare)(a, b)
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use canopy_core::{NodeId, NodeKind, Permissions};

    fn node(name: &str, directory: bool) -> Node {
        let path = Utf8PathBuf::from("/r").join(name);
        Node {
            uid: NodeId::for_path(&path),
            kind: NodeKind::Child,
            path,
            name: name.to_owned(),
            directory,
            expandable: directory,
            hidden: false,
            symbolic_link: false,
            permissions: Permissions::default(),
            lstat: None,
        }
    }

    fn sorted(comparator: &Comparator, mut nodes: Vec<Node>) -> Vec<String> {
        nodes.sort_by(|a, b| comparator.compare(a, b));
        nodes.into_iter().map(|n| n.name).collect()
    }

    fn sample() -> Vec<Node> {
        vec![
            node("b.txt", false),
            node("Zeta", true),
            node("a.txt", false),
            node("alpha", true),
            node("B.txt", false),
        ]
    }

    #[test]
    fn test_default_is_directories_first_case_insensitive() {
        let names = sorted(&Comparator::default(), sample());
        assert_eq!(names, ["alpha", "Zeta", "a.txt", "B.txt", "b.txt"]);
    }

    #[test]
    fn test_case_sensitive_without_directories_first() {
        let config = SortConfig {
            directories_first: false,
            case_sensitive: true,
        };
        let names = sorted(&Comparator::from_config(&config), sample());
        assert_eq!(names, ["B.txt", "Zeta", "a.txt", "alpha", "b.txt"]);
    }

    #[test]
    fn test_custom_comparator() {
        let reverse = Comparator::custom(|a, b| b.name.cmp(&a.name));
        let names = sorted(&reverse, sample());
        assert_eq!(names, ["b.txt", "alpha", "a.txt", "Zeta", "B.txt"]);
    }
}
