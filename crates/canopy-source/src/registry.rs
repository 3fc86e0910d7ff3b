//! Name to factory mapping for columns.

use std::sync::Arc;

use canopy_core::{FxHashMap, fx_hash_map};
use tracing::warn;

use crate::column::{Column, ColumnDeps};
use crate::columns::{FilenameColumn, GitColumn, IndentColumn, ReadonlyColumn};

/// Builds one column instance for a source.
pub type ColumnFactory = Arc<dyn Fn(&ColumnDeps) -> Arc<dyn Column> + Send + Sync>;

/// Registered column factories.
///
/// # Examples
///
/// ```
/// use canopy_source::ColumnRegistry;
///
/// let registry = ColumnRegistry::with_builtin();
/// assert!(registry.contains("git"));
/// assert_eq!(registry.names(), ["filename", "git", "indent", "readonly"]);
/// ```
#[derive(Clone)]
pub struct ColumnRegistry {
    factories: FxHashMap<String, ColumnFactory>,
}

impl std::fmt::Debug for ColumnRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl Default for ColumnRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl ColumnRegistry {
    /// Creates a registry with no columns.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: fx_hash_map(),
        }
    }

    /// Creates a registry with `indent`, `filename`, `readonly` and `git`.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("indent", |deps| Arc::new(IndentColumn::new(&deps.root)));
        registry.register("filename", |_| Arc::new(FilenameColumn));
        registry.register("readonly", |_| Arc::new(ReadonlyColumn));
        registry.register("git", |deps| Arc::new(GitColumn::new(deps)));
        registry
    }

    /// Registers a factory, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ColumnDeps) -> Arc<dyn Column> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Returns `true` if a factory is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds the named columns in order. Unknown names are logged and
    /// skipped.
    pub fn instantiate<S: AsRef<str>>(&self, names: &[S], deps: &ColumnDeps) -> Vec<Arc<dyn Column>> {
        names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                let factory = self.factories.get(name);
                if factory.is_none() {
                    warn!(column = name, "Unknown column, skipping");
                }
                factory.map(|factory| factory(deps))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexes::IndexScope;
    use crate::row::Row;
    use canopy_core::{Config, GitConfig, Node};
    use canopy_notify::{BufferLookup, BufferTable};
    use canopy_vcs::GitTracker;

    struct Marker;

    impl Column for Marker {
        fn name(&self) -> &'static str {
            "marker"
        }

        fn draw(&self, row: &mut Row, _node: &Node, _index: usize, _indexes: &IndexScope<'_>) {
            row.add("#");
        }
    }

    fn deps() -> ColumnDeps {
        ColumnDeps {
            root: "/r".into(),
            config: Arc::new(Config::default()),
            tracker: Arc::new(GitTracker::new(&GitConfig::default())),
            lookup: Arc::new(BufferTable::new()) as Arc<dyn BufferLookup>,
        }
    }

    #[test]
    fn test_instantiate_keeps_order_and_skips_unknown() {
        let registry = ColumnRegistry::with_builtin();
        let columns = registry.instantiate(&["git", "nope", "indent", "filename"], &deps());
        let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["git", "indent", "filename"]);
    }

    #[test]
    fn test_custom_column_registration() {
        let mut registry = ColumnRegistry::empty();
        assert!(registry.names().is_empty());
        registry.register("marker", |_| Arc::new(Marker));

        let columns = registry.instantiate(&["marker".to_owned()], &deps());
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].name(), "marker");
    }
}
