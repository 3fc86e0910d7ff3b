//! The node arena.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use canopy_core::{
    FxHashMap, Node, NodeId, NodeKind, Permissions, TreeConfig, fx_hash_map,
};
use canopy_probe::{EntryProbe, Prober};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::TreeError;
use crate::filter::EntryFilter;
use crate::sort::Comparator;

/// One arena slot.
#[derive(Debug)]
struct Slot {
    node: Arc<Node>,
    parent: Option<NodeId>,
    /// `None` until the directory is loaded.
    children: Option<Vec<NodeId>>,
}

#[derive(Debug, Default)]
struct TreeState {
    slots: FxHashMap<NodeId, Slot>,
    paths: FxHashMap<Utf8PathBuf, NodeId>,
}

impl TreeState {
    fn insert(&mut self, node: Arc<Node>, parent: Option<NodeId>) {
        debug_assert!(
            self.slots
                .get(&node.uid)
                .is_none_or(|slot| slot.node.path == node.path),
            "node id {} already held by another path",
            node.uid
        );
        self.paths.insert(node.path.clone(), node.uid);
        self.slots.insert(
            node.uid,
            Slot {
                node,
                parent,
                children: None,
            },
        );
    }

    /// Removes `id` and everything below it.
    fn remove_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(slot) = self.slots.remove(&id) else {
                continue;
            };
            if self.paths.get(&slot.node.path) == Some(&id) {
                self.paths.remove(&slot.node.path);
            }
            stack.extend(slot.children.into_iter().flatten());
        }
    }

    /// Drops the descendants of `id` and marks it unloaded.
    fn clear_children(&mut self, id: NodeId) {
        let old = self
            .slots
            .get_mut(&id)
            .and_then(|slot| slot.children.take())
            .unwrap_or_default();
        for child in old {
            self.remove_subtree(child);
        }
    }

    /// Swaps in a new child list for `parent` and returns the children
    /// actually placed.
    ///
    /// Children that survive keep their slot (and loaded subtree); children
    /// that disappeared are pruned. A slot is matched by id and path, so an
    /// entry whose id is already held by a different path is skipped rather
    /// than overwriting that slot.
    fn replace_children(&mut self, parent: NodeId, children: &[Arc<Node>]) -> Vec<Arc<Node>> {
        let incoming: FxHashMap<NodeId, &Utf8Path> = children
            .iter()
            .map(|child| (child.uid, child.path.as_path()))
            .collect();
        let old = self
            .slots
            .get_mut(&parent)
            .and_then(|slot| slot.children.take())
            .unwrap_or_default();
        for id in old {
            let survives = self
                .slots
                .get(&id)
                .is_some_and(|slot| incoming.get(&id) == Some(&slot.node.path.as_path()));
            if !survives {
                self.remove_subtree(id);
            }
        }

        let mut placed = Vec::with_capacity(children.len());
        for child in children {
            let stale_subtree = match self.slots.get_mut(&child.uid) {
                Some(slot) if slot.node.path == child.path => {
                    slot.node = Arc::clone(child);
                    slot.parent = Some(parent);
                    !child.directory && slot.children.is_some()
                }
                Some(slot) => {
                    warn!(
                        id = %child.uid,
                        path = %child.path,
                        holder = %slot.node.path,
                        "node id collision, entry skipped"
                    );
                    continue;
                }
                None => {
                    self.insert(Arc::clone(child), Some(parent));
                    false
                }
            };
            if stale_subtree {
                self.clear_children(child.uid);
            }
            placed.push(Arc::clone(child));
        }

        if let Some(slot) = self.slots.get_mut(&parent) {
            slot.children = Some(placed.iter().map(|child| child.uid).collect());
        }
        placed
    }
}

/// The in-memory mirror of a filesystem subtree.
///
/// Nodes live in an arena keyed by [`NodeId`]; every slot stores its parent
/// id and, once loaded, an ordered list of child ids. Directory contents are
/// probed lazily by [`load`](Self::load) / [`expand`](Self::expand).
///
/// # Consistency
///
/// All state sits behind one `RwLock`. Listing I/O runs without the lock;
/// the new child list is swapped in under a single write guard, so readers
/// either see the old list or the complete new one.
///
/// # Examples
///
/// ```no_run
/// use canopy_core::TreeConfig;
/// use canopy_probe::Prober;
/// use canopy_tree::NodeTree;
/// use camino::Utf8Path;
///
/// # async fn demo() -> Result<(), canopy_tree::TreeError> {
/// let tree = NodeTree::open(Utf8Path::new("/srv/app"), &TreeConfig::default(), Prober::local()).await?;
/// for child in tree.load(tree.root()).await? {
///     println!("{}{}", child.name, if child.directory { "/" } else { "" });
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct NodeTree {
    root: NodeId,
    prober: Prober,
    filter: EntryFilter,
    comparator: Comparator,
    state: RwLock<TreeState>,
}

impl NodeTree {
    /// Opens a tree rooted at `root` with the comparator from `config.sort`.
    ///
    /// Only the root is materialized; nothing is listed yet.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidRoot`] if `root` is not an existing
    /// directory, or [`TreeError::InvalidPattern`] for a bad ignore pattern.
    pub async fn open(
        root: &Utf8Path,
        config: &TreeConfig,
        prober: Prober,
    ) -> Result<Self, TreeError> {
        Self::open_with_comparator(root, config, prober, Comparator::from_config(&config.sort))
            .await
    }

    /// Opens a tree with an explicit sibling comparator.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub async fn open_with_comparator(
        root: &Utf8Path,
        config: &TreeConfig,
        prober: Prober,
        comparator: Comparator,
    ) -> Result<Self, TreeError> {
        let permissions = if root.as_str().is_empty() {
            // The platform root that lists drive letters.
            Permissions {
                readable: true,
                writable: false,
                executable: true,
            }
        } else {
            let entry = prober
                .probe(root)
                .await
                .map_err(|err| TreeError::invalid_root(root, err.to_string()))?;
            if !entry.directory {
                return Err(TreeError::invalid_root(root, "not a directory"));
            }
            entry.permissions
        };

        let filter = EntryFilter::new(root, config)?;
        let node = Arc::new(Node::root(root, permissions));
        let id = node.uid;

        let mut state = TreeState::default();
        state.insert(node, None);
        debug!(root = %root, "opened tree");

        Ok(Self {
            root: id,
            prober,
            filter,
            comparator,
            state: RwLock::new(state),
        })
    }

    /// Id of the root node.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Absolute path of the root.
    #[must_use]
    pub fn root_path(&self) -> Utf8PathBuf {
        self.get(self.root)
            .map(|node| node.path.clone())
            .unwrap_or_default()
    }

    /// (Re-)populates the children of `id` from the filesystem.
    ///
    /// Returns the new children in comparator order. Hidden and ignored
    /// entries are left out. A non-directory has no children; an unreadable
    /// directory is logged and comes back empty.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NodeNotFound`] if `id` is not materialized, or
    /// was pruned while the listing ran.
    pub async fn load(&self, id: NodeId) -> Result<Vec<Arc<Node>>, TreeError> {
        let node = self.get(id).ok_or(TreeError::NodeNotFound(id))?;
        if !node.directory {
            return Ok(Vec::new());
        }

        let entries = match self.prober.list(&node.path).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %node.path, error = %err, "directory listing failed, showing it empty");
                Vec::new()
            }
        };

        let mut children: Vec<Node> = entries
            .into_iter()
            .map(node_from_probe)
            .filter(|child| self.filter.accepts(child))
            .collect();
        children.sort_by(|a, b| self.comparator.compare(a, b));
        let children: Vec<Arc<Node>> = children.into_iter().map(Arc::new).collect();

        let children = {
            let mut state = self.state.write();
            if !state.slots.contains_key(&id) {
                return Err(TreeError::NodeNotFound(id));
            }
            state.replace_children(id, &children)
        };

        debug!(path = %node.path, children = children.len(), "loaded directory");
        Ok(children)
    }

    /// Loads `id` only if it has not been loaded yet, then returns its
    /// children.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NodeNotFound`] if `id` is not materialized.
    pub async fn expand(&self, id: NodeId) -> Result<Vec<Arc<Node>>, TreeError> {
        if let Some(children) = self.children(id) {
            return Ok(children);
        }
        self.load(id).await
    }

    /// Discards the descendants of `id`; it becomes unloaded.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NodeNotFound`] if `id` is not materialized.
    pub fn collapse(&self, id: NodeId) -> Result<(), TreeError> {
        let mut state = self.state.write();
        if !state.slots.contains_key(&id) {
            return Err(TreeError::NodeNotFound(id));
        }
        state.clear_children(id);
        Ok(())
    }

    /// Expands every ancestor of `path` from the root down until `path`
    /// itself is materialized.
    ///
    /// Returns `None` when `path` is outside the tree, hidden, ignored or
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NodeNotFound`] if a directory on the way is
    /// pruned concurrently.
    pub async fn reveal(&self, path: &Utf8Path) -> Result<Option<Arc<Node>>, TreeError> {
        let root_path = self.root_path();
        let Ok(relative) = path.strip_prefix(&root_path) else {
            return Ok(None);
        };

        let mut current = self.root;
        let mut walked = root_path;
        for component in relative.components() {
            walked.push(component);
            let children = self.expand(current).await?;
            let Some(next) = children.iter().find(|child| child.path == walked) else {
                debug!(path = %path, missing = %walked, "cannot reveal path");
                return Ok(None);
            };
            current = next.uid;
        }
        Ok(self.get(current))
    }

    /// The node currently materialized for `path`, if any.
    #[must_use]
    pub fn find_by_path(&self, path: &Utf8Path) -> Option<Arc<Node>> {
        let state = self.state.read();
        let id = state.paths.get(path)?;
        state.slots.get(id).map(|slot| Arc::clone(&slot.node))
    }

    /// The node with this id, if materialized.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<Arc<Node>> {
        self.state
            .read()
            .slots
            .get(&id)
            .map(|slot| Arc::clone(&slot.node))
    }

    /// The loaded children of `id`, or `None` if it is unknown or unloaded.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Option<Vec<Arc<Node>>> {
        let state = self.state.read();
        let ids = state.slots.get(&id)?.children.as_ref()?;
        Some(
            ids.iter()
                .filter_map(|child| state.slots.get(child))
                .map(|slot| Arc::clone(&slot.node))
                .collect(),
        )
    }

    /// Parent id of `id` (`None` for the root and unknown ids).
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.state.read().slots.get(&id)?.parent
    }

    /// Returns `true` if the children of `id` are loaded.
    #[must_use]
    pub fn is_loaded(&self, id: NodeId) -> bool {
        self.state
            .read()
            .slots
            .get(&id)
            .is_some_and(|slot| slot.children.is_some())
    }

    /// All materialized nodes in display order: depth-first, root first.
    #[must_use]
    pub fn flatten(&self) -> Vec<Arc<Node>> {
        let state = self.state.read();
        let mut rows = Vec::with_capacity(state.slots.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(slot) = state.slots.get(&id) else {
                continue;
            };
            rows.push(Arc::clone(&slot.node));
            if let Some(children) = &slot.children {
                stack.extend(children.iter().rev());
            }
        }
        rows
    }

    /// Row index of `id` in [`flatten`](Self::flatten) order.
    #[must_use]
    pub fn visible_index(&self, id: NodeId) -> Option<usize> {
        self.flatten().iter().position(|node| node.uid == id)
    }

    /// Number of materialized nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().slots.len()
    }

    /// Always `false`: the root is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().slots.is_empty()
    }

    /// Whether hidden entries are listed.
    #[must_use]
    pub fn show_hidden(&self) -> bool {
        self.filter.show_hidden()
    }

    /// Toggles hidden entries; takes effect on the next load.
    pub fn set_show_hidden(&self, show: bool) {
        self.filter.set_show_hidden(show);
    }

    /// Map from node id to row index for every materialized node.
    #[must_use]
    pub fn row_indexes(&self) -> FxHashMap<NodeId, usize> {
        let rows = self.flatten();
        let mut indexes = fx_hash_map();
        indexes.reserve(rows.len());
        for (index, node) in rows.iter().enumerate() {
            indexes.insert(node.uid, index);
        }
        indexes
    }
}

fn node_from_probe(entry: EntryProbe) -> Node {
    Node {
        uid: NodeId::for_path(&entry.path),
        kind: NodeKind::Child,
        hidden: Node::is_hidden_name(&entry.name),
        directory: entry.directory,
        expandable: entry.directory,
        symbolic_link: entry.symbolic_link,
        permissions: entry.permissions,
        lstat: entry.lstat,
        name: entry.name,
        path: entry.path,
    }
}
