//! The source: one tree, its columns and the render pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use camino::{Utf8Path, Utf8PathBuf};
use canopy_core::{Config, FxHashSet, Node, NodeId};
use canopy_notify::{BufferLookup, HostEvent};
use canopy_probe::Prober;
use canopy_tree::NodeTree;
use canopy_vcs::GitTracker;
use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::sync::{OnceCell, broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::column::{Column, ColumnContext, ColumnDeps, RenderHandle};
use crate::error::SourceError;
use crate::indexes::ColumnIndexes;
use crate::registry::ColumnRegistry;
use crate::row::{RenderedRow, Row};
use crate::sink::RenderSink;

/// Capacity of the host event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

struct SourceInner {
    tree: NodeTree,
    columns: Vec<Arc<dyn Column>>,
    availability: OnceCell<Vec<bool>>,
    initialized: AtomicBool,
    indexes: ColumnIndexes,
    events: broadcast::Sender<HostEvent>,
    render: RenderHandle,
    render_rx: Mutex<Option<mpsc::UnboundedReceiver<FxHashSet<Utf8PathBuf>>>>,
    sink: Arc<dyn RenderSink>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// A file tree wired to its columns, host events and render sink.
///
/// Cloning is cheap and yields another handle to the same source. Call
/// [`shutdown`](Self::shutdown) when done so column tasks stop.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use camino::Utf8Path;
/// use canopy_core::Config;
/// use canopy_notify::{BufferLookup, BufferTable};
/// use canopy_source::{ColumnRegistry, RecordingSink, RenderSink, Source};
/// use canopy_vcs::GitTracker;
///
/// # async fn demo() -> Result<(), canopy_source::SourceError> {
/// let config = Arc::new(Config::default());
/// let sink = Arc::new(RecordingSink::new());
/// let source = Source::open(
///     Utf8Path::new("/srv/app"),
///     Arc::clone(&config),
///     Arc::new(GitTracker::new(&config.git)),
///     &ColumnRegistry::with_builtin(),
///     Arc::new(BufferTable::new()) as Arc<dyn BufferLookup>,
///     Arc::clone(&sink) as Arc<dyn RenderSink>,
/// )
/// .await?;
///
/// source.init().await;
/// source.load(source.root()).await?;
/// source.shutdown().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Source {
    inner: Arc<SourceInner>,
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let columns: Vec<&str> = self.inner.columns.iter().map(|c| c.name()).collect();
        f.debug_struct("Source")
            .field("root", &self.inner.tree.root_path())
            .field("columns", &columns)
            .finish_non_exhaustive()
    }
}

impl Source {
    /// Opens a source rooted at `root`.
    ///
    /// Builds the tree (only the root is materialized) and instantiates the
    /// columns named in `config.columns`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Tree`] if the root is not a directory or an
    /// ignore pattern is invalid.
    pub async fn open(
        root: &Utf8Path,
        config: Arc<Config>,
        tracker: Arc<GitTracker>,
        registry: &ColumnRegistry,
        lookup: Arc<dyn BufferLookup>,
        sink: Arc<dyn RenderSink>,
    ) -> Result<Self, SourceError> {
        let tree = NodeTree::open(root, &config.tree, Prober::local()).await?;
        let deps = ColumnDeps {
            root: tree.root_path(),
            config: Arc::clone(&config),
            tracker,
            lookup,
        };
        let columns = registry.instantiate(&config.columns, &deps);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (render, render_rx) = RenderHandle::channel();

        info!(root = %root, columns = columns.len(), "Opened source");

        Ok(Self {
            inner: Arc::new(SourceInner {
                tree,
                columns,
                availability: OnceCell::new(),
                initialized: AtomicBool::new(false),
                indexes: ColumnIndexes::new(),
                events,
                render,
                render_rx: Mutex::new(Some(render_rx)),
                sink,
                cancel: CancellationToken::new(),
                tasks: Mutex::new(Vec::new()),
            }),
        })
    }

    /// The underlying tree.
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &NodeTree {
        &self.inner.tree
    }

    /// Id of the root node.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.inner.tree.root()
    }

    /// Validates the columns, then initializes the available ones.
    ///
    /// Runs once; later calls do nothing.
    pub async fn init(&self) {
        let availability = self.availability().await;
        if self.inner.initialized.swap(true, Ordering::AcqRel) {
            return;
        }

        self.spawn_render_loop();

        let ctx = ColumnContext {
            events: &self.inner.events,
            render: &self.inner.render,
            cancel: &self.inner.cancel,
            tasks: &self.inner.tasks,
        };
        for (column, available) in self.inner.columns.iter().zip(availability) {
            if *available {
                column.init(&ctx);
            }
        }
        debug!("Source initialized");
    }

    /// Force-reloads the children of `id`, lets every column refresh, then
    /// renders the whole tree.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Tree`] if `id` is not materialized.
    pub async fn load(&self, id: NodeId) -> Result<Vec<Arc<Node>>, SourceError> {
        let children = self.inner.tree.load(id).await?;
        if let Some(node) = self.inner.tree.get(id) {
            let availability = self.availability().await;
            let reloads = self
                .inner
                .columns
                .iter()
                .zip(availability)
                .filter(|(_, available)| **available)
                .map(|(column, _)| column.reload(&node));
            join_all(reloads).await;
        }
        self.render().await;
        Ok(children)
    }

    /// Expands `id`, listing it on first use, and renders.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Tree`] if `id` is not materialized.
    pub async fn expand(&self, id: NodeId) -> Result<Vec<Arc<Node>>, SourceError> {
        let children = self.inner.tree.expand(id).await?;
        self.render().await;
        Ok(children)
    }

    /// Collapses `id`, dropping its materialized subtree, and renders.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Tree`] if `id` is not materialized.
    pub async fn collapse(&self, id: NodeId) -> Result<(), SourceError> {
        self.inner.tree.collapse(id)?;
        self.render().await;
        Ok(())
    }

    /// Expands the ancestors of `path` until it is materialized, then
    /// renders. Returns `None` if the path cannot be shown.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Tree`] if a directory on the way vanishes.
    pub async fn reveal(&self, path: &Utf8Path) -> Result<Option<Arc<Node>>, SourceError> {
        let node = self.inner.tree.reveal(path).await?;
        if node.is_some() {
            self.render().await;
        }
        Ok(node)
    }

    /// Draws every visible row and hands them to the sink.
    ///
    /// Returns the number of rows painted.
    pub async fn render(&self) -> usize {
        let availability = self.availability().await;
        let nodes = self.inner.tree.flatten();
        self.inner.indexes.clear();

        let rows: Vec<RenderedRow> = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| self.draw_row(node, index, availability))
            .collect();
        let painted = rows.len();
        self.inner.sink.paint(rows).await;
        painted
    }

    /// Redraws only the rows showing `paths`.
    ///
    /// Paths that are not materialized are skipped. Nothing is painted when
    /// no path matches. Returns the number of rows painted.
    pub async fn render_paths<I, P>(&self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Utf8Path>,
    {
        let availability = self.availability().await;
        let tree = &self.inner.tree;
        let row_indexes = tree.row_indexes();

        let mut rows: Vec<RenderedRow> = paths
            .into_iter()
            .filter_map(|path| {
                let path = path.as_ref();
                let node = tree.find_by_path(path);
                if node.is_none() {
                    debug!(path = %path, "Path not materialized, skipping redraw");
                }
                let node = node?;
                let index = *row_indexes.get(&node.uid)?;
                Some(self.draw_row(&node, index, availability))
            })
            .collect();

        if rows.is_empty() {
            return 0;
        }
        rows.sort_unstable_by_key(|row| row.index);
        let painted = rows.len();
        self.inner.sink.paint(rows).await;
        painted
    }

    /// Broadcasts a host event to the columns.
    ///
    /// Returns `false` if no column is listening.
    pub fn publish(&self, event: HostEvent) -> bool {
        match self.inner.events.send(event) {
            Ok(receivers) => {
                debug!(?event, receivers, "Published host event");
                true
            }
            Err(_) => {
                debug!(?event, "No subscribers for host event");
                false
            }
        }
    }

    /// The marked row index sets.
    #[inline]
    #[must_use]
    pub fn indexes(&self) -> &ColumnIndexes {
        &self.inner.indexes
    }

    /// Next row after `from` marked by `column`.
    #[must_use]
    pub fn next_index(&self, column: &str, from: usize) -> Option<usize> {
        self.inner.indexes.next(column, from)
    }

    /// Previous row before `from` marked by `column`.
    #[must_use]
    pub fn prev_index(&self, column: &str, from: usize) -> Option<usize> {
        self.inner.indexes.prev(column, from)
    }

    /// Cancels column tasks and waits for them to finish.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Task`] if a task panicked.
    pub async fn shutdown(&self) -> Result<(), SourceError> {
        self.inner.cancel.cancel();
        let tasks = std::mem::take(&mut *self.inner.tasks.lock());
        for task in tasks {
            task.await?;
        }
        info!("Source shut down");
        Ok(())
    }

    async fn availability(&self) -> &[bool] {
        self.inner
            .availability
            .get_or_init(|| async {
                let checks = self.inner.columns.iter().map(|column| async move {
                    let available = column.validate().await;
                    if !available {
                        warn!(column = column.name(), "Column unavailable");
                    }
                    available
                });
                join_all(checks).await
            })
            .await
    }

    fn draw_row(&self, node: &Node, index: usize, availability: &[bool]) -> RenderedRow {
        let mut row = Row::new();
        for (column, available) in self.inner.columns.iter().zip(availability) {
            if *available {
                let scope = self.inner.indexes.scope(column.name());
                column.draw(&mut row, node, index, &scope);
            } else {
                column.draw_unavailable(&mut row);
            }
        }
        RenderedRow {
            index,
            uid: node.uid,
            path: node.path.clone(),
            row,
        }
    }

    fn spawn_render_loop(&self) {
        let Some(mut requests) = self.inner.render_rx.lock().take() else {
            return;
        };
        let source: Weak<SourceInner> = Arc::downgrade(&self.inner);
        let cancel = self.inner.cancel.clone();

        let handle = tokio::spawn(async move {
            loop {
                let paths = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    paths = requests.recv() => match paths {
                        Some(paths) => paths,
                        None => break,
                    },
                };
                let Some(inner) = source.upgrade() else {
                    break;
                };
                let painted = Source { inner }.render_paths(&paths).await;
                debug!(requested = paths.len(), painted, "Partial render");
            }
        });
        self.inner.tasks.lock().push(handle);
    }
}
