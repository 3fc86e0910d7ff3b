//! The column plug-in interface.
//!
//! A column contributes segments to every row. Columns are built per source
//! by a factory in the [`ColumnRegistry`](crate::ColumnRegistry) and receive
//! everything they need through [`ColumnDeps`] and [`ColumnContext`].
//!
//! # Lifecycle
//!
//! 1. [`validate`](Column::validate) once, before the first draw. A column
//!    that fails draws through [`draw_unavailable`](Column::draw_unavailable)
//!    for the rest of the session.
//! 2. [`init`](Column::init) once for available columns: subscribe to host
//!    events, spawn background tasks.
//! 3. [`reload`](Column::reload) whenever a directory is force-loaded.
//! 4. [`draw`](Column::draw) for every rendered row.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use canopy_core::{Config, FxHashSet, Node};
use canopy_notify::{BufferLookup, HostEvent};
use canopy_vcs::GitTracker;
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::indexes::IndexScope;
use crate::row::Row;

/// A pluggable contributor to tree rows.
#[async_trait]
pub trait Column: Send + Sync {
    /// Registry name, also the key of the column's index set.
    fn name(&self) -> &'static str;

    /// Checks that the column can work, e.g. that an external tool exists.
    async fn validate(&self) -> bool {
        true
    }

    /// Sets up subscriptions and background tasks.
    fn init(&self, _ctx: &ColumnContext<'_>) {}

    /// Refreshes column state after `node` was force-loaded.
    async fn reload(&self, _node: &Node) {}

    /// Appends this column's contribution for `node` at row `index`.
    fn draw(&self, row: &mut Row, node: &Node, index: usize, indexes: &IndexScope<'_>);

    /// Appends a placeholder when validation failed.
    fn draw_unavailable(&self, _row: &mut Row) {}
}

/// Shared services handed to column factories.
#[derive(Clone)]
pub struct ColumnDeps {
    /// Root of the tree the columns draw.
    pub root: Utf8PathBuf,

    /// Full configuration.
    pub config: Arc<Config>,

    /// The host's VCS tracker.
    pub tracker: Arc<GitTracker>,

    /// The host's buffer lookup.
    pub lookup: Arc<dyn BufferLookup>,
}

impl std::fmt::Debug for ColumnDeps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnDeps")
            .field("root", &self.root)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

/// Requests a partial render from outside the draw path.
#[derive(Debug, Clone)]
pub struct RenderHandle {
    tx: mpsc::UnboundedSender<FxHashSet<Utf8PathBuf>>,
}

impl RenderHandle {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<FxHashSet<Utf8PathBuf>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Asks the source to redraw `paths`. Returns `false` once the source
    /// has shut down.
    pub fn request(&self, paths: FxHashSet<Utf8PathBuf>) -> bool {
        if paths.is_empty() {
            return true;
        }
        self.tx.send(paths).is_ok()
    }
}

/// What a column may use during [`Column::init`].
pub struct ColumnContext<'a> {
    pub(crate) events: &'a broadcast::Sender<HostEvent>,
    pub(crate) render: &'a RenderHandle,
    pub(crate) cancel: &'a CancellationToken,
    pub(crate) tasks: &'a Mutex<Vec<JoinHandle<()>>>,
}

impl ColumnContext<'_> {
    /// A receiver of host events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.events.subscribe()
    }

    /// A handle for requesting partial renders.
    #[must_use]
    pub fn render_handle(&self) -> RenderHandle {
        self.render.clone()
    }

    /// A token cancelled when the source shuts down.
    #[must_use]
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Spawns a task the source awaits on shutdown.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        let mut tasks = self.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
        debug!(tasks = tasks.len(), "Spawned column task");
    }
}
