//! The write-event pass: reload, diff, render, store.

use std::sync::Arc;

use camino::Utf8PathBuf;
use canopy_core::{BufferId, FxHashSet};
use canopy_vcs::{GitTracker, StatusSnapshot};
use parking_lot::Mutex;
use tracing::debug;

use crate::buffers::BufferLookup;
use crate::diff::diff_statuses;
use crate::error::NotifyError;

/// Turns buffer-written events into sets of paths needing a redraw.
///
/// Holds the previous-status baseline for one source. Passes are expected to
/// be serialized by a [`Debouncer`](crate::Debouncer); the baseline is
/// replaced only after a pass has rendered.
pub struct StatusChangeNotifier {
    tracker: Arc<GitTracker>,
    lookup: Arc<dyn BufferLookup>,
    previous: Mutex<Arc<StatusSnapshot>>,
}

impl std::fmt::Debug for StatusChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusChangeNotifier")
            .field("tracker", &self.tracker)
            .field("baseline_len", &self.previous.lock().len())
            .finish_non_exhaustive()
    }
}

impl StatusChangeNotifier {
    /// Creates a notifier with an empty baseline.
    #[must_use]
    pub fn new(tracker: Arc<GitTracker>, lookup: Arc<dyn BufferLookup>) -> Self {
        Self {
            tracker,
            lookup,
            previous: Mutex::new(Arc::new(StatusSnapshot::default())),
        }
    }

    /// The tracker this notifier reloads through.
    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &Arc<GitTracker> {
        &self.tracker
    }

    /// Replaces the diff baseline, e.g. after a full column reload.
    pub fn set_baseline(&self, snapshot: Arc<StatusSnapshot>) {
        *self.previous.lock() = snapshot;
    }

    /// The current diff baseline.
    #[must_use]
    pub fn baseline(&self) -> Arc<StatusSnapshot> {
        Arc::clone(&self.previous.lock())
    }

    /// Runs one pass for a written buffer.
    ///
    /// Resolves the buffer to its file, reloads the status of the file's
    /// directory and diffs the result against the baseline. A non-empty
    /// changed set is handed to `render`; the new snapshot then becomes the
    /// baseline.
    ///
    /// Returns `Ok(None)` when the buffer has no file.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Vcs`] when the reload fails. The baseline is
    /// left untouched in that case.
    pub async fn process_write<R>(
        &self,
        buffer: BufferId,
        render: R,
    ) -> Result<Option<FxHashSet<Utf8PathBuf>>, NotifyError>
    where
        R: FnOnce(&FxHashSet<Utf8PathBuf>),
    {
        let Some(path) = self.lookup.buffer_path(buffer).await else {
            debug!(%buffer, "Write event for unknown buffer");
            return Ok(None);
        };
        let directory = path.parent().map_or_else(|| path.clone(), |p| p.to_path_buf());

        self.tracker.reload(&directory).await?;
        let current = self.tracker.get_statuses(&directory);

        let previous = self.baseline();
        let changed = diff_statuses(&previous, &current, path.file_name());
        debug!(path = %path, changed = changed.len(), "Status diff computed");

        if !changed.is_empty() {
            render(&changed);
        }
        self.set_baseline(current);

        Ok(Some(changed))
    }
}
