//! Filesystem bridge for hosts without an editor.
//!
//! [`FsWatcher`] runs the synchronous `notify` debouncer on tokio's blocking
//! pool and forwards filtered, UTF-8 [`FileEvent`]s over an mpsc channel.
//! A headless host maps each event to a buffer (see
//! [`BufferTable`](crate::BufferTable)) and publishes
//! [`HostEvent::BufferWritten`](crate::HostEvent::BufferWritten).
//!
//! ```text
//! ┌──────────────── spawn_blocking ────────────────┐
//! │ RecommendedWatcher → notify debouncer → filter │
//! └───────────────────────┬────────────────────────┘
//!                         │ blocking_send
//!                         ▼
//!           mpsc::Receiver<FileEvent> (async)
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use canopy_core::WatchConfig;
//! use canopy_notify::{FsWatcher, SkipDirsFilter};
//! use camino::Utf8Path;
//!
//! # async fn demo() -> Result<(), canopy_notify::NotifyError> {
//! let mut watcher =
//!     FsWatcher::new(Utf8Path::new("."), &WatchConfig::default(), SkipDirsFilter::default())
//!         .await?;
//!
//! while let Some(event) = watcher.recv().await {
//!     println!("changed: {}", event.path);
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use canopy_core::WatchConfig;
use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::error::NotifyError;
use crate::events::FileEvent;
use crate::filter::PathFilter;

/// Default channel capacity for file events.
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Streams debounced filesystem changes to async code.
///
/// Dropping the watcher signals the blocking thread to stop; call
/// [`shutdown`](Self::shutdown) to also wait for it and observe its result.
pub struct FsWatcher {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task_handle: Option<JoinHandle<Result<(), NotifyError>>>,
    event_rx: mpsc::Receiver<FileEvent>,
    watch_path: Utf8PathBuf,
}

impl std::fmt::Debug for FsWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsWatcher")
            .field("watch_path", &self.watch_path)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FsWatcher {
    /// Starts watching `path`.
    ///
    /// The path is canonicalized so event paths line up with the tree's
    /// canonical node paths.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::PathNotFound`] if the path doesn't exist and
    /// [`NotifyError::Io`] if it cannot be canonicalized.
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn new<F: PathFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
    ) -> Result<Self, NotifyError> {
        Self::with_capacity(path, config, filter, DEFAULT_CHANNEL_CAPACITY).await
    }

    /// Starts watching `path` with a custom event channel capacity.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    #[allow(clippy::unused_async)]
    pub async fn with_capacity<F: PathFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
        channel_capacity: usize,
    ) -> Result<Self, NotifyError> {
        if !path.exists() {
            return Err(NotifyError::path_not_found(path));
        }
        let watch_path = path.canonicalize_utf8()?;

        let (event_tx, event_rx) = mpsc::channel(channel_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task_path = watch_path.clone();
        let config = *config;
        let task_handle = tokio::task::spawn_blocking(move || {
            run_watcher_loop(task_path, config, event_tx, shutdown_rx, filter)
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            event_rx,
            watch_path,
        })
    }

    /// Receives the next event, or `None` once the watcher has stopped.
    pub async fn recv(&mut self) -> Option<FileEvent> {
        self.event_rx.recv().await
    }

    /// Receives an event without waiting.
    ///
    /// # Errors
    ///
    /// Returns `TryRecvError::Empty` if nothing is queued and
    /// `TryRecvError::Disconnected` once the watcher has stopped.
    pub fn try_recv(&mut self) -> Result<FileEvent, mpsc::error::TryRecvError> {
        self.event_rx.try_recv()
    }

    /// The event receiver, for use with `tokio::select!`.
    pub fn events(&mut self) -> &mut mpsc::Receiver<FileEvent> {
        &mut self.event_rx
    }

    /// The canonical watched path.
    #[must_use]
    pub fn watch_path(&self) -> &Utf8Path {
        &self.watch_path
    }

    /// Returns `true` while the blocking thread is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the watcher and waits for its thread.
    ///
    /// # Errors
    ///
    /// Returns the error the watcher thread stopped with, or
    /// [`NotifyError::ChannelClosed`] if it panicked.
    pub async fn shutdown(mut self) -> Result<(), NotifyError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => result?,
                Err(_join_error) => return Err(NotifyError::ChannelClosed),
            }
        }

        Ok(())
    }
}

impl Drop for FsWatcher {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[allow(clippy::needless_pass_by_value)] // Owned for the blocking task lifetime
fn run_watcher_loop<F: PathFilter>(
    path: Utf8PathBuf,
    config: WatchConfig,
    event_tx: mpsc::Sender<FileEvent>,
    shutdown_rx: oneshot::Receiver<()>,
    filter: F,
) -> Result<(), NotifyError> {
    let timeout = Duration::from_millis(config.debounce_ms);

    let mut debouncer: Debouncer<notify::RecommendedWatcher> =
        new_debouncer(timeout, move |res: DebounceEventResult| match res {
            Ok(events) => {
                for event in events {
                    let path = match Utf8PathBuf::try_from(event.path) {
                        Ok(path) => path,
                        Err(err) => {
                            let err = NotifyError::NonUtf8Path(err.into_path_buf());
                            warn!(error = %err, "Skipping file event");
                            continue;
                        }
                    };

                    if !filter.should_process(&path) {
                        trace!(path = %path, "Filtered out file event");
                        continue;
                    }

                    if event_tx.blocking_send(FileEvent::new(path)).is_err() {
                        debug!("Event channel closed, dropping file events");
                        break;
                    }
                }
            }
            Err(error) => warn!(error = %error, "Debouncer error"),
        })?;

    let mode = if config.recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    debouncer.watcher().watch(path.as_std_path(), mode)?;

    info!(path = %path, recursive = config.recursive, "File watcher started");

    let _ = shutdown_rx.blocking_recv();

    info!(path = %path, "File watcher stopped");
    Ok(())
}
