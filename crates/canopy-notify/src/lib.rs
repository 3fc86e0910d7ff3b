//! Change notification for the canopy tree engine.
//!
//! When the host writes a buffer, only the rows whose VCS status changed
//! should be redrawn. This crate turns a stream of
//! [`HostEvent::BufferWritten`] events into those paths:
//!
//! 1. [`Debouncer`] collapses bursts into one pass acting on the last event.
//! 2. [`StatusChangeNotifier::process_write`] resolves the buffer through a
//!    [`BufferLookup`], reloads the status of its directory and diffs it
//!    against the previous snapshot with [`diff_statuses`].
//! 3. The changed set goes to a render callback and the new snapshot becomes
//!    the baseline.
//!
//! Hosts without an editor can feed the same pipeline from disk with
//! [`FsWatcher`] and a [`BufferTable`].

#![deny(clippy::all)]
#![warn(missing_docs)]

mod buffers;
mod debounce;
mod diff;
mod error;
mod events;
mod filter;
mod notifier;
mod watcher;

pub use buffers::{BufferLookup, BufferTable};
pub use debounce::{Debouncer, broadcast_stream};
pub use diff::{IGNORE_FILE_NAME, diff_statuses};
pub use error::NotifyError;
pub use events::{FileEvent, HostEvent};
pub use filter::{PathFilter, SkipDirsFilter};
pub use notifier::StatusChangeNotifier;
pub use watcher::FsWatcher;
