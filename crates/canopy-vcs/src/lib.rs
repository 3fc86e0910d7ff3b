//! Version-control status tracking.
//!
//! [`GitTracker`] keeps one immutable [`StatusSnapshot`] per repository,
//! refreshed on demand by running `git status --porcelain -z`. Snapshots map
//! absolute paths to a two-slot [`StatusPair`](canopy_core::StatusPair) and
//! include synthesized entries for directories whose descendants carry a
//! status.
//!
//! Paths outside any repository are a no-op, not an error. A missing git
//! executable is detected once through [`GitTracker::probe_available`].

#![deny(clippy::all)]
#![warn(missing_docs)]

mod command;
mod error;
mod porcelain;
mod snapshot;
mod tracker;

pub use error::VcsError;
pub use porcelain::parse_porcelain;
pub use snapshot::StatusSnapshot;
pub use tracker::GitTracker;
