//! Non-throwing filesystem prober.
//!
//! Given a directory, [`Prober`] lists its entries and resolves, for each one,
//! existence, directory-ness, symlink-ness and three independent access
//! checks. Individual checks never fail a listing: a failed access probe
//! downgrades that one bit to `false`, and an entry that vanishes mid-listing
//! is dropped while its siblings are kept.
//!
//! # Architecture
//!
//! ```text
//! Prober
//!     │
//!     ├── Filesystem (trait, async)
//!     │       │
//!     │       └── LocalFs (tokio::fs + access(2))
//!     │
//!     └── join_all (per-entry probes, listing order preserved)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod fs;
mod prober;

pub use error::ProbeError;
pub use fs::{AccessMode, Filesystem, LocalFs};
pub use prober::{EntryProbe, Prober, is_drive_root};
