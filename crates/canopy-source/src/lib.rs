//! Column registry and source orchestration.
//!
//! A [`Source`] ties one [`NodeTree`](canopy_tree::NodeTree) to an ordered
//! list of [`Column`]s and a [`RenderSink`]. Every tree operation ends in a
//! render; write events flow through the git column's notifier and come back
//! as partial renders of just the changed rows.
//!
//! # Architecture
//!
//! ```text
//! host ── publish(HostEvent) ──► broadcast ──► GitColumn task
//!                                                  │ debounce, reload, diff
//!                                                  ▼
//!                                            RenderHandle
//!                                                  │
//! Source ◄──── render loop (render_paths) ◄────────┘
//!   │
//!   ├── NodeTree (arena)
//!   ├── columns: indent │ git │ filename │ readonly │ custom…
//!   ├── ColumnIndexes (marked rows per column)
//!   └── RenderSink ──► host paint pipeline
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod column;
mod columns;
mod error;
mod indexes;
mod registry;
mod row;
mod sink;
mod source;

pub use column::{Column, ColumnContext, ColumnDeps, RenderHandle};
pub use columns::{
    FilenameColumn, GitColumn, IndentColumn, ReadonlyColumn, STAGE_HIGHLIGHT, UNSTAGE_HIGHLIGHT,
};
pub use error::SourceError;
pub use indexes::{ColumnIndexes, IndexScope};
pub use registry::{ColumnFactory, ColumnRegistry};
pub use row::{RenderedRow, Row, Segment};
pub use sink::{ChannelSink, RecordingSink, RenderSink};
pub use source::Source;
