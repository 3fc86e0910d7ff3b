//! Built-in columns.

mod filename;
mod git;
mod indent;
mod readonly;

pub use filename::FilenameColumn;
pub use git::{GitColumn, STAGE_HIGHLIGHT, UNSTAGE_HIGHLIGHT};
pub use indent::IndentColumn;
pub use readonly::ReadonlyColumn;
