//! Depth indentation.

use camino::{Utf8Path, Utf8PathBuf};
use canopy_core::Node;

use crate::column::Column;
use crate::indexes::IndexScope;
use crate::row::Row;

const INDENT: &str = "  ";

/// Indents each row by its depth below the root.
#[derive(Debug, Clone)]
pub struct IndentColumn {
    root: Utf8PathBuf,
}

impl IndentColumn {
    /// Creates the column for a tree rooted at `root`.
    #[must_use]
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
        }
    }

    fn depth(&self, node: &Node) -> usize {
        node.path
            .strip_prefix(&self.root)
            .map_or(0, |relative| relative.components().count())
    }
}

impl Column for IndentColumn {
    fn name(&self) -> &'static str {
        "indent"
    }

    fn draw(&self, row: &mut Row, node: &Node, _index: usize, _indexes: &IndexScope<'_>) {
        if node.is_root() {
            return;
        }
        let depth = self.depth(node).saturating_sub(1);
        if depth > 0 {
            row.add(INDENT.repeat(depth));
        }
    }
}
