//! Marks entries the user cannot write.

use canopy_core::Node;

use crate::column::Column;
use crate::indexes::IndexScope;
use crate::row::Row;

/// Marks entries that can be read but not written.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadonlyColumn;

impl Column for ReadonlyColumn {
    fn name(&self) -> &'static str {
        "readonly"
    }

    fn draw(&self, row: &mut Row, node: &Node, index: usize, indexes: &IndexScope<'_>) {
        if node.readonly() && !node.is_root() {
            row.add_highlighted(" RO", "FileReadonly");
            indexes.add(index);
        } else {
            indexes.remove(index);
        }
    }
}
