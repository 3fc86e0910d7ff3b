//! Entry names, styled by kind.

use canopy_core::Node;

use crate::column::Column;
use crate::indexes::IndexScope;
use crate::row::Row;

/// Draws the entry name; directories get a trailing `/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameColumn;

impl Column for FilenameColumn {
    fn name(&self) -> &'static str {
        "filename"
    }

    fn draw(&self, row: &mut Row, node: &Node, _index: usize, _indexes: &IndexScope<'_>) {
        if node.is_root() {
            row.add_highlighted(format!("[{}]", node.name), "FileRoot");
        } else if node.directory {
            row.add_highlighted(format!("{}/", node.name), "FileDirectory");
        } else if node.symbolic_link {
            row.add_highlighted(node.name.clone(), "FileSymbolicLink");
        } else if node.hidden {
            row.add_highlighted(node.name.clone(), "FileHidden");
        } else {
            row.add(node.name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::fixtures::{draw, entry};
    use crate::indexes::ColumnIndexes;
    use camino::Utf8Path;
    use canopy_core::Permissions;

    #[test]
    fn test_filename_variants() {
        let indexes = ColumnIndexes::new();
        let root = Node::root(Utf8Path::new("/srv/app"), Permissions::default());

        assert_eq!(draw(&FilenameColumn, &root, 0, &indexes), "[app]");
        assert_eq!(draw(&FilenameColumn, &entry("/srv/app/src", true), 1, &indexes), "src/");
        assert_eq!(draw(&FilenameColumn, &entry("/srv/app/.env", false), 2, &indexes), ".env");
        assert_eq!(draw(&FilenameColumn, &entry("/srv/app/main.rs", false), 3, &indexes), "main.rs");
    }

    #[test]
    fn test_filename_highlights() {
        let mut row = Row::new();
        let indexes = ColumnIndexes::new();
        let scope = indexes.scope("filename");
        FilenameColumn.draw(&mut row, &entry("/r/src", true), 1, &scope);
        FilenameColumn.draw(&mut row, &entry("/r/.env", false), 2, &scope);
        FilenameColumn.draw(&mut row, &entry("/r/a.rs", false), 3, &scope);

        let highlights: Vec<_> = row.segments().iter().map(|s| s.highlight).collect();
        assert_eq!(highlights, [Some("FileDirectory"), Some("FileHidden"), None]);
    }
}
