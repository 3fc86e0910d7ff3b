//! Rendered row content.

use camino::Utf8PathBuf;
use canopy_core::NodeId;
use serde::Serialize;
use smallvec::SmallVec;

/// A run of text with an optional highlight group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Text to draw.
    pub text: String,

    /// Highlight group name, e.g. `FileGitStage`.
    pub highlight: Option<&'static str>,
}

/// The contributions of every column to one tree row.
///
/// # Examples
///
/// ```
/// use canopy_source::Row;
///
/// let mut row = Row::new();
/// row.add("  ");
/// row.add_highlighted("src/", "FileDirectory");
/// assert_eq!(row.text(), "  src/");
/// assert_eq!(row.segments().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    segments: SmallVec<[Segment; 6]>,
}

impl Row {
    /// Creates an empty row.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends unhighlighted text.
    pub fn add(&mut self, text: impl Into<String>) {
        self.segments.push(Segment {
            text: text.into(),
            highlight: None,
        });
    }

    /// Appends text drawn with `highlight`.
    pub fn add_highlighted(&mut self, text: impl Into<String>, highlight: &'static str) {
        self.segments.push(Segment {
            text: text.into(),
            highlight: Some(highlight),
        });
    }

    /// Segments in draw order.
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The row as plain text.
    #[must_use]
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Returns `true` if no column contributed anything.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for segment in &self.segments {
            f.write_str(&segment.text)?;
        }
        Ok(())
    }
}

/// A drawn row together with its position in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRow {
    /// Row index in display order.
    pub index: usize,

    /// Node the row shows.
    pub uid: NodeId,

    /// Absolute path of the node.
    pub path: Utf8PathBuf,

    /// Column contributions.
    pub row: Row,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_text() {
        let mut row = Row::new();
        assert!(row.is_empty());
        row.add_highlighted("M", "FileGitStage");
        row.add(" lib.rs");
        assert_eq!(row.to_string(), row.text());
        assert_eq!(row.segments()[0].highlight, Some("FileGitStage"));
        assert_eq!(row.segments()[1].highlight, None);
    }
}
