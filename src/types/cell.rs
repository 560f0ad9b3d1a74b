use serde::{Deserialize, Serialize};

use super::ColId;

/// One unit of cell content (a line/paragraph of the enclosing document).
///
/// The text model is owned by the document; the table only moves lines
/// between cells and never looks inside `attributes`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentLine {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
}

impl ContentLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: None,
        }
    }

    /// The minimal content unit a fresh cell starts with
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty() && self.attributes.is_none()
    }
}

/// Presentational attributes carried through edits but never interpreted
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Explicit row height in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
}

/// A physically present cell.
///
/// The cell's row is the row that lists it; `col` is the column its
/// rectangle starts at. Together they form the cell's `CellKey`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub col: ColId,
    pub row_span: usize,
    pub col_span: usize,
    pub style: CellStyle,
    pub content: Vec<ContentLine>,
}

impl Cell {
    /// A fresh 1x1 cell holding one empty line.
    pub fn new(col: ColId) -> Self {
        Self {
            col,
            row_span: 1,
            col_span: 1,
            style: CellStyle::default(),
            content: vec![ContentLine::empty()],
        }
    }

    pub fn with_text(col: ColId, text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentLine::new(text)],
            ..Self::new(col)
        }
    }

    pub fn with_spans(mut self, row_span: usize, col_span: usize) -> Self {
        self.row_span = row_span;
        self.col_span = col_span;
        self
    }

    /// False once an edit removed every content line
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn is_spanned(&self) -> bool {
        self.row_span > 1 || self.col_span > 1
    }

    /// Concatenated text of all lines, newline separated.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
