//! Structured error types for spangrid.
//!
//! Only malformed operation input surfaces as an error. Structural drift is
//! repaired by the balancer and missing geometry is skipped by the selection
//! resolver, so neither has a variant here.

use crate::types::CellKey;

/// All errors that can occur while editing or decoding a table.
#[derive(Debug, thiserror::Error)]
pub enum SpanGridError {
    /// Operation input rejected before any mutation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The merge set does not tile a rectangle.
    #[error("Cells do not form a rectangle: {0}")]
    NonRectangular(String),

    /// Requested dimensions exceed the configured bounds.
    #[error("Table of {rows}x{cols} exceeds the {max_rows}x{max_cols} limit")]
    TableTooLarge {
        rows: usize,
        cols: usize,
        max_rows: usize,
        max_cols: usize,
    },

    /// A cell key that does not exist in the table.
    #[error("Unknown cell: {0}")]
    UnknownCell(CellKey),

    /// The editor holds no table (never loaded, or removed by an edit).
    #[error("No table loaded")]
    NoTable,

    /// Malformed operation record stream.
    #[error("Record stream: {0}")]
    Records(String),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpanGridError>;

impl From<SpanGridError> for wasm_bindgen::JsValue {
    fn from(e: SpanGridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
