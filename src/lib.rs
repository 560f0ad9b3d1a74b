//! spangrid - spanned table model for rich-text editors
//!
//! Keeps a table whose cells span rows and columns consistent while the
//! surrounding document is edited by operations that know nothing about
//! tables:
//! - Structural edits (insert/remove rows and columns, merge, split)
//! - A balancer that repairs the grid after arbitrary edits
//! - Rectangle selection over rendered cell geometry
//! - Flat operation records for storage inside the host document
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { JsTableEditor } from 'spangrid';
//! await init();
//! const editor = new JsTableEditor({ debounceMs: 100 });
//! editor.create(3, 3, true);
//! editor.set_change_callback(() => render(editor.records()));
//! ```
//!
//! # Usage (Rust)
//!
//! ```
//! use spangrid::{GridConfig, TableEditor};
//!
//! let mut editor = TableEditor::new(GridConfig::default());
//! editor.create(2, 2, false).unwrap();
//! let first = editor.table().unwrap().cell_at_slot(0, 0).unwrap();
//! editor.insert_column_right(&first).unwrap();
//! assert_eq!(editor.table().unwrap().col_count(), 3);
//! ```

// Model and algorithms
pub mod balance;
pub mod codec;
pub mod config;
pub mod debounce;
pub mod error;
pub mod ops;
pub mod selection;
pub mod types;

// Session and geometry
pub mod editor;
pub mod layout;

// JavaScript bindings
pub mod wasm;

use wasm_bindgen::prelude::*;

pub use balance::{balance, BalanceReport};
pub use config::GridConfig;
pub use editor::{MutationEvent, TableEditor};
pub use error::{Result, SpanGridError};
pub use layout::GridLayout;
pub use ops::TableState;
pub use selection::{resolve_selection, GeometryProvider, MeasuredGeometry, Point, Rect};
pub use types::*;
pub use wasm::JsTableEditor;

/// Balance a JSON record stream and return the normalized stream.
///
/// # Errors
/// Returns an error if the records are not valid JSON or mix tables.
#[wasm_bindgen]
pub fn normalize_records_json(json: &str) -> std::result::Result<String, JsValue> {
    let mut table = codec::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    balance(&mut table);
    codec::to_json(&table).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
