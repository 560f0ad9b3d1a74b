//! Tunable parameters for table editing.
//!
//! Every field has a default so a host can supply a partial JSON object.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default column width in pixels for fixed-width tables
pub const DEFAULT_COL_WIDTH: f32 = 100.0;

/// Default row height in pixels when no cell sets one
pub const DEFAULT_ROW_HEIGHT: f32 = 24.0;

/// Editing configuration shared by the structural operations, the repair
/// scheduler and the selection resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Largest row count `create_table` accepts
    pub max_rows: usize,
    /// Largest column count `create_table` accepts
    pub max_cols: usize,
    /// Quiet period before a structural change triggers a repair pass
    pub debounce_ms: f64,
    /// Pixels shaved off each side of a cell before intersection tests
    pub selection_tolerance: f32,
    /// Width given to new columns in fixed-width tables
    pub default_col_width: f32,
    /// Height used by `GridLayout` for rows without an explicit height
    pub default_row_height: f32,
    /// Maximum number of undo snapshots kept by the editor
    pub history_limit: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_rows: 30,
            max_cols: 30,
            debounce_ms: 100.0,
            selection_tolerance: 5.0,
            default_col_width: DEFAULT_COL_WIDTH,
            default_row_height: DEFAULT_ROW_HEIGHT,
            history_limit: 100,
        }
    }
}

impl GridConfig {
    /// Parse a (possibly partial) JSON configuration object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
