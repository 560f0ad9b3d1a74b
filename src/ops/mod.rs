//! Structural operations.
//!
//! Every operation validates its arguments before touching the table and
//! leaves the tiling invariant intact when it returns `Ok`. Operations that
//! can delete the last row or column report whether the table survived.

mod columns;
mod create;
mod merge;
mod rows;

use std::collections::{BTreeSet, HashMap};

pub use columns::{insert_column, insert_column_left, insert_column_right, remove_columns};
pub use create::create_table;
pub use merge::{merge_cells, split_cell};
pub use rows::{insert_row, insert_row_above, insert_row_below, remove_rows};

use crate::error::{Result, SpanGridError};
use crate::types::{CellKey, ColId, OccupancyGrid, PlacedCell, Table};

/// Whether a table still exists after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Live,
    /// The last row or column was removed; the caller should drop the table
    Removed,
}

impl TableState {
    pub(crate) fn of(table: &Table) -> Self {
        if table.is_empty() {
            Self::Removed
        } else {
            Self::Live
        }
    }
}

/// Remaining number of rows each column must still be skipped for, carried
/// from one row to the next while walking the table top-down.
pub(crate) type SkipCounts = HashMap<ColId, usize>;

/// Resolve a target set against a snapshot: non-empty, every key known,
/// duplicates collapsed, returned in document order.
pub(crate) fn resolve_targets(grid: &OccupancyGrid, targets: &[CellKey]) -> Result<Vec<PlacedCell>> {
    if targets.is_empty() {
        return Err(SpanGridError::InvalidArgument(
            "no target cells given".into(),
        ));
    }
    let wanted: BTreeSet<&CellKey> = targets.iter().collect();
    for key in &wanted {
        if grid.find(key).is_none() {
            return Err(SpanGridError::UnknownCell((*key).clone()));
        }
    }
    Ok(grid
        .placed()
        .iter()
        .filter(|placed| wanted.contains(&placed.key))
        .cloned()
        .collect())
}

/// Inclusive-exclusive row range covered by a set of placed cells.
pub(crate) fn row_extent(cells: &[PlacedCell]) -> (usize, usize) {
    let start = cells.iter().map(|c| c.row).min().unwrap_or(0);
    let end = cells.iter().map(PlacedCell::row_end).max().unwrap_or(start);
    (start, end)
}

/// Inclusive-exclusive column range covered by a set of placed cells.
pub(crate) fn col_extent(cells: &[PlacedCell]) -> (usize, usize) {
    let start = cells.iter().map(|c| c.col).min().unwrap_or(0);
    let end = cells.iter().map(PlacedCell::col_end).max().unwrap_or(start);
    (start, end)
}

/// Length of the overlap between `[a0, a1)` and `[b0, b1)`.
pub(crate) fn overlap(a: (usize, usize), b: (usize, usize)) -> usize {
    a.1.min(b.1).saturating_sub(a.0.max(b.0))
}

/// Refuse to operate on a table that is currently out of shape.
pub(crate) fn require_tiled(grid: &OccupancyGrid) -> Result<()> {
    grid.check().map_err(|violation| {
        SpanGridError::InvalidArgument(format!(
            "table must be balanced before a structural edit: {violation}"
        ))
    })
}
