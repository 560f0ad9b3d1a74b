//! Common test utilities and assertion helpers.
//!
//! This module provides helpers for inspecting tables in tests: slot lookup,
//! tiling assertions and a text dump of the grid.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

// Re-export fixtures for convenience
pub use super::fixtures::*;

use spangrid::{CellKey, ColId, Table};

/// Key of the cell covering `(row, col)`; panics if the slot is empty.
pub fn slot(table: &Table, row: usize, col: usize) -> CellKey {
    table
        .cell_at_slot(row, col)
        .unwrap_or_else(|| panic!("no cell covers ({row}, {col})"))
}

/// Keys covering a list of slots.
pub fn slots(table: &Table, coords: &[(usize, usize)]) -> Vec<CellKey> {
    coords.iter().map(|&(r, c)| slot(table, r, c)).collect()
}

/// Assert the table tiles its grid exactly.
pub fn assert_tiled(table: &Table) {
    if let Err(violation) = table.check_tiling() {
        panic!(
            "table is not tiled: {violation}\n{}",
            grid_dump(table).join("\n")
        );
    }
}

/// One string per row; each slot shows the first letter of the covering
/// cell's text, `_` for a cell without text and `.` for an uncovered slot.
pub fn grid_dump(table: &Table) -> Vec<String> {
    let grid = table.occupancy();
    (0..grid.rows())
        .map(|row| {
            (0..grid.cols())
                .map(|col| match grid.owner(row, col) {
                    Some(owner) => table
                        .cell(&owner.key)
                        .and_then(|cell| cell.text().chars().next())
                        .unwrap_or('_'),
                    None => '.',
                })
                .map(String::from)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// `(row_span, col_span)` of a cell.
pub fn spans(table: &Table, key: &CellKey) -> (usize, usize) {
    let cell = table.cell(key).unwrap();
    (cell.row_span, cell.col_span)
}

/// Column ids in order, as strings.
pub fn column_names(table: &Table) -> Vec<String> {
    table.column_ids().map(ColId::to_string).collect()
}

/// Sum of column widths.
pub fn total_width(table: &Table) -> f32 {
    table.columns.iter().map(|col| col.width).sum()
}
