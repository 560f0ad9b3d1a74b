use crate::balance::balance;
use crate::error::{Result, SpanGridError};
use crate::types::{Cell, CellKey, Row, RowId, Table};

use super::{overlap, require_tiled, resolve_targets, row_extent, TableState};

/// Insert an empty row so that it ends up at index `before`.
///
/// Cells that start above `before` and reach past it grow by one row instead
/// of receiving a new neighbour; every other column gets a fresh 1x1 cell.
/// `before == row_count` appends.
pub fn insert_row(table: &mut Table, before: usize) -> Result<RowId> {
    let grid = table.occupancy();
    require_tiled(&grid)?;
    if before > grid.rows() {
        return Err(SpanGridError::InvalidArgument(format!(
            "row index {before} out of range (table has {} rows)",
            grid.rows()
        )));
    }

    let mut grown: Vec<CellKey> = Vec::new();
    let mut fresh_cols = Vec::new();
    let mut col = 0;
    while col < grid.cols() {
        if let Some(owner) = grid.owner(before, col).filter(|owner| owner.row < before) {
            grown.push(owner.key.clone());
            col = owner.col_end().max(col + 1);
            continue;
        }
        fresh_cols.push(col);
        col += 1;
    }

    for key in &grown {
        if let Some(cell) = table.cell_mut(key) {
            cell.row_span += 1;
        }
    }

    let id = table.fresh_row_id();
    let cells = fresh_cols
        .iter()
        .filter_map(|&col| table.col_id_at(col).cloned())
        .map(Cell::new)
        .collect();
    table.insert_row(before, Row { id: id.clone(), cells });

    log::debug!(
        "inserted row {id} at {before}: {} fresh cells, {} spans grown",
        fresh_cols.len(),
        grown.len()
    );
    Ok(id)
}

/// Insert a row directly above the row `cell` starts in.
pub fn insert_row_above(table: &mut Table, cell: &CellKey) -> Result<RowId> {
    let row = table
        .row_index(&cell.row)
        .filter(|_| table.contains(cell))
        .ok_or_else(|| SpanGridError::UnknownCell(cell.clone()))?;
    insert_row(table, row)
}

/// Insert a row directly below the last row `cell` covers.
pub fn insert_row_below(table: &mut Table, cell: &CellKey) -> Result<RowId> {
    let row = table
        .row_index(&cell.row)
        .ok_or_else(|| SpanGridError::UnknownCell(cell.clone()))?;
    let span = table
        .cell(cell)
        .map(|c| c.row_span)
        .ok_or_else(|| SpanGridError::UnknownCell(cell.clone()))?;
    insert_row(table, row + span)
}

/// Remove the contiguous block of rows covered by `targets`.
///
/// Cells from above that reach into the block shrink. Cells that start inside
/// the block but hang out below it are carried over, with their content, as
/// patch cells in the first row after the block. Afterwards the balancer drops
/// columns that no longer own any cell.
pub fn remove_rows(table: &mut Table, targets: &[CellKey]) -> Result<TableState> {
    let grid = table.occupancy();
    require_tiled(&grid)?;
    let targets = resolve_targets(&grid, targets)?;
    let block = row_extent(&targets);
    let (start, end) = block;

    let mut shrink = Vec::new();
    let mut patches = Vec::new();
    for placed in grid.placed() {
        if placed.row < start && placed.row_end() > start {
            shrink.push((
                placed.key.clone(),
                overlap((placed.row, placed.row_end()), block),
            ));
        } else if (start..end).contains(&placed.row) && placed.row_end() > end {
            patches.push((placed.key.clone(), placed.row_end() - end));
        }
    }

    for (key, rows) in &shrink {
        if let Some(cell) = table.cell_mut(key) {
            cell.row_span = cell.row_span.saturating_sub(*rows).max(1);
        }
    }

    let mut carried: Vec<Cell> = Vec::with_capacity(patches.len());
    for (key, remaining) in patches {
        if let Some(mut cell) = table.remove_cell(&key) {
            cell.row_span = remaining;
            carried.push(cell);
        }
    }

    for _ in start..end {
        table.remove_row(start);
    }
    for cell in carried {
        table.insert_cell(start, cell);
    }

    log::debug!(
        "removed rows {start}..{end} of table {}: {} spans shrunk",
        table.id,
        shrink.len()
    );

    balance(table);
    Ok(TableState::of(table))
}
