use crate::balance::balance;
use crate::config::GridConfig;
use crate::error::{Result, SpanGridError};
use crate::types::{Cell, CellKey, ColId, Column, Table};

use super::{col_extent, overlap, require_tiled, resolve_targets, SkipCounts, TableState};

/// Insert an empty column so that it ends up at index `before`.
///
/// Rows whose cell straddles the insertion boundary widen that cell; every
/// other row gets a fresh 1x1 cell. A widened cell that also spans rows
/// covers the new column in those rows, so they are skipped.
pub fn insert_column(table: &mut Table, before: usize, config: &GridConfig) -> Result<ColId> {
    let grid = table.occupancy();
    require_tiled(&grid)?;
    if before > grid.cols() {
        return Err(SpanGridError::InvalidArgument(format!(
            "column index {before} out of range (table has {} columns)",
            grid.cols()
        )));
    }

    let id = table.fresh_col_id();
    let mut skips = SkipCounts::new();
    let mut widened: Vec<CellKey> = Vec::new();
    let mut fresh_rows = Vec::new();

    for row in 0..grid.rows() {
        if let Some(remaining) = skips.get_mut(&id).filter(|remaining| **remaining > 0) {
            *remaining -= 1;
            continue;
        }
        let straddling = before
            .checked_sub(1)
            .and_then(|left| grid.owner(row, left))
            .filter(|owner| owner.col_end() > before);
        match straddling {
            Some(owner) if owner.row == row => {
                widened.push(owner.key.clone());
                skips.insert(id.clone(), owner.row_span - 1);
            }
            // Widened when its own row was visited.
            Some(_) => {}
            None => fresh_rows.push(row),
        }
    }

    let width = if table.full {
        let neighbour = if before < table.col_count() {
            before
        } else {
            before.saturating_sub(1)
        };
        match table.columns.get_mut(neighbour) {
            Some(column) => {
                let carved = column.width / 2.0;
                column.width -= carved;
                carved
            }
            None => 100.0,
        }
    } else {
        config.default_col_width
    };

    table.insert_column(before, Column::new(id.clone(), width));
    for key in &widened {
        if let Some(cell) = table.cell_mut(key) {
            cell.col_span += 1;
        }
    }
    for &row in &fresh_rows {
        table.insert_cell(row, Cell::new(id.clone()));
    }

    log::debug!(
        "inserted column {id} at {before}: {} fresh cells, {} cells widened",
        fresh_rows.len(),
        widened.len()
    );
    Ok(id)
}

/// Insert a column directly left of the column `cell` starts at.
pub fn insert_column_left(table: &mut Table, cell: &CellKey, config: &GridConfig) -> Result<ColId> {
    let col = table
        .cell_col_index(cell)
        .ok_or_else(|| SpanGridError::UnknownCell(cell.clone()))?;
    insert_column(table, col, config)
}

/// Insert a column directly right of the last column `cell` covers.
pub fn insert_column_right(table: &mut Table, cell: &CellKey, config: &GridConfig) -> Result<ColId> {
    let col = table
        .cell_col_index(cell)
        .ok_or_else(|| SpanGridError::UnknownCell(cell.clone()))?;
    let span = table.cell(cell).map_or(1, |c| c.col_span);
    insert_column(table, col + span, config)
}

/// Remove the contiguous block of columns covered by `targets`.
///
/// Cells reaching into the block from the left narrow. Cells starting inside
/// the block but reaching past it move onto the first column after the block.
/// Cells inside the block are deleted. The block's width goes to the next
/// column, or the previous one when the block was at the right edge.
pub fn remove_columns(table: &mut Table, targets: &[CellKey]) -> Result<TableState> {
    let grid = table.occupancy();
    require_tiled(&grid)?;
    let targets = resolve_targets(&grid, targets)?;
    let block = col_extent(&targets);
    let (start, end) = block;

    let successor = table.col_id_at(end).cloned();

    let mut narrowed = 0;
    let mut moved = 0;
    let mut deleted = Vec::new();
    for placed in grid.placed() {
        let span = (placed.col, placed.col_end());
        let cut = overlap(span, block);
        if cut == 0 {
            continue;
        }
        if placed.col < start {
            if let Some(cell) = table.cell_mut(&placed.key) {
                cell.col_span = cell.col_span.saturating_sub(cut).max(1);
                narrowed += 1;
            }
        } else if let Some(next) = successor.as_ref().filter(|_| placed.col_end() > end) {
            if let Some(cell) = table.cell_mut(&placed.key) {
                cell.col = next.clone();
                cell.col_span = placed.col_end() - end;
                moved += 1;
            }
        } else {
            deleted.push(placed.key.clone());
        }
    }
    for key in &deleted {
        table.remove_cell(key);
    }

    let donated: f32 = table
        .columns
        .get(start..end)
        .map(|cols| cols.iter().map(|col| col.width).sum())
        .unwrap_or(0.0);
    let recipient = if end < table.col_count() {
        Some(end)
    } else {
        start.checked_sub(1)
    };
    if let Some(column) = recipient.and_then(|index| table.columns.get_mut(index)) {
        column.width += donated;
    }
    for _ in start..end {
        table.remove_column(start);
    }

    log::debug!(
        "removed columns {start}..{end} of table {}: {narrowed} narrowed, {moved} moved, {} deleted",
        table.id,
        deleted.len()
    );

    balance(table);
    Ok(TableState::of(table))
}
