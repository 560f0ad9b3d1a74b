use std::collections::BTreeMap;

use crate::balance::balance;
use crate::error::{Result, SpanGridError};
use crate::types::{Cell, CellKey, ContentLine, Table};

use super::{col_extent, require_tiled, resolve_targets, row_extent};

/// Merge a rectangular set of cells into its top-left cell.
///
/// The merged extents are the widest row (sum of colspans per origin row) and
/// the tallest column (sum of rowspans per origin column). Content of the
/// other cells is appended to the origin in document order, minus blank
/// lines. A balancer pass follows, which drops rows and columns that no
/// longer own a cell; the origin's spans shrink accordingly.
pub fn merge_cells(table: &mut Table, targets: &[CellKey]) -> Result<CellKey> {
    let grid = table.occupancy();
    require_tiled(&grid)?;
    let cells = resolve_targets(&grid, targets)?;
    if cells.len() < 2 {
        return Err(SpanGridError::InvalidArgument(
            "merging needs at least two cells".into(),
        ));
    }

    let mut width_by_row: BTreeMap<usize, usize> = BTreeMap::new();
    let mut height_by_col: BTreeMap<usize, usize> = BTreeMap::new();
    for placed in &cells {
        *width_by_row.entry(placed.row).or_default() += placed.col_span;
        *height_by_col.entry(placed.col).or_default() += placed.row_span;
    }
    let col_span = width_by_row.values().copied().max().unwrap_or(1);
    let row_span = height_by_col.values().copied().max().unwrap_or(1);

    let (row_start, row_end) = row_extent(&cells);
    let (col_start, col_end) = col_extent(&cells);
    let area: usize = cells.iter().map(|placed| placed.area()).sum();
    if row_end - row_start != row_span
        || col_end - col_start != col_span
        || area != row_span * col_span
    {
        return Err(SpanGridError::NonRectangular(format!(
            "{} cells covering {area} slots inside a {}x{} bounding box",
            cells.len(),
            row_end - row_start,
            col_end - col_start
        )));
    }

    let mut placed = cells.into_iter();
    let Some(origin) = placed.next().map(|first| first.key) else {
        return Err(SpanGridError::InvalidArgument("empty merge set".into()));
    };

    let mut gathered: Vec<ContentLine> = Vec::new();
    for other in placed {
        if let Some(cell) = table.remove_cell(&other.key) {
            gathered.extend(cell.content.into_iter().filter(|line| !line.is_blank()));
        }
    }

    if let Some(cell) = table.cell_mut(&origin) {
        if !gathered.is_empty() && cell.content.iter().all(ContentLine::is_blank) {
            cell.content.clear();
        }
        cell.content.extend(gathered);
        if cell.content.is_empty() {
            cell.content.push(ContentLine::empty());
        }
        cell.row_span = row_span;
        cell.col_span = col_span;
    }

    log::debug!("merged into {origin} as {row_span}x{col_span}");
    balance(table);
    Ok(origin)
}

/// Split a spanned cell back into 1x1 cells.
///
/// Fresh cells reuse the row and column identities the span covered. Within
/// each row they are inserted right-to-left at a fixed position so they end
/// up in column order. Returns the new cells in document order; a 1x1 cell
/// is left alone and yields nothing.
pub fn split_cell(table: &mut Table, target: &CellKey) -> Result<Vec<CellKey>> {
    let grid = table.occupancy();
    require_tiled(&grid)?;
    let origin = grid
        .find(target)
        .cloned()
        .ok_or_else(|| SpanGridError::UnknownCell(target.clone()))?;
    if origin.row_span == 1 && origin.col_span == 1 {
        return Ok(Vec::new());
    }

    let mut created = Vec::new();
    for row in origin.row..origin.row_end() {
        let position = table.cell_insert_position(row, origin.col_end());
        let Some(row_id) = table.rows.get(row).map(|r| r.id.clone()) else {
            continue;
        };
        for col in (origin.col..origin.col_end()).rev() {
            if row == origin.row && col == origin.col {
                continue;
            }
            let Some(col_id) = table.col_id_at(col).cloned() else {
                continue;
            };
            if let Some(cells) = table.rows.get_mut(row).map(|r| &mut r.cells) {
                let at = position.min(cells.len());
                cells.insert(at, Cell::new(col_id.clone()));
                created.push(CellKey::new(row_id.clone(), col_id));
            }
        }
    }
    table.set_spans(target, 1, 1);

    log::debug!("split {target} into {} cells", created.len() + 1);
    let order = table.cell_keys();
    created.sort_by_key(|key| order.iter().position(|k| k == key));
    Ok(created)
}
