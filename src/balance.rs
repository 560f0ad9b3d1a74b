//! Consistency balancer.
//!
//! Restores the tiling invariant after edits that went around the structural
//! operations: deletions across cell boundaries, pastes, undo of partial
//! document state. The pass does not try to recover what the user meant; it
//! picks the shape that keeps the most content and is a fixed point of
//! itself, so a second run reports no changes.

use std::collections::HashSet;

use crate::config::DEFAULT_COL_WIDTH;
use crate::types::{Cell, CellKey, ColId, Column, ContentLine, Table};

/// What a balancer pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceReport {
    /// Cells dropped because an edit left them without content
    pub pruned_cells: usize,
    /// Columns declared because cells referred to them
    pub declared_columns: usize,
    /// Spans reduced to fit the table or neighbouring cells
    pub clamped_spans: usize,
    /// Cells whose slot was already covered; content moved to the coverer
    pub absorbed_cells: usize,
    /// 1x1 cells created to close gaps
    pub fillers: usize,
    /// Rows dropped because no cell started in them
    pub removed_rows: usize,
    /// Columns dropped because no cell started in them
    pub removed_columns: usize,
    /// The table lost its last row or column
    pub table_removed: bool,
}

impl BalanceReport {
    /// True when the pass found nothing to repair
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Run every repair pass over `table`.
pub fn balance(table: &mut Table) -> BalanceReport {
    let had_structure = !table.rows.is_empty() || !table.columns.is_empty();
    let pruned_cells = prune_empty_cells(table);
    // A row whose every cell lost its content was deleted by the edit.
    let emptied_rows = drop_empty_rows(table);
    let declared_columns = declare_missing_columns(table);
    let clamped = clamp_spans(table);
    let (absorbed_cells, cut_short, fillers) = retile(table);
    let removed_rows = emptied_rows + drop_empty_rows(table);
    let removed_columns = drop_unoccupied_columns(table);

    // Only the pass that empties the table reports it; an already cleared
    // table is a fixed point.
    let table_removed = had_structure && table.is_empty();
    if table_removed {
        log::warn!("table {} has no rows or columns left; removing it", table.id);
    }
    if table.is_empty() {
        table.rows.clear();
        table.columns.clear();
    }

    let report = BalanceReport {
        pruned_cells,
        declared_columns,
        clamped_spans: clamped + cut_short,
        absorbed_cells,
        fillers,
        removed_rows,
        removed_columns,
        table_removed,
    };
    if !report.is_clean() {
        log::debug!("balanced table {}: {report:?}", table.id);
    }
    report
}

fn prune_empty_cells(table: &mut Table) -> usize {
    let mut pruned = 0;
    for row in &mut table.rows {
        let before = row.cells.len();
        row.cells.retain(Cell::has_content);
        pruned += before - row.cells.len();
    }
    pruned
}

/// Cells pointing at a column the table no longer declares keep their
/// content by getting the column back, appended at the right edge.
fn declare_missing_columns(table: &mut Table) -> usize {
    let declared: HashSet<ColId> = table.column_ids().cloned().collect();
    let mut missing: Vec<ColId> = Vec::new();
    for (_, cell) in table.cells() {
        if !declared.contains(&cell.col) && !missing.contains(&cell.col) {
            missing.push(cell.col.clone());
        }
    }
    if missing.is_empty() {
        return 0;
    }

    let width = if table.columns.is_empty() {
        if table.full {
            100.0 / missing.len() as f32
        } else {
            DEFAULT_COL_WIDTH
        }
    } else {
        table.total_width() / table.col_count() as f32
    };
    log::warn!(
        "table {}: declaring {} column(s) referenced only by cells",
        table.id,
        missing.len()
    );
    let count = missing.len();
    for id in missing {
        table.columns.push(Column::new(id, width));
    }
    count
}

fn clamp_spans(table: &mut Table) -> usize {
    let row_count = table.row_count();
    let mut clamped = 0;
    for (index, row) in table.rows.iter_mut().enumerate() {
        let rows_left = row_count - index;
        for cell in &mut row.cells {
            let row_span = cell.row_span.clamp(1, rows_left);
            let col_span = cell.col_span.max(1);
            if row_span != cell.row_span || col_span != cell.col_span {
                cell.row_span = row_span;
                cell.col_span = col_span;
                clamped += 1;
            }
        }
    }
    clamped
}

/// Replay rows top-down against an ownership grid.
///
/// Earlier rows win: a cell whose origin slot is already taken hands its
/// content to the owner and disappears, a colspan running into a taken slot
/// or off the table is cut short, and free slots get filler cells. Returns
/// (absorbed, clamped, fillers).
fn retile(table: &mut Table) -> (usize, usize, usize) {
    let rows = table.row_count();
    let cols = table.col_count();
    let col_ids: Vec<ColId> = table.column_ids().cloned().collect();
    let mut owners: Vec<Option<CellKey>> = vec![None; rows * cols];
    let mut absorbed: Vec<(CellKey, Vec<ContentLine>)> = Vec::new();
    let mut clamped = 0;
    let mut fillers = 0;

    for row_index in 0..rows {
        let Some(row) = table.rows.get_mut(row_index) else {
            continue;
        };
        let row_id = row.id.clone();
        let mut pending = std::mem::take(&mut row.cells);
        pending.sort_by_key(|cell| col_ids.iter().position(|id| id == &cell.col));

        let mut kept: Vec<(usize, Cell)> = Vec::with_capacity(cols);
        for mut cell in pending {
            let Some(col) = col_ids.iter().position(|id| id == &cell.col) else {
                continue;
            };
            let slot = row_index * cols + col;
            if let Some(owner) = owners.get(slot).cloned().flatten() {
                absorbed.push((owner, std::mem::take(&mut cell.content)));
                continue;
            }

            let mut span = 1;
            while span < cell.col_span
                && col + span < cols
                && owners
                    .get(slot + span)
                    .is_some_and(|owner| owner.is_none())
            {
                span += 1;
            }
            if span != cell.col_span {
                cell.col_span = span;
                clamped += 1;
            }

            let key = CellKey::new(row_id.clone(), cell.col.clone());
            paint(&mut owners, cols, row_index, col, cell.row_span, span, &key);
            kept.push((col, cell));
        }

        for (col, id) in col_ids.iter().enumerate() {
            let slot = row_index * cols + col;
            if owners.get(slot).is_some_and(Option::is_none) {
                let key = CellKey::new(row_id.clone(), id.clone());
                paint(&mut owners, cols, row_index, col, 1, 1, &key);
                kept.push((col, Cell::new(id.clone())));
                fillers += 1;
            }
        }

        kept.sort_by_key(|(col, _)| *col);
        if let Some(row) = table.rows.get_mut(row_index) {
            row.cells = kept.into_iter().map(|(_, cell)| cell).collect();
        }
    }

    let absorbed_count = absorbed.len();
    for (owner, lines) in absorbed {
        let lines: Vec<ContentLine> = lines.into_iter().filter(|l| !l.is_blank()).collect();
        if !lines.is_empty() {
            table.append_content(&owner, lines);
        }
    }
    (absorbed_count, clamped, fillers)
}

fn paint(
    owners: &mut [Option<CellKey>],
    cols: usize,
    row: usize,
    col: usize,
    row_span: usize,
    col_span: usize,
    key: &CellKey,
) {
    for r in row..row + row_span {
        for c in col..(col + col_span).min(cols) {
            if let Some(slot) = owners.get_mut(r * cols + c) {
                slot.get_or_insert_with(|| key.clone());
            }
        }
    }
}

/// Drop rows nobody starts in; spans reaching through them shrink.
fn drop_empty_rows(table: &mut Table) -> usize {
    let mut removed = 0;
    while let Some(index) = table.rows.iter().position(|row| row.cells.is_empty()) {
        for (above, row) in table.rows.iter_mut().enumerate().take(index) {
            for cell in &mut row.cells {
                if above + cell.row_span > index {
                    cell.row_span = cell.row_span.saturating_sub(1).max(1);
                }
            }
        }
        table.remove_row(index);
        removed += 1;
    }
    removed
}

/// Drop columns nobody starts in; spans reaching through them shrink and the
/// width goes to the next column (previous at the right edge).
fn drop_unoccupied_columns(table: &mut Table) -> usize {
    let mut removed = 0;
    loop {
        let occupied: HashSet<&ColId> = table.cells().map(|(_, cell)| &cell.col).collect();
        let Some(index) = table
            .columns
            .iter()
            .position(|col| !occupied.contains(&col.id))
        else {
            break;
        };

        let col_ids: Vec<ColId> = table.column_ids().cloned().collect();
        for row in &mut table.rows {
            for cell in &mut row.cells {
                let start = col_ids.iter().position(|id| id == &cell.col);
                if start.is_some_and(|start| start < index && start + cell.col_span > index) {
                    cell.col_span = cell.col_span.saturating_sub(1).max(1);
                }
            }
        }

        let Some(column) = table.remove_column(index) else {
            break;
        };
        let recipient = if index < table.col_count() {
            Some(index)
        } else {
            index.checked_sub(1)
        };
        if let Some(target) = recipient.and_then(|i| table.columns.get_mut(i)) {
            target.width += column.width;
        }
        removed += 1;
    }
    removed
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::ops::create_table;

    fn table(rows: usize, cols: usize) -> Table {
        create_table(rows, cols, false, &GridConfig::default()).unwrap()
    }

    #[test]
    fn test_balanced_table_is_clean() {
        let mut t = table(3, 3);
        let before = t.clone();
        assert!(balance(&mut t).is_clean());
        assert_eq!(t, before);
    }

    #[test]
    fn test_gap_is_filled() {
        let mut t = table(2, 2);
        let key = t.cell_at_slot(1, 1).unwrap();
        t.remove_cell(&key);
        let report = balance(&mut t);
        assert_eq!(report.fillers, 1);
        assert!(t.check_tiling().is_ok());
        assert!(t.contains(&key));
    }

    #[test]
    fn test_overlap_is_absorbed() {
        let mut t = table(2, 2);
        let wide = t.cell_at_slot(0, 0).unwrap();
        let victim = t.cell_at_slot(0, 1).unwrap();
        t.cell_mut(&victim).unwrap().content = vec![ContentLine::new("kept")];
        t.set_spans(&wide, 1, 2);
        let report = balance(&mut t);
        assert_eq!(report.absorbed_cells, 1);
        assert!(!t.contains(&victim));
        assert_eq!(t.cell(&wide).unwrap().text(), "\nkept");
        assert!(t.check_tiling().is_ok());
    }

    #[test]
    fn test_empty_cell_is_pruned_and_refilled() {
        let mut t = table(2, 2);
        let key = t.cell_at_slot(0, 1).unwrap();
        t.clear_content(&key);
        let report = balance(&mut t);
        assert_eq!(report.pruned_cells, 1);
        assert_eq!(report.fillers, 1);
        assert!(t.cell(&key).unwrap().has_content());
    }

    #[test]
    fn test_rowspan_clamped_to_table() {
        let mut t = table(2, 1);
        let key = t.cell_at_slot(1, 0).unwrap();
        t.set_spans(&key, 4, 1);
        let report = balance(&mut t);
        assert_eq!(report.clamped_spans, 1);
        assert_eq!(t.cell(&key).unwrap().row_span, 1);
    }

    #[test]
    fn test_fully_covered_row_is_dropped() {
        let mut t = table(2, 2);
        for col in 0..2 {
            let key = t.cell_at_slot(0, col).unwrap();
            t.set_spans(&key, 2, 1);
        }
        let report = balance(&mut t);
        assert_eq!(report.removed_rows, 1);
        assert_eq!(t.row_count(), 1);
        assert!(t.cells().all(|(_, c)| c.row_span == 1));
    }

    #[test]
    fn test_undeclared_column_is_declared() {
        let mut t = table(1, 1);
        t.rows[0].cells.push(Cell::with_text(ColId::from("pasted"), "x"));
        let report = balance(&mut t);
        assert_eq!(report.declared_columns, 1);
        assert_eq!(t.col_count(), 2);
        assert!(t.check_tiling().is_ok());
    }

    #[test]
    fn test_losing_every_cell_removes_table() {
        let mut t = table(2, 2);
        for key in t.cell_keys() {
            t.clear_content(&key);
        }
        let report = balance(&mut t);
        assert!(report.table_removed);
        assert!(t.rows.is_empty() && t.columns.is_empty());
    }

    #[test]
    fn test_cleared_table_is_a_fixed_point() {
        let mut t = table(1, 2);
        for key in t.cell_keys() {
            t.clear_content(&key);
        }
        assert!(balance(&mut t).table_removed);
        let again = balance(&mut t);
        assert!(again.is_clean(), "{again:?}");
        assert!(t.is_empty());
    }
}
