//! Table editing session.
//!
//! `TableEditor` owns one table and is the mutation surface UI
//! collaborators talk to. It adds:
//! - Structural operations with undo/redo snapshots
//! - Debounced balancer runs after unstructured document edits
//! - Dirty tracking for the host's save logic

mod history;
mod mutation;

pub use history::{History, Snapshot};
pub use mutation::MutationEvent;

use crate::balance::{balance, BalanceReport};
use crate::codec::{read_table, write_records, TableRecord};
use crate::config::GridConfig;
use crate::debounce::Debounced;
use crate::error::{Result, SpanGridError};
use crate::layout::GridLayout;
use crate::ops::{self, TableState};
use crate::selection::{resolve_selection, GeometryProvider, Point};
use crate::types::{CellKey, ColId, RowId, Table, TableId};

type RepairFn = fn(&mut Table) -> BalanceReport;

/// Editing session for a single table.
#[derive(Debug)]
pub struct TableEditor {
    table: Option<Table>,
    config: GridConfig,
    repair: Debounced<RepairFn>,
    history: History,
    dirty: bool,
    last_report: Option<BalanceReport>,
}

impl Default for TableEditor {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl TableEditor {
    pub fn new(config: GridConfig) -> Self {
        Self {
            table: None,
            repair: Debounced::new(config.debounce_ms, balance as RepairFn),
            history: History::new(config.history_limit),
            config,
            dirty: false,
            last_report: None,
        }
    }

    /// Start a session on an existing table, repairing it first.
    pub fn with_table(config: GridConfig, mut table: Table) -> Self {
        let report = balance(&mut table);
        let mut editor = Self::new(config);
        editor.table = (!table.is_empty()).then_some(table);
        editor.last_report = Some(report);
        editor
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn table_id(&self) -> Option<&TableId> {
        self.table.as_ref().map(|table| &table.id)
    }

    /// Check if any edits have been made since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Report of the most recent balancer pass.
    pub fn last_report(&self) -> Option<&BalanceReport> {
        self.last_report.as_ref()
    }

    pub fn repair_pending(&self) -> bool {
        self.repair.is_pending()
    }

    // ---- Loading and saving ----

    /// Create a fresh table, replacing the current one.
    pub fn create(&mut self, rows: usize, cols: usize, full: bool) -> Result<TableId> {
        let table = ops::create_table(rows, cols, full, &self.config)?;
        let id = table.id.clone();
        self.history.push(self.table.take());
        self.table = Some(table);
        self.repair.cancel();
        self.dirty = true;
        Ok(id)
    }

    /// Replace the session's table with one decoded from records.
    ///
    /// The decoded table is balanced immediately and history is reset.
    pub fn load_records(&mut self, records: &[TableRecord]) -> Result<()> {
        let mut table = read_table(records)?;
        let report = balance(&mut table);
        if !report.is_clean() {
            log::info!("repaired table {} on load", table.id);
        }
        self.table = (!table.is_empty()).then_some(table);
        self.last_report = Some(report);
        self.history.clear();
        self.repair.cancel();
        self.dirty = false;
        Ok(())
    }

    /// Current record stream; empty when there is no table.
    pub fn records(&self) -> Vec<TableRecord> {
        self.table.as_ref().map(write_records).unwrap_or_default()
    }

    // ---- Repair scheduling ----

    /// Feed a document mutation; structural ones schedule a repair.
    ///
    /// Returns whether a repair is now scheduled.
    pub fn observe(&mut self, event: &MutationEvent, now_ms: f64) -> bool {
        if event.is_structural() && self.table.is_some() {
            self.repair.trigger(now_ms);
        }
        self.repair.is_pending()
    }

    /// Run the scheduled repair if its quiet period has elapsed.
    pub fn tick(&mut self, now_ms: f64) -> Option<BalanceReport> {
        let Some(table) = self.table.as_mut() else {
            self.repair.cancel();
            return None;
        };
        let report = self.repair.tick(now_ms, table)?;
        Some(self.finish_repair(report))
    }

    /// Run a scheduled repair immediately.
    pub fn flush_repair(&mut self) -> Option<BalanceReport> {
        let Some(table) = self.table.as_mut() else {
            self.repair.cancel();
            return None;
        };
        let report = self.repair.flush(table)?;
        Some(self.finish_repair(report))
    }

    fn finish_repair(&mut self, report: BalanceReport) -> BalanceReport {
        if self.table.as_ref().is_some_and(Table::is_empty) {
            log::warn!("balancer removed the table");
            self.table = None;
        }
        if !report.is_clean() {
            self.dirty = true;
        }
        self.last_report = Some(report);
        report
    }

    /// Let the document collaborator edit the model directly.
    ///
    /// The edit is recorded for undo and a repair pass is scheduled, since
    /// nothing guarantees the edit preserved the tiling.
    pub fn apply_unstructured<F, T>(&mut self, now_ms: f64, edit: F) -> Result<T>
    where
        F: FnOnce(&mut Table) -> T,
    {
        let before = self.table.clone();
        let table = self.table.as_mut().ok_or(SpanGridError::NoTable)?;
        let out = edit(table);
        self.history.push(before);
        self.repair.trigger(now_ms);
        self.dirty = true;
        Ok(out)
    }

    /// Replace a cell's text, one content line per `\n`.
    pub fn set_cell_text(&mut self, key: &CellKey, text: &str) -> Result<()> {
        self.structural(|table, _| mutation::apply_cell_text(table, key, text))
    }

    // ---- Structural operations ----

    /// Run `op` on a repaired table and record the prior state on success.
    fn structural<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Table, &GridConfig) -> Result<T>,
    {
        self.flush_repair();
        let before = self.table.clone();
        let config = &self.config;
        let table = self.table.as_mut().ok_or(SpanGridError::NoTable)?;
        let out = op(table, config)?;
        if table.is_empty() {
            self.table = None;
        }
        self.history.push(before);
        self.dirty = true;
        Ok(out)
    }

    pub fn insert_row(&mut self, before: usize) -> Result<RowId> {
        self.structural(|table, _| ops::insert_row(table, before))
    }

    pub fn insert_row_above(&mut self, cell: &CellKey) -> Result<RowId> {
        self.structural(|table, _| ops::insert_row_above(table, cell))
    }

    pub fn insert_row_below(&mut self, cell: &CellKey) -> Result<RowId> {
        self.structural(|table, _| ops::insert_row_below(table, cell))
    }

    pub fn insert_column(&mut self, before: usize) -> Result<ColId> {
        self.structural(|table, config| ops::insert_column(table, before, config))
    }

    pub fn insert_column_left(&mut self, cell: &CellKey) -> Result<ColId> {
        self.structural(|table, config| ops::insert_column_left(table, cell, config))
    }

    pub fn insert_column_right(&mut self, cell: &CellKey) -> Result<ColId> {
        self.structural(|table, config| ops::insert_column_right(table, cell, config))
    }

    pub fn remove_rows(&mut self, cells: &[CellKey]) -> Result<TableState> {
        self.structural(|table, _| ops::remove_rows(table, cells))
    }

    pub fn remove_columns(&mut self, cells: &[CellKey]) -> Result<TableState> {
        self.structural(|table, _| ops::remove_columns(table, cells))
    }

    pub fn merge_cells(&mut self, cells: &[CellKey]) -> Result<CellKey> {
        self.structural(|table, _| ops::merge_cells(table, cells))
    }

    pub fn split_cell(&mut self, cell: &CellKey) -> Result<Vec<CellKey>> {
        self.structural(|table, _| ops::split_cell(table, cell))
    }

    /// Remove the table from the document.
    pub fn delete_table(&mut self) -> Result<()> {
        let table = self.table.take().ok_or(SpanGridError::NoTable)?;
        self.history.push(Some(table));
        self.repair.cancel();
        self.dirty = true;
        Ok(())
    }

    // ---- Selection ----

    /// Cells touched by a drag from `start` to `end`.
    pub fn select<G>(&self, geometry: &G, start: Point, end: Point) -> Vec<CellKey>
    where
        G: GeometryProvider + ?Sized,
    {
        match &self.table {
            Some(table) => {
                resolve_selection(table, geometry, start, end, self.config.selection_tolerance)
            }
            None => Vec::new(),
        }
    }

    /// Layout computed from the model, for hosts that do not measure cells.
    pub fn layout(&self, available_width: f32) -> Option<GridLayout> {
        self.table
            .as_ref()
            .map(|table| GridLayout::new(table, &self.config, available_width))
    }

    // ---- Undo / redo ----

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restore the previous snapshot and schedule a repair pass.
    pub fn undo(&mut self, now_ms: f64) -> bool {
        let Some(previous) = self.history.undo(self.table.take()) else {
            return false;
        };
        self.restore(previous, now_ms);
        true
    }

    /// Re-apply the most recently undone snapshot.
    pub fn redo(&mut self, now_ms: f64) -> bool {
        let Some(next) = self.history.redo(self.table.take()) else {
            return false;
        };
        self.restore(next, now_ms);
        true
    }

    fn restore(&mut self, snapshot: Snapshot, now_ms: f64) {
        self.table = snapshot;
        if self.table.is_some() {
            self.repair.trigger(now_ms);
        } else {
            self.repair.cancel();
        }
        self.dirty = true;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::Cell;

    fn editor_3x3() -> TableEditor {
        let mut editor = TableEditor::default();
        editor.create(3, 3, false).unwrap();
        editor
    }

    fn slot(editor: &TableEditor, row: usize, col: usize) -> CellKey {
        editor.table().unwrap().cell_at_slot(row, col).unwrap()
    }

    #[test]
    fn test_structural_op_marks_dirty_and_records_history() {
        let mut editor = editor_3x3();
        editor.mark_clean();
        let key = slot(&editor, 0, 0);
        editor.insert_row_below(&key).unwrap();
        assert!(editor.is_dirty());
        assert_eq!(editor.table().unwrap().row_count(), 4);

        assert!(editor.undo(0.0));
        assert_eq!(editor.table().unwrap().row_count(), 3);
        assert!(editor.redo(0.0));
        assert_eq!(editor.table().unwrap().row_count(), 4);
    }

    #[test]
    fn test_failed_op_leaves_history_untouched() {
        let mut editor = editor_3x3();
        let before = editor.can_undo();
        let key = slot(&editor, 0, 0);
        assert!(editor.merge_cells(&[key]).is_err());
        assert_eq!(editor.can_undo(), before);
    }

    #[test]
    fn test_unstructured_edit_is_repaired_after_debounce() {
        let mut editor = editor_3x3();
        let key = slot(&editor, 1, 1);
        editor
            .apply_unstructured(0.0, |table| {
                table.remove_cell(&key);
            })
            .unwrap();
        assert!(editor.repair_pending());
        assert!(editor.tick(50.0).is_none());

        let report = editor.tick(100.0).unwrap();
        assert_eq!(report.fillers, 1);
        assert!(editor.table().unwrap().check_tiling().is_ok());
        assert!(!editor.repair_pending());
    }

    #[test]
    fn test_observe_ignores_text_events() {
        let mut editor = editor_3x3();
        assert!(!editor.observe(&MutationEvent::Text, 0.0));
        assert!(editor.observe(&MutationEvent::ChildList, 0.0));
    }

    #[test]
    fn test_structural_op_flushes_pending_repair() {
        let mut editor = editor_3x3();
        let stray = editor.table().unwrap().columns[0].id.clone();
        editor
            .apply_unstructured(0.0, |table| {
                table.rows[0].cells.push(Cell::new(stray));
            })
            .unwrap();
        let key = slot(&editor, 2, 2);
        editor.insert_column_right(&key).unwrap();
        assert!(!editor.repair_pending());
        assert!(editor.table().unwrap().check_tiling().is_ok());
    }

    #[test]
    fn test_removing_everything_drops_the_table() {
        let mut editor = editor_3x3();
        let keys = editor.table().unwrap().cell_keys();
        assert_eq!(editor.remove_rows(&keys).unwrap(), TableState::Removed);
        assert!(editor.table().is_none());
        assert!(matches!(
            editor.insert_row(0),
            Err(SpanGridError::NoTable)
        ));
        assert!(editor.undo(0.0));
        assert!(editor.table().is_some());
    }

    #[test]
    fn test_load_records_repairs_and_resets_history() {
        let mut editor = editor_3x3();
        let mut records = editor.records();
        records.pop();
        editor.load_records(&records).unwrap();
        assert!(!editor.can_undo());
        assert!(!editor.is_dirty());
        assert_eq!(editor.last_report().unwrap().fillers, 1);
        assert_eq!(editor.table().unwrap().cell_count(), 9);
    }

    #[test]
    fn test_select_through_layout() {
        let editor = editor_3x3();
        let layout = editor.layout(0.0).unwrap();
        let picked = editor.select(&layout, Point::new(10.0, 10.0), Point::new(150.0, 10.0));
        assert_eq!(picked, vec![slot(&editor, 0, 0), slot(&editor, 0, 1)]);
    }
}
