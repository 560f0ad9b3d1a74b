//! Structural operation tests
//!
//! Tables are drawn as letter maps (see `fixtures::TableBuilder`) and
//! compared against the expected picture after each operation. Every
//! operation must leave the grid tiled.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;
mod fixtures;

use common::{assert_tiled, column_names, grid_dump, slot, slots, spans, total_width};
use fixtures::TableBuilder;
use pretty_assertions::assert_eq;
use spangrid::ops::{
    insert_column, insert_column_left, insert_column_right, insert_row, insert_row_above,
    insert_row_below, merge_cells, remove_columns, remove_rows, split_cell, TableState,
};
use spangrid::{GridConfig, SpanGridError};
use test_case::test_case;

fn letters_3x3() -> spangrid::Table {
    TableBuilder::from_rows(&["A B C", "D E F", "G H I"]).build()
}

// ============================================================================
// MERGE THEN REMOVE COLUMN
// ============================================================================

#[test]
fn test_merge_bottom_right_block() {
    let mut table = letters_3x3();
    let block = slots(&table, &[(1, 1), (1, 2), (2, 1), (2, 2)]);
    let origin = merge_cells(&mut table, &block).unwrap();

    assert_eq!(origin, block[0]);
    assert_eq!(table.cell_count(), 6);
    assert_eq!(spans(&table, &origin), (2, 2));
    assert_eq!(table.cell(&origin).unwrap().text(), "E\nF\nH\nI");
    assert_eq!(grid_dump(&table), vec!["A B C", "D E E", "G E E"]);
    assert_tiled(&table);
}

#[test]
fn test_remove_column_rehomes_merged_cell() {
    let mut table = letters_3x3();
    let block = slots(&table, &[(1, 1), (1, 2), (2, 1), (2, 2)]);
    merge_cells(&mut table, &block).unwrap();

    let target = slot(&table, 0, 1);
    assert_eq!(remove_columns(&mut table, &[target]).unwrap(), TableState::Live);

    assert_eq!(table.col_count(), 2);
    assert_eq!(column_names(&table), vec!["c0", "c2"]);
    assert_eq!(grid_dump(&table), vec!["A C", "D E", "G E"]);

    let merged = slot(&table, 1, 1);
    assert_eq!(merged.col.as_str(), "c2");
    assert_eq!(spans(&table, &merged), (2, 1));
    assert_eq!(table.cell(&merged).unwrap().text(), "E\nF\nH\nI");
    assert_eq!(total_width(&table), 300.0);
    assert_tiled(&table);
}

#[test]
fn test_remove_first_column_collapses_row() {
    let mut table = letters_3x3();
    let block = slots(&table, &[(1, 1), (1, 2), (2, 1), (2, 2)]);
    let origin = merge_cells(&mut table, &block).unwrap();

    let target = slot(&table, 0, 0);
    remove_columns(&mut table, &[target]).unwrap();

    // Row 2 only had G of its own; with G gone the merged cell shrinks.
    assert_eq!(table.row_count(), 2);
    assert_eq!(grid_dump(&table), vec!["B C", "E E"]);
    assert_eq!(spans(&table, &origin), (1, 2));
    assert_tiled(&table);
}

#[test]
fn test_remove_columns_full_table_keeps_total_width() {
    let mut table = TableBuilder::from_rows(&["A B C D"]).full(true).build();
    let targets = slots(&table, &[(0, 1), (0, 2)]);
    remove_columns(&mut table, &targets).unwrap();

    assert_eq!(grid_dump(&table), vec!["A D"]);
    let widths: Vec<f32> = table.columns.iter().map(|c| c.width).collect();
    assert_eq!(widths, vec![25.0, 75.0]);
}

#[test]
fn test_remove_column_narrows_spanning_cell() {
    let mut table = TableBuilder::from_rows(&["A A A", "B C D"]).build();
    let target = slot(&table, 1, 1);
    remove_columns(&mut table, &[target]).unwrap();

    assert_eq!(grid_dump(&table), vec!["A A", "B D"]);
    assert_eq!(spans(&table, &slot(&table, 0, 0)), (1, 2));
    assert_tiled(&table);
}

// ============================================================================
// ROW INSERTION AROUND SPANS
// ============================================================================

#[test]
fn test_insert_row_inside_span_grows_cell() {
    let mut table = TableBuilder::from_rows(&["A B", "A C"]).build();
    let tall = slot(&table, 0, 0);
    let id = insert_row(&mut table, 1).unwrap();

    assert_eq!(spans(&table, &tall), (3, 1));
    assert_eq!(table.row(&id).unwrap().cells.len(), 1);
    assert_eq!(grid_dump(&table), vec!["A B", "A _", "A C"]);
    assert_tiled(&table);
}

#[test]
fn test_insert_row_above_span_adds_full_row() {
    let mut table = TableBuilder::from_rows(&["A B", "A C"]).build();
    let tall = slot(&table, 0, 0);
    insert_row_above(&mut table, &tall).unwrap();

    assert_eq!(spans(&table, &tall), (2, 1));
    assert_eq!(grid_dump(&table), vec!["_ _", "A B", "A C"]);
    assert_tiled(&table);
}

#[test]
fn test_insert_row_below_uses_cell_bottom() {
    let mut table = TableBuilder::from_rows(&["A B", "A C", "D E"]).build();
    let tall = slot(&table, 0, 0);
    insert_row_below(&mut table, &tall).unwrap();
    assert_eq!(grid_dump(&table), vec!["A B", "A C", "_ _", "D E"]);

    let short = slot(&table, 0, 1);
    insert_row_below(&mut table, &short).unwrap();
    assert_eq!(grid_dump(&table), vec!["A B", "A _", "A C", "_ _", "D E"]);
    assert_tiled(&table);
}

#[test]
fn test_insert_then_remove_row_restores_table() {
    let original = TableBuilder::from_rows(&["A B C", "A D E", "F G G"]).build();
    let mut table = original.clone();

    let id = insert_row(&mut table, 1).unwrap();
    assert_eq!(grid_dump(&table), vec!["A B C", "A _ _", "A D E", "F G G"]);

    let row = table.row_index(&id).unwrap();
    let fresh = slots(&table, &[(row, 1), (row, 2)]);
    remove_rows(&mut table, &fresh).unwrap();

    assert_eq!(table, original);
}

// ============================================================================
// ROW REMOVAL
// ============================================================================

#[test]
fn test_remove_row_carries_tall_cell_down() {
    let mut table = TableBuilder::from_rows(&["A B", "C B", "D B"]).build();
    let target = slot(&table, 0, 0);
    remove_rows(&mut table, &[target]).unwrap();

    assert_eq!(grid_dump(&table), vec!["C B", "D B"]);
    let carried = slot(&table, 0, 1);
    assert_eq!(carried.row.as_str(), "r1");
    assert_eq!(spans(&table, &carried), (2, 1));
    assert_eq!(table.cell(&carried).unwrap().text(), "B");
    assert_tiled(&table);
}

#[test]
fn test_remove_row_shrinks_span_from_above() {
    let mut table = TableBuilder::from_rows(&["A B", "A C", "D E"]).build();
    let target = slot(&table, 1, 1);
    remove_rows(&mut table, &[target]).unwrap();

    assert_eq!(grid_dump(&table), vec!["A B", "D E"]);
    assert_eq!(spans(&table, &slot(&table, 0, 0)), (1, 1));
}

#[test]
fn test_remove_rows_block_from_scattered_targets() {
    let mut table = TableBuilder::from_rows(&["A B", "C D", "E F", "G H"]).build();
    let targets = slots(&table, &[(1, 0), (2, 1)]);
    remove_rows(&mut table, &targets).unwrap();
    assert_eq!(grid_dump(&table), vec!["A B", "G H"]);
}

// ============================================================================
// COLUMN INSERTION
// ============================================================================

#[test_case(0, &["_ A A B", "_ C D D", "_ C E F"], 3; "left edge")]
#[test_case(1, &["A A A B", "C _ D D", "C _ E F"], 2; "inside top span")]
#[test_case(2, &["A A _ B", "C D D D", "C E _ F"], 2; "inside middle span")]
#[test_case(3, &["A A B _", "C D D _", "C E F _"], 3; "right edge")]
fn test_insert_column_at(before: usize, expected: &[&str], fresh: usize) {
    let config = GridConfig::default();
    let mut table = TableBuilder::from_rows(&["A A B", "C D D", "C E F"]).build();
    let cells_before = table.cell_count();

    let id = insert_column(&mut table, before, &config).unwrap();

    assert_eq!(table.col_id_at(before), Some(&id));
    assert_eq!(grid_dump(&table), expected);
    assert_eq!(table.cell_count(), cells_before + fresh);
    assert_tiled(&table);
}

#[test]
fn test_insert_column_through_tall_span_widens_once() {
    let config = GridConfig::default();
    let mut table = TableBuilder::from_rows(&["A A B", "A A C"]).build();
    let block = slot(&table, 0, 0);
    insert_column(&mut table, 1, &config).unwrap();

    assert_eq!(spans(&table, &block), (2, 3));
    assert_eq!(table.cell_count(), 3);
    assert_eq!(grid_dump(&table), vec!["A A A B", "A A A C"]);
}

#[test]
fn test_insert_column_left_and_right_of_spanned_cell() {
    let config = GridConfig::default();
    let mut table = TableBuilder::from_rows(&["A A", "B C"]).build();
    let wide = slot(&table, 0, 0);

    insert_column_right(&mut table, &wide, &config).unwrap();
    assert_eq!(grid_dump(&table), vec!["A A _", "B C _"]);

    insert_column_left(&mut table, &wide, &config).unwrap();
    assert_eq!(grid_dump(&table), vec!["_ A A _", "_ B C _"]);
    assert_tiled(&table);
}

#[test]
fn test_insert_column_full_table_halves_neighbour() {
    let config = GridConfig::default();
    let mut table = TableBuilder::from_rows(&["A B"]).full(true).build();
    insert_column(&mut table, 1, &config).unwrap();

    let widths: Vec<f32> = table.columns.iter().map(|c| c.width).collect();
    assert_eq!(widths, vec![50.0, 25.0, 25.0]);
    assert_eq!(total_width(&table), 100.0);
}

// ============================================================================
// MERGE AND SPLIT
// ============================================================================

#[test]
fn test_merge_then_split_restores_ids() {
    let mut table = letters_3x3();
    let original_keys = table.cell_keys();
    let block = slots(&table, &[(0, 0), (0, 1), (1, 0), (1, 1)]);

    let origin = merge_cells(&mut table, &block).unwrap();
    assert_eq!(table.cell_count(), 6);

    let created = split_cell(&mut table, &origin).unwrap();
    assert_eq!(created, block[1..].to_vec());
    assert_eq!(table.cell_keys(), original_keys);
    assert_eq!(spans(&table, &origin), (1, 1));
    assert_eq!(grid_dump(&table), vec!["A _ C", "_ _ F", "G H I"]);
    assert_tiled(&table);
}

#[test]
fn test_merge_everything_collapses_to_one_cell() {
    let mut table = TableBuilder::from_rows(&["A B B", "C D E"]).build();
    let all = table.cell_keys();
    let origin = merge_cells(&mut table, &all).unwrap();

    assert_eq!((table.row_count(), table.col_count()), (1, 1));
    assert_eq!(spans(&table, &origin), (1, 1));
    assert_eq!(table.cell(&origin).unwrap().text(), "A\nB\nC\nD\nE");
    assert_eq!(total_width(&table), 300.0);
}

#[test]
fn test_merge_rejects_l_shape() {
    let mut table = letters_3x3();
    let before = table.clone();
    let l_shape = slots(&table, &[(0, 0), (1, 0), (1, 1)]);
    assert!(matches!(
        merge_cells(&mut table, &l_shape),
        Err(SpanGridError::NonRectangular(_))
    ));
    assert_eq!(table, before);
}

#[test]
fn test_merge_rejects_disjoint_cells() {
    let mut table = letters_3x3();
    let corners = slots(&table, &[(0, 0), (0, 2)]);
    assert!(matches!(
        merge_cells(&mut table, &corners),
        Err(SpanGridError::NonRectangular(_))
    ));
}

#[test]
fn test_split_tall_and_wide_cell() {
    let mut table = TableBuilder::from_rows(&["A B B", "C B B", "D E F"]).build();
    let block = slot(&table, 0, 1);
    let created = split_cell(&mut table, &block).unwrap();

    assert_eq!(created.len(), 3);
    assert_eq!(grid_dump(&table), vec!["A B _", "C _ _", "D E F"]);
    assert_tiled(&table);
}

// ============================================================================
// VALIDATION
// ============================================================================

#[test]
fn test_operations_refuse_untiled_table() {
    let config = GridConfig::default();
    let mut table = TableBuilder::from_rows(&["A B", "C ."]).build();
    assert!(matches!(
        insert_column(&mut table, 0, &config),
        Err(SpanGridError::InvalidArgument(_))
    ));
    assert!(matches!(
        insert_row(&mut table, 0),
        Err(SpanGridError::InvalidArgument(_))
    ));
}

#[test]
fn test_empty_target_set_is_rejected() {
    let mut table = letters_3x3();
    assert!(matches!(
        remove_rows(&mut table, &[]),
        Err(SpanGridError::InvalidArgument(_))
    ));
    assert!(matches!(
        remove_columns(&mut table, &[]),
        Err(SpanGridError::InvalidArgument(_))
    ));
}

// ============================================================================
// OPERATION SEQUENCES
// ============================================================================

/// One structural operation, addressed by grid slots.
#[derive(Debug, Clone, Copy)]
enum Step {
    InsertRow(usize),
    InsertColumn(usize),
    RowAbove(usize, usize),
    RowBelow(usize, usize),
    ColumnLeft(usize, usize),
    ColumnRight(usize, usize),
    Merge(&'static [(usize, usize)]),
    Split(usize, usize),
    RemoveRows(&'static [(usize, usize)]),
    RemoveColumns(&'static [(usize, usize)]),
}

fn apply(table: &mut spangrid::Table, step: Step, config: &GridConfig) {
    match step {
        Step::InsertRow(at) => drop(insert_row(table, at).unwrap()),
        Step::InsertColumn(at) => drop(insert_column(table, at, config).unwrap()),
        Step::RowAbove(r, c) => drop(insert_row_above(table, &slot(table, r, c)).unwrap()),
        Step::RowBelow(r, c) => drop(insert_row_below(table, &slot(table, r, c)).unwrap()),
        Step::ColumnLeft(r, c) => {
            drop(insert_column_left(table, &slot(table, r, c), config).unwrap())
        }
        Step::ColumnRight(r, c) => {
            drop(insert_column_right(table, &slot(table, r, c), config).unwrap())
        }
        Step::Merge(at) => drop(merge_cells(table, &slots(table, at)).unwrap()),
        Step::Split(r, c) => drop(split_cell(table, &slot(table, r, c)).unwrap()),
        Step::RemoveRows(at) => {
            assert_eq!(remove_rows(table, &slots(table, at)).unwrap(), TableState::Live)
        }
        Step::RemoveColumns(at) => {
            assert_eq!(remove_columns(table, &slots(table, at)).unwrap(), TableState::Live)
        }
    }
}

#[test_case(&[
    Step::RowBelow(0, 0),
    Step::ColumnRight(0, 0),
    Step::Merge(&[(0, 0), (0, 1), (1, 0), (1, 1)]),
    Step::InsertRow(1),
    Step::Split(0, 0),
    Step::RemoveColumns(&[(0, 1)]),
    Step::RemoveRows(&[(2, 0)]),
]; "grow merge split shrink")]
#[test_case(&[
    Step::Merge(&[(0, 0), (0, 1)]),
    Step::ColumnRight(0, 0),
    Step::ColumnLeft(1, 1),
    Step::Merge(&[(1, 1), (2, 1)]),
    Step::RemoveRows(&[(0, 0)]),
    Step::Split(0, 1),
]; "wide origin widened then removed")]
#[test_case(&[
    Step::Merge(&[(0, 1), (0, 2), (1, 1), (1, 2)]),
    Step::RowAbove(1, 0),
    Step::ColumnLeft(0, 2),
    Step::RemoveColumns(&[(0, 2)]),
    Step::InsertColumn(0),
    Step::RemoveRows(&[(0, 0), (1, 0)]),
]; "block grown through then cut out")]
fn test_sequence_stays_tiled(steps: &[Step]) {
    let config = GridConfig::default();
    let mut table = letters_3x3();
    for (i, &step) in steps.iter().enumerate() {
        apply(&mut table, step, &config);
        assert_tiled(&table);
        let report = spangrid::balance(&mut table);
        assert!(report.is_clean(), "step {i} {step:?} left work for the balancer: {report:?}");
    }
}
