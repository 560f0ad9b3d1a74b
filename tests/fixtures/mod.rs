//! Test fixtures for building tables in memory.
//!
//! `TableBuilder` draws a table from a letter map: every distinct letter is
//! one cell covering the bounding box of its occurrences, and `.` leaves a
//! slot uncovered. The letter becomes the cell's text, so grid dumps read
//! back the same picture.
//!
//! # Example
//!
//! ```rust
//! use fixtures::TableBuilder;
//!
//! let table = TableBuilder::from_rows(&[
//!     "A A B",
//!     "A A C",
//!     "D E F",
//! ])
//! .full(true)
//! .build();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]

use std::collections::BTreeMap;

use spangrid::ops::create_table;
use spangrid::{Cell, ColId, Column, GridConfig, Row, RowId, Table, TableId};

/// Builder for tables drawn as letter maps.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    rows: Vec<Vec<char>>,
    full: bool,
    col_width: Option<f32>,
    id: String,
}

impl TableBuilder {
    /// One string per row, one whitespace-separated token per column.
    pub fn from_rows(rows: &[&str]) -> Self {
        let rows: Vec<Vec<char>> = rows
            .iter()
            .map(|row| {
                row.split_whitespace()
                    .map(|token| token.chars().next().unwrap())
                    .collect()
            })
            .collect();
        let width = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == width),
            "every row needs the same number of columns"
        );
        Self {
            rows,
            full: false,
            col_width: None,
            id: "t".to_string(),
        }
    }

    pub fn full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }

    pub fn col_width(mut self, width: f32) -> Self {
        self.col_width = Some(width);
        self
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn build(self) -> Table {
        let row_count = self.rows.len();
        let col_count = self.rows.first().map_or(0, Vec::len);
        let width = self.col_width.unwrap_or(if self.full {
            100.0 / col_count as f32
        } else {
            100.0
        });

        // letter -> (top, left, bottom, right), inclusive
        let mut boxes: BTreeMap<char, (usize, usize, usize, usize)> = BTreeMap::new();
        for (r, row) in self.rows.iter().enumerate() {
            for (c, &letter) in row.iter().enumerate() {
                if letter == '.' {
                    continue;
                }
                let entry = boxes.entry(letter).or_insert((r, c, r, c));
                entry.0 = entry.0.min(r);
                entry.1 = entry.1.min(c);
                entry.2 = entry.2.max(r);
                entry.3 = entry.3.max(c);
            }
        }

        let mut table = Table::new(TableId::new(self.id), self.full);
        for c in 0..col_count {
            table.columns.push(Column::new(ColId::new(format!("c{c}")), width));
        }
        for r in 0..row_count {
            table.rows.push(Row::new(RowId::new(format!("r{r}"))));
        }
        for (letter, (top, left, bottom, right)) in boxes {
            let cell = Cell::with_text(ColId::new(format!("c{left}")), letter.to_string())
                .with_spans(bottom - top + 1, right - left + 1);
            table.rows[top].cells.push(cell);
        }
        for row in &mut table.rows {
            row.cells.sort_by_key(|cell| cell.col.as_str()[1..].parse::<usize>().unwrap());
        }
        table
    }
}

/// A fresh `rows x cols` table from `create_table`.
pub fn plain_table(rows: usize, cols: usize) -> Table {
    create_table(rows, cols, false, &GridConfig::default()).unwrap()
}
