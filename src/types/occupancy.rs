//! Slot ownership snapshot.
//!
//! Paints every cell's rectangle onto a rows x columns grid so callers can
//! ask "who covers this slot" and "how often is it covered" without
//! rescanning the table.

use std::fmt;

use super::{CellKey, Table};

/// A cell resolved to grid indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedCell {
    pub key: CellKey,
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
}

impl PlacedCell {
    /// One past the last row the cell covers
    pub fn row_end(&self) -> usize {
        self.row + self.row_span
    }

    /// One past the last column the cell covers
    pub fn col_end(&self) -> usize {
        self.col + self.col_span
    }

    pub fn covers(&self, row: usize, col: usize) -> bool {
        (self.row..self.row_end()).contains(&row) && (self.col..self.col_end()).contains(&col)
    }

    pub fn area(&self) -> usize {
        self.row_span * self.col_span
    }
}

/// Ways a table can break the tiling invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TilingViolation {
    /// No cell covers the slot
    Gap { row: usize, col: usize },
    /// More than one cell covers the slot
    Overlap { row: usize, col: usize },
    /// A cell's rectangle leaves the table
    OutOfBounds(CellKey),
    /// A cell starts at a column the table does not declare
    UnknownColumn(CellKey),
    /// A cell has a zero span
    ZeroSpan(CellKey),
}

impl fmt::Display for TilingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gap { row, col } => write!(f, "gap at ({row}, {col})"),
            Self::Overlap { row, col } => write!(f, "overlap at ({row}, {col})"),
            Self::OutOfBounds(key) => write!(f, "cell {key} extends past the table"),
            Self::UnknownColumn(key) => write!(f, "cell {key} starts at an undeclared column"),
            Self::ZeroSpan(key) => write!(f, "cell {key} has a zero span"),
        }
    }
}

/// Ownership grid for one table snapshot
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    rows: usize,
    cols: usize,
    placed: Vec<PlacedCell>,
    /// Row-major index into `placed` of the first cell painted on each slot
    owners: Vec<Option<usize>>,
    coverage: Vec<u32>,
    invalid: Vec<TilingViolation>,
}

impl OccupancyGrid {
    pub fn build(table: &Table) -> Self {
        let rows = table.row_count();
        let cols = table.col_count();
        let mut grid = Self {
            rows,
            cols,
            placed: Vec::with_capacity(table.cell_count()),
            owners: vec![None; rows * cols],
            coverage: vec![0; rows * cols],
            invalid: Vec::new(),
        };

        for (row_index, row) in table.rows.iter().enumerate() {
            for cell in &row.cells {
                let key = CellKey::new(row.id.clone(), cell.col.clone());
                let Some(col_index) = table.col_index(&cell.col) else {
                    grid.invalid.push(TilingViolation::UnknownColumn(key));
                    continue;
                };
                if cell.row_span == 0 || cell.col_span == 0 {
                    grid.invalid.push(TilingViolation::ZeroSpan(key));
                    continue;
                }
                let placed = PlacedCell {
                    key,
                    row: row_index,
                    col: col_index,
                    row_span: cell.row_span,
                    col_span: cell.col_span,
                };
                if placed.row_end() > rows || placed.col_end() > cols {
                    grid.invalid
                        .push(TilingViolation::OutOfBounds(placed.key.clone()));
                }
                grid.paint(&placed, grid.placed.len());
                grid.placed.push(placed);
            }
        }
        grid
    }

    fn paint(&mut self, placed: &PlacedCell, index: usize) {
        for row in placed.row..placed.row_end().min(self.rows) {
            for col in placed.col..placed.col_end().min(self.cols) {
                let slot = row * self.cols + col;
                if let Some(count) = self.coverage.get_mut(slot) {
                    *count += 1;
                }
                if let Some(owner) = self.owners.get_mut(slot) {
                    owner.get_or_insert(index);
                }
            }
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Placed cells in document order
    pub fn placed(&self) -> &[PlacedCell] {
        &self.placed
    }

    pub fn find(&self, key: &CellKey) -> Option<&PlacedCell> {
        self.placed.iter().find(|placed| &placed.key == key)
    }

    /// The cell covering `(row, col)`; the earliest one in document order if
    /// the slot is covered more than once.
    pub fn owner(&self, row: usize, col: usize) -> Option<&PlacedCell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let index = (*self.owners.get(row * self.cols + col)?)?;
        self.placed.get(index)
    }

    pub fn coverage(&self, row: usize, col: usize) -> u32 {
        if row >= self.rows || col >= self.cols {
            return 0;
        }
        self.coverage
            .get(row * self.cols + col)
            .copied()
            .unwrap_or(0)
    }

    /// Number of cells whose origin is in column `col`.
    pub fn column_occupancy(&self, col: usize) -> usize {
        self.placed.iter().filter(|placed| placed.col == col).count()
    }

    /// First tiling violation in row-major order, after cell-level problems.
    pub fn check(&self) -> Result<(), TilingViolation> {
        if let Some(violation) = self.invalid.first() {
            return Err(violation.clone());
        }
        for row in 0..self.rows {
            for col in 0..self.cols {
                match self.coverage(row, col) {
                    0 => return Err(TilingViolation::Gap { row, col }),
                    1 => {}
                    _ => return Err(TilingViolation::Overlap { row, col }),
                }
            }
        }
        Ok(())
    }
}
