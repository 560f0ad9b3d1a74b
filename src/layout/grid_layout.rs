//! Pre-computed layout data for a table.
//!
//! Edges are computed once per table snapshot, so cell rectangles and hit
//! tests are O(1) and O(log n) lookups.

use std::collections::HashMap;

use crate::config::GridConfig;
use crate::selection::{GeometryProvider, Point, Rect};
use crate::types::{CellKey, OccupancyGrid, PlacedCell, Table};

/// Pre-computed layout data for a table
#[derive(Debug, Clone)]
pub struct GridLayout {
    /// Cumulative column positions (`col_positions[i]` = x of column i's left edge)
    pub col_positions: Vec<f32>,
    /// Cumulative row positions (`row_positions[i]` = y of row i's top edge)
    pub row_positions: Vec<f32>,
    /// Column widths in pixels
    pub col_widths: Vec<f32>,
    /// Row heights in pixels
    pub row_heights: Vec<f32>,
    /// Top-left corner of the table in rendered coordinates
    pub origin: Point,
    grid: OccupancyGrid,
    /// Index into `grid.placed()` by cell key
    index: HashMap<CellKey, usize>,
}

impl GridLayout {
    /// Lay out `table`.
    ///
    /// `available_width` is the width a `full` table stretches to; fixed
    /// tables use their pixel widths and ignore it.
    pub fn new(table: &Table, config: &GridConfig, available_width: f32) -> Self {
        let col_widths: Vec<f32> = table
            .columns
            .iter()
            .map(|column| {
                if table.full {
                    column.width / 100.0 * available_width
                } else {
                    column.width
                }
            })
            .collect();

        let row_heights: Vec<f32> = table
            .rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .filter(|cell| cell.row_span == 1)
                    .filter_map(|cell| cell.style.height)
                    .fold(None, |tallest: Option<f32>, h| {
                        Some(tallest.map_or(h, |t| t.max(h)))
                    })
                    .unwrap_or(config.default_row_height)
            })
            .collect();

        let grid = table.occupancy();
        let index = grid
            .placed()
            .iter()
            .enumerate()
            .map(|(i, placed)| (placed.key.clone(), i))
            .collect();

        GridLayout {
            col_positions: edges(&col_widths),
            row_positions: edges(&row_heights),
            col_widths,
            row_heights,
            origin: Point::default(),
            grid,
            index,
        }
    }

    /// Place the table's top-left corner at `origin`.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn row_count(&self) -> usize {
        self.row_heights.len()
    }

    pub fn col_count(&self) -> usize {
        self.col_widths.len()
    }

    /// Get total width of the table
    pub fn total_width(&self) -> f32 {
        self.col_positions.last().copied().unwrap_or(0.0)
    }

    /// Get total height of the table
    pub fn total_height(&self) -> f32 {
        self.row_positions.last().copied().unwrap_or(0.0)
    }

    fn placed(&self, key: &CellKey) -> Option<&PlacedCell> {
        self.index
            .get(key)
            .and_then(|&i| self.grid.placed().get(i))
    }

    /// Bounds of a cell, spans included, clipped to the table's edges.
    pub fn rect_of(&self, key: &CellKey) -> Option<Rect> {
        let placed = self.placed(key)?;
        let x = *self.col_positions.get(placed.col)?;
        let y = *self.row_positions.get(placed.row)?;
        let right = self.col_edge(placed.col_end());
        let bottom = self.row_edge(placed.row_end());
        Some(Rect::new(
            self.origin.x + x,
            self.origin.y + y,
            right - x,
            bottom - y,
        ))
    }

    fn col_edge(&self, index: usize) -> f32 {
        let last = self.col_positions.len().saturating_sub(1);
        self.col_positions
            .get(index.min(last))
            .copied()
            .unwrap_or(0.0)
    }

    fn row_edge(&self, index: usize) -> f32 {
        let last = self.row_positions.len().saturating_sub(1);
        self.row_positions
            .get(index.min(last))
            .copied()
            .unwrap_or(0.0)
    }

    /// Find row at y position (binary search), `y` relative to the origin
    pub fn row_at_y(&self, y: f32) -> Option<usize> {
        find_band(&self.row_positions, y)
    }

    /// Find column at x position (binary search), `x` relative to the origin
    pub fn col_at_x(&self, x: f32) -> Option<usize> {
        find_band(&self.col_positions, x)
    }

    /// The cell under a point in rendered coordinates.
    pub fn cell_at_point(&self, point: Point) -> Option<CellKey> {
        let row = self.row_at_y(point.y - self.origin.y)?;
        let col = self.col_at_x(point.x - self.origin.x)?;
        self.grid.owner(row, col).map(|placed| placed.key.clone())
    }
}

impl GeometryProvider for GridLayout {
    fn cell_rect(&self, key: &CellKey) -> Option<Rect> {
        self.rect_of(key)
    }

    fn table_rect(&self) -> Option<Rect> {
        (self.row_count() > 0 && self.col_count() > 0).then(|| {
            Rect::new(
                self.origin.x,
                self.origin.y,
                self.total_width(),
                self.total_height(),
            )
        })
    }
}

/// Leading edges of each band plus the final edge.
fn edges(sizes: &[f32]) -> Vec<f32> {
    let mut positions = Vec::with_capacity(sizes.len() + 1);
    let mut at: f32 = 0.0;
    for size in sizes {
        positions.push(at);
        at += size;
    }
    positions.push(at); // Final edge
    positions
}

/// Index of the band containing `at`; `None` outside `[first, last)`.
fn find_band(positions: &[f32], at: f32) -> Option<usize> {
    let end = positions.last().copied()?;
    let start = positions.first().copied()?;
    if at < start || at >= end {
        return None;
    }
    match positions.binary_search_by(|pos| pos.partial_cmp(&at).unwrap_or(std::cmp::Ordering::Equal)) {
        Ok(i) => Some(i),
        Err(i) => Some(i.saturating_sub(1)),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_COL_WIDTH, DEFAULT_ROW_HEIGHT};
    use crate::ops::{create_table, merge_cells};

    fn layout_3x3() -> (Table, GridLayout) {
        let config = GridConfig::default();
        let table = create_table(3, 3, false, &config).unwrap();
        let layout = GridLayout::new(&table, &config, 0.0);
        (table, layout)
    }

    #[test]
    fn test_basic_layout() {
        let (_, layout) = layout_3x3();
        assert_eq!(layout.total_width(), DEFAULT_COL_WIDTH * 3.0);
        assert_eq!(layout.total_height(), DEFAULT_ROW_HEIGHT * 3.0);
    }

    #[test]
    fn test_cell_rect() {
        let (table, layout) = layout_3x3();
        let key = table.cell_at_slot(1, 2).unwrap();
        let rect = layout.rect_of(&key).unwrap();
        assert_eq!(rect.x, DEFAULT_COL_WIDTH * 2.0);
        assert_eq!(rect.y, DEFAULT_ROW_HEIGHT);
        assert_eq!(rect.width, DEFAULT_COL_WIDTH);
        assert_eq!(rect.height, DEFAULT_ROW_HEIGHT);
    }

    #[test]
    fn test_merged_cells() {
        let config = GridConfig::default();
        let mut table = create_table(3, 3, false, &config).unwrap();
        let block: Vec<CellKey> = [(0, 0), (0, 1), (1, 0), (1, 1)]
            .iter()
            .map(|&(r, c)| table.cell_at_slot(r, c).unwrap())
            .collect();
        let origin = merge_cells(&mut table, &block).unwrap();

        let layout = GridLayout::new(&table, &config, 0.0);
        let rect = layout.rect_of(&origin).unwrap();
        assert_eq!(rect.width, DEFAULT_COL_WIDTH * 2.0);
        assert_eq!(rect.height, DEFAULT_ROW_HEIGHT * 2.0);
        assert_eq!(
            layout.cell_at_point(Point::new(150.0, 30.0)),
            Some(origin)
        );
    }

    #[test]
    fn test_full_table_stretches() {
        let config = GridConfig::default();
        let table = create_table(1, 4, true, &config).unwrap();
        let layout = GridLayout::new(&table, &config, 800.0);
        assert_eq!(layout.col_widths, vec![200.0; 4]);
        assert_eq!(layout.total_width(), 800.0);
    }

    #[test]
    fn test_explicit_row_height() {
        let config = GridConfig::default();
        let mut table = create_table(2, 2, false, &config).unwrap();
        let key = table.cell_at_slot(1, 1).unwrap();
        table.cell_mut(&key).unwrap().style.height = Some(60.0);
        let layout = GridLayout::new(&table, &config, 0.0);
        assert_eq!(layout.row_heights, vec![DEFAULT_ROW_HEIGHT, 60.0]);
    }

    #[test]
    fn test_row_at_y() {
        let (_, layout) = layout_3x3();
        assert_eq!(layout.row_at_y(0.0), Some(0));
        assert_eq!(layout.row_at_y(10.0), Some(0));
        assert_eq!(layout.row_at_y(DEFAULT_ROW_HEIGHT), Some(1));
        assert_eq!(layout.row_at_y(DEFAULT_ROW_HEIGHT * 2.5), Some(2));
        assert_eq!(layout.row_at_y(DEFAULT_ROW_HEIGHT * 3.0), None);
        assert_eq!(layout.row_at_y(-1.0), None);
    }

    #[test]
    fn test_col_at_x() {
        let (_, layout) = layout_3x3();
        assert_eq!(layout.col_at_x(0.0), Some(0));
        assert_eq!(layout.col_at_x(32.0), Some(0));
        assert_eq!(layout.col_at_x(DEFAULT_COL_WIDTH), Some(1));
        assert_eq!(layout.col_at_x(DEFAULT_COL_WIDTH * 2.5), Some(2));
    }

    #[test]
    fn test_origin_offsets_geometry() {
        let (table, layout) = layout_3x3();
        let layout = layout.with_origin(Point::new(10.0, 20.0));
        let first = table.cell_at_slot(0, 0).unwrap();
        let rect = layout.cell_rect(&first).unwrap();
        assert_eq!((rect.x, rect.y), (10.0, 20.0));
        assert_eq!(layout.table_rect().unwrap().right(), 310.0);
        assert_eq!(layout.cell_at_point(Point::new(12.0, 22.0)), Some(first));
    }
}
