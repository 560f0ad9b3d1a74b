//! Rectangle selection.
//!
//! Maps a mouse-drag rectangle to the cells it touches. A spanned cell can
//! stick out of the drag rectangle; once any part of it is hit, the query
//! grows to include all of it, which can pull in further cells. The search
//! repeats until a full scan adds nothing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{CellKey, Table};

/// A point in the table's rendered coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounding rectangle of two corner points, in any order.
    pub fn from_points(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Overlap of two rectangles; touching edges count as a zero-size overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (right >= x && bottom >= y).then(|| Rect::new(x, y, right - x, bottom - y))
    }

    /// Shrink each side by up to `by`, never past the centre.
    pub fn inset(&self, by: f32) -> Rect {
        let dx = by.max(0.0).min(self.width / 2.0);
        let dy = by.max(0.0).min(self.height / 2.0);
        Rect::new(
            self.x + dx,
            self.y + dy,
            self.width - 2.0 * dx,
            self.height - 2.0 * dy,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// Bounding boxes supplied by whoever renders the table.
pub trait GeometryProvider {
    /// Rendered bounds of a cell; `None` when the cell is not laid out.
    fn cell_rect(&self, key: &CellKey) -> Option<Rect>;

    /// Rendered bounds of the whole table, if known.
    fn table_rect(&self) -> Option<Rect>;
}

/// One measured cell, as reported by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellGeometry {
    pub key: CellKey,
    pub rect: Rect,
}

/// Geometry measured by the host (e.g. from the DOM) and passed in whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasuredGeometry {
    pub cells: Vec<CellGeometry>,
    pub table: Option<Rect>,
}

impl MeasuredGeometry {
    pub fn new(table: Option<Rect>) -> Self {
        Self {
            cells: Vec::new(),
            table,
        }
    }

    pub fn with_cell(mut self, key: CellKey, rect: Rect) -> Self {
        self.cells.push(CellGeometry { key, rect });
        self
    }
}

impl GeometryProvider for MeasuredGeometry {
    fn cell_rect(&self, key: &CellKey) -> Option<Rect> {
        self.cells
            .iter()
            .find(|cell| &cell.key == key)
            .map(|cell| cell.rect)
    }

    fn table_rect(&self) -> Option<Rect> {
        self.table
    }
}

/// Bounding boxes looked up during one resolution call.
type GeometryMemo = HashMap<CellKey, Option<Rect>>;

fn cached_rect<G>(memo: &mut GeometryMemo, geometry: &G, key: &CellKey) -> Option<Rect>
where
    G: GeometryProvider + ?Sized,
{
    *memo
        .entry(key.clone())
        .or_insert_with(|| geometry.cell_rect(key))
}

/// Does `cell`, shaved by `tolerance` on every side, touch `query`?
fn hits(cell: &Rect, query: &Rect, tolerance: f32) -> bool {
    cell.inset(tolerance).intersection(query).is_some()
}

/// Cells touched by the drag from `start` to `end`, in document order.
///
/// The drag rectangle is clipped to the table's bounds when the geometry
/// provider knows them. Cells without geometry never match.
pub fn resolve_selection<G>(
    table: &Table,
    geometry: &G,
    start: Point,
    end: Point,
    tolerance: f32,
) -> Vec<CellKey>
where
    G: GeometryProvider + ?Sized,
{
    let mut query = Rect::from_points(start, end);
    if let Some(bounds) = geometry.table_rect() {
        match query.intersection(&bounds) {
            Some(clipped) => query = clipped,
            None => return Vec::new(),
        }
    }

    let keys = table.cell_keys();
    let mut selected = vec![false; keys.len()];
    let mut memo = GeometryMemo::with_capacity(keys.len());

    loop {
        let mut grew = false;
        for (key, chosen) in keys.iter().zip(selected.iter_mut()) {
            if *chosen {
                continue;
            }
            let Some(rect) = cached_rect(&mut memo, geometry, key) else {
                continue;
            };
            if hits(&rect, &query, tolerance) {
                *chosen = true;
                query = query.union(&rect);
                grew = true;
            }
        }
        if !grew {
            break;
        }
    }

    keys.into_iter()
        .zip(selected)
        .filter_map(|(key, chosen)| chosen.then_some(key))
        .collect()
}
