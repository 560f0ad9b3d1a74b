use super::ids::IdAllocator;
use super::{Cell, CellKey, ColId, ContentLine, OccupancyGrid, RowId, TableId, TilingViolation};

/// A column declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub id: ColId,
    /// Percent of the table width when the table is `full`, pixels otherwise
    pub width: f32,
}

impl Column {
    pub fn new(id: ColId, width: f32) -> Self {
        Self { id, width }
    }
}

/// A row and the cells that physically start in it, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(id: RowId) -> Self {
        Self {
            id,
            cells: Vec::new(),
        }
    }

    pub fn cell(&self, col: &ColId) -> Option<&Cell> {
        self.cells.iter().find(|cell| &cell.col == col)
    }

    pub fn cell_mut(&mut self, col: &ColId) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|cell| &cell.col == col)
    }
}

/// Table entity graph.
///
/// Row and column order live in the two vectors; everything else refers to
/// rows, columns and cells by id. The mutators here do not maintain the
/// tiling invariant: structural operations and the balancer do.
#[derive(Debug, Clone)]
pub struct Table {
    pub id: TableId,
    /// Column widths are percentages of the table width
    pub full: bool,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    ids: IdAllocator,
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.full == other.full
            && self.columns == other.columns
            && self.rows == other.rows
    }
}

impl Table {
    pub fn new(id: TableId, full: bool) -> Self {
        Self {
            id,
            full,
            columns: Vec::new(),
            rows: Vec::new(),
            ids: IdAllocator::default(),
        }
    }

    // ---- Read queries ----

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    /// True once the last row or column is gone
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn column_ids(&self) -> impl Iterator<Item = &ColId> {
        self.columns.iter().map(|col| &col.id)
    }

    pub fn row_ids(&self) -> impl Iterator<Item = &RowId> {
        self.rows.iter().map(|row| &row.id)
    }

    pub fn col_id_at(&self, index: usize) -> Option<&ColId> {
        self.columns.get(index).map(|col| &col.id)
    }

    pub fn col_index(&self, id: &ColId) -> Option<usize> {
        self.columns.iter().position(|col| &col.id == id)
    }

    pub fn row_index(&self, id: &RowId) -> Option<usize> {
        self.rows.iter().position(|row| &row.id == id)
    }

    pub fn column(&self, id: &ColId) -> Option<&Column> {
        self.columns.iter().find(|col| &col.id == id)
    }

    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.rows.iter().find(|row| &row.id == id)
    }

    pub fn row_mut(&mut self, id: &RowId) -> Option<&mut Row> {
        self.rows.iter_mut().find(|row| &row.id == id)
    }

    pub fn cell(&self, key: &CellKey) -> Option<&Cell> {
        self.row(&key.row)?.cell(&key.col)
    }

    pub fn cell_mut(&mut self, key: &CellKey) -> Option<&mut Cell> {
        self.row_mut(&key.row)?.cell_mut(&key.col)
    }

    pub fn contains(&self, key: &CellKey) -> bool {
        self.cell(key).is_some()
    }

    /// Column index of the cell's origin column.
    pub fn cell_col_index(&self, key: &CellKey) -> Option<usize> {
        self.cell(key)?;
        self.col_index(&key.col)
    }

    /// Cells in document order: rows top to bottom, each row left to right.
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &Cell)> {
        self.rows.iter().flat_map(|row| {
            row.cells
                .iter()
                .map(move |cell| (CellKey::new(row.id.clone(), cell.col.clone()), cell))
        })
    }

    pub fn cell_keys(&self) -> Vec<CellKey> {
        self.cells().map(|(key, _)| key).collect()
    }

    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|row| row.cells.len()).sum()
    }

    /// Key of the cell whose rectangle covers grid slot `(row, col)`.
    pub fn cell_at_slot(&self, row: usize, col: usize) -> Option<CellKey> {
        self.occupancy().owner(row, col).map(|placed| placed.key.clone())
    }

    /// Snapshot of slot ownership. Operations that look up many slots take
    /// one snapshot and work from it.
    pub fn occupancy(&self) -> OccupancyGrid {
        OccupancyGrid::build(self)
    }

    /// First violation of the tiling invariant, if any.
    pub fn check_tiling(&self) -> Result<(), TilingViolation> {
        self.occupancy().check()
    }

    pub fn total_width(&self) -> f32 {
        self.columns.iter().map(|col| col.width).sum()
    }

    // ---- Identity ----

    pub fn fresh_row_id(&mut self) -> RowId {
        let rows = &self.rows;
        self.ids.next_row(|id| rows.iter().any(|row| &row.id == id))
    }

    pub fn fresh_col_id(&mut self) -> ColId {
        let columns = &self.columns;
        self.ids.next_col(|id| columns.iter().any(|col| &col.id == id))
    }

    // ---- Low-level mutators ----

    pub fn insert_column(&mut self, index: usize, column: Column) {
        let index = index.min(self.columns.len());
        self.columns.insert(index, column);
    }

    pub fn remove_column(&mut self, index: usize) -> Option<Column> {
        (index < self.columns.len()).then(|| self.columns.remove(index))
    }

    pub fn insert_row(&mut self, index: usize, row: Row) {
        let index = index.min(self.rows.len());
        self.rows.insert(index, row);
    }

    pub fn remove_row(&mut self, index: usize) -> Option<Row> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    /// Position within `row_index` at which a cell starting at column
    /// `col_index` keeps the row in column order.
    pub fn cell_insert_position(&self, row_index: usize, col_index: usize) -> usize {
        let Some(row) = self.rows.get(row_index) else {
            return 0;
        };
        row.cells
            .iter()
            .take_while(|cell| {
                self.col_index(&cell.col)
                    .is_some_and(|index| index < col_index)
            })
            .count()
    }

    /// Insert `cell` into the row at `row_index`, keeping column order.
    pub fn insert_cell(&mut self, row_index: usize, cell: Cell) -> Option<CellKey> {
        let col_index = self.col_index(&cell.col).unwrap_or(usize::MAX);
        let position = self.cell_insert_position(row_index, col_index);
        let row = self.rows.get_mut(row_index)?;
        let key = CellKey::new(row.id.clone(), cell.col.clone());
        row.cells.insert(position, cell);
        Some(key)
    }

    pub fn remove_cell(&mut self, key: &CellKey) -> Option<Cell> {
        let row = self.row_mut(&key.row)?;
        let position = row.cells.iter().position(|cell| cell.col == key.col)?;
        Some(row.cells.remove(position))
    }

    pub fn set_spans(&mut self, key: &CellKey, row_span: usize, col_span: usize) -> bool {
        match self.cell_mut(key) {
            Some(cell) => {
                cell.row_span = row_span;
                cell.col_span = col_span;
                true
            }
            None => false,
        }
    }

    /// Append lines to the end of a cell's content.
    pub fn append_content(&mut self, key: &CellKey, lines: Vec<ContentLine>) -> bool {
        match self.cell_mut(key) {
            Some(cell) => {
                cell.content.extend(lines);
                true
            }
            None => false,
        }
    }

    /// Move every content line of `from` to the end of `to`, leaving `from`
    /// without content.
    pub fn relocate_content(&mut self, from: &CellKey, to: &CellKey) -> bool {
        if from == to || !self.contains(to) {
            return false;
        }
        let Some(lines) = self.cell_mut(from).map(|cell| std::mem::take(&mut cell.content)) else {
            return false;
        };
        self.append_content(to, lines)
    }

    /// Drop every content line of a cell, as a deleting edit would.
    pub fn clear_content(&mut self, key: &CellKey) -> bool {
        match self.cell_mut(key) {
            Some(cell) => {
                cell.content.clear();
                true
            }
            None => false,
        }
    }
}
