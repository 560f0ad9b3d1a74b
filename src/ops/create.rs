use crate::config::GridConfig;
use crate::error::{Result, SpanGridError};
use crate::types::{Cell, Column, Row, Table, TableId};

/// Build a `rows` x `cols` table of empty 1x1 cells.
///
/// `full` tables split 100% evenly between their columns; fixed tables give
/// every column the configured default width.
pub fn create_table(rows: usize, cols: usize, full: bool, config: &GridConfig) -> Result<Table> {
    if rows == 0 || cols == 0 {
        return Err(SpanGridError::InvalidArgument(format!(
            "table needs at least one row and column, got {rows}x{cols}"
        )));
    }
    if rows > config.max_rows || cols > config.max_cols {
        return Err(SpanGridError::TableTooLarge {
            rows,
            cols,
            max_rows: config.max_rows,
            max_cols: config.max_cols,
        });
    }

    let width = if full {
        100.0 / cols as f32
    } else {
        config.default_col_width
    };

    let mut table = Table::new(TableId::generate(), full);
    for _ in 0..cols {
        let id = table.fresh_col_id();
        table.columns.push(Column::new(id, width));
    }
    for _ in 0..rows {
        let id = table.fresh_row_id();
        let cells = table.column_ids().cloned().map(Cell::new).collect();
        table.rows.push(Row { id, cells });
    }

    log::debug!("created table {} ({rows}x{cols}, full={full})", table.id);
    Ok(table)
}
