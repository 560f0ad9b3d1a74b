use crate::types::Table;

use super::records::{CellLineRecord, CellRecord, ColRecord, TableRecord};

/// Flatten a table into its record stream.
///
/// Columns come first in column order, then every content line of every
/// cell in document order. A cell without content lines has no records.
pub fn write_records(table: &Table) -> Vec<TableRecord> {
    let mut records = Vec::with_capacity(table.col_count() + table.cell_count());
    records.extend(table.columns.iter().map(|column| {
        TableRecord::Col(ColRecord {
            table_id: table.id.clone(),
            col_id: column.id.clone(),
            width: column.width,
            full: table.full,
        })
    }));

    for (key, cell) in table.cells() {
        let header = CellRecord {
            table_id: table.id.clone(),
            row_id: key.row,
            col_id: key.col,
            row_span: cell.row_span,
            col_span: cell.col_span,
            style: cell.style.clone(),
        };
        records.extend(cell.content.iter().map(|line| {
            TableRecord::CellLine(CellLineRecord {
                text: line.text.clone(),
                attributes: line.attributes.clone(),
                cell: header.clone(),
            })
        }));
    }
    records
}
