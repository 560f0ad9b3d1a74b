use std::collections::HashSet;

use crate::error::{Result, SpanGridError};
use crate::types::{Cell, CellKey, ColId, Column, ContentLine, Row, Table, TableId};

use super::records::{CellLineRecord, TableRecord};

/// Rebuild one table from its record stream.
///
/// Rows appear in the order their first cell line appears. The result is
/// not balanced: cells may reference undeclared columns or overlap, which
/// the balancer repairs.
pub fn read_table(records: &[TableRecord]) -> Result<Table> {
    let Some(first) = records.first() else {
        return Err(SpanGridError::Records("empty record stream".into()));
    };
    let table_id = first.table_id().clone();
    let full = records
        .iter()
        .find_map(|record| match record {
            TableRecord::Col(col) => Some(col.full),
            TableRecord::CellLine(_) => None,
        })
        .unwrap_or(false);

    let mut table = Table::new(table_id.clone(), full);
    let mut declared: HashSet<ColId> = HashSet::new();
    let mut previous: Option<CellKey> = None;

    for record in records {
        if record.table_id() != &table_id {
            return Err(SpanGridError::Records(format!(
                "record for table {} in the stream of table {table_id}",
                record.table_id()
            )));
        }
        match record {
            TableRecord::Col(col) => {
                if !declared.insert(col.col_id.clone()) {
                    return Err(SpanGridError::Records(format!(
                        "column {} declared twice",
                        col.col_id
                    )));
                }
                table.columns.push(Column::new(col.col_id.clone(), col.width));
                previous = None;
            }
            TableRecord::CellLine(line) => {
                let key = line.cell.key();
                push_line(&mut table, line, previous.as_ref() == Some(&key));
                previous = Some(key);
            }
        }
    }

    log::debug!(
        "read table {table_id}: {} rows, {} columns, {} cells",
        table.row_count(),
        table.col_count(),
        table.cell_count()
    );
    Ok(table)
}

fn push_line(table: &mut Table, line: &CellLineRecord, continues_cell: bool) {
    let content = ContentLine {
        text: line.text.clone(),
        attributes: line.attributes.clone(),
    };
    let key = line.cell.key();

    if table.row(&key.row).is_none() {
        table.rows.push(Row::new(key.row.clone()));
    }
    let Some(row) = table.row_mut(&key.row) else {
        return;
    };

    if let Some(cell) = row.cell_mut(&key.col) {
        if !continues_cell {
            log::warn!("cell {key} is split across the record stream; joining its lines");
        }
        cell.content.push(content);
        return;
    }

    row.cells.push(Cell {
        col: key.col,
        row_span: line.cell.row_span,
        col_span: line.cell.col_span,
        style: line.cell.style.clone(),
        content: vec![content],
    });
}

/// Rebuild every table of a mixed record stream, in first-appearance order.
pub fn read_tables(records: &[TableRecord]) -> Result<Vec<Table>> {
    let mut order: Vec<TableId> = Vec::new();
    for record in records {
        if !order.contains(record.table_id()) {
            order.push(record.table_id().clone());
        }
    }

    order
        .iter()
        .map(|id| {
            let own: Vec<TableRecord> = records
                .iter()
                .filter(|record| record.table_id() == id)
                .cloned()
                .collect();
            read_table(&own)
        })
        .collect()
}
