//! Operation record codec.
//!
//! The surrounding document stores a table as a flat stream of records: one
//! per column, then one per content line of every cell. Consecutive lines
//! with the same cell key belong to the same cell.

mod reader;
mod records;
mod writer;

pub use reader::{read_table, read_tables};
pub use records::{CellLineRecord, CellRecord, ColRecord, TableRecord};
pub use writer::write_records;

use crate::error::Result;
use crate::types::Table;

/// Serialize a table's record stream to a JSON array.
pub fn to_json(table: &Table) -> Result<String> {
    Ok(serde_json::to_string(&write_records(table))?)
}

/// Rebuild a single table from a JSON record array.
pub fn from_json(json: &str) -> Result<Table> {
    let records: Vec<TableRecord> = serde_json::from_str(json)?;
    read_table(&records)
}
