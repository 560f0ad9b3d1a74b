use serde::{Deserialize, Serialize};

use crate::types::{CellKey, CellStyle, ColId, RowId, TableId};

/// Declares one column, in column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColRecord {
    pub table_id: TableId,
    pub col_id: ColId,
    pub width: f32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub full: bool,
}

/// Structural attributes of the cell a content line belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRecord {
    pub table_id: TableId,
    pub row_id: RowId,
    pub col_id: ColId,
    #[serde(default = "one")]
    pub row_span: usize,
    #[serde(default = "one")]
    pub col_span: usize,
    #[serde(flatten)]
    pub style: CellStyle,
}

fn one() -> usize {
    1
}

impl CellRecord {
    pub fn key(&self) -> CellKey {
        CellKey::new(self.row_id.clone(), self.col_id.clone())
    }
}

/// One content line of a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellLineRecord {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
    pub cell: CellRecord,
}

/// An entry of a table's record stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TableRecord {
    Col(ColRecord),
    CellLine(CellLineRecord),
}

impl TableRecord {
    pub fn table_id(&self) -> &TableId {
        match self {
            Self::Col(col) => &col.table_id,
            Self::CellLine(line) => &line.cell.table_id,
        }
    }
}
