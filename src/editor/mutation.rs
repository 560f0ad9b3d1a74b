//! Document mutations reported by the host.
//!
//! The surrounding document is edited by operations that know nothing about
//! tables. The host forwards a summary of each change so the editor can tell
//! structural drift (which needs a balancer pass) from plain typing.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpanGridError};
use crate::types::{CellKey, ContentLine, Table};

/// Attributes whose change can break the tiling
const STRUCTURAL_ATTRIBUTES: &[&str] = &["rowspan", "colspan", "row-id", "col-id", "width"];

/// A change observed in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MutationEvent {
    /// Rows, cells or content lines were added, removed or moved
    ChildList,
    /// An attribute of a table node changed
    Attribute { name: String },
    /// Text inside a content line changed
    Text,
}

impl MutationEvent {
    /// Whether the change can leave the grid untiled.
    pub fn is_structural(&self) -> bool {
        match self {
            Self::ChildList => true,
            Self::Attribute { name } => STRUCTURAL_ATTRIBUTES
                .iter()
                .any(|attr| name.eq_ignore_ascii_case(attr)),
            Self::Text => false,
        }
    }
}

/// Replace a cell's content with `text`, one content line per `\n`.
///
/// Empty text leaves a single empty line so the cell is not pruned.
pub(crate) fn apply_cell_text(table: &mut Table, key: &CellKey, text: &str) -> Result<()> {
    let cell = table
        .cell_mut(key)
        .ok_or_else(|| SpanGridError::UnknownCell(key.clone()))?;
    cell.content = text.split('\n').map(ContentLine::new).collect();
    Ok(())
}
