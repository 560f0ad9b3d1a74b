//! Grid model: tables, columns, rows, cells and their identities.

mod cell;
mod ids;
mod occupancy;
mod table;

pub use cell::*;
pub use ids::{CellKey, ColId, RowId, TableId};
pub use occupancy::*;
pub use table::*;
