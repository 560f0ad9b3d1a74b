use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identity of a table within the enclosing document
    TableId
);
string_id!(
    /// Stable row identity; never derived from the row's position
    RowId
);
string_id!(
    /// Stable column identity; never derived from the column's position
    ColId
);

impl TableId {
    /// Generate a fresh, document-unique table id.
    pub fn generate() -> Self {
        Self(format!("table-{}", uuid::Uuid::new_v4().simple()))
    }
}

/// Identity of a cell: the row it originates in and the column it starts at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellKey {
    pub row: RowId,
    pub col: ColId,
}

impl CellKey {
    pub fn new(row: RowId, col: ColId) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.row, self.col)
    }
}

/// Per-table id source.
///
/// Sequence numbers only move forward, so an id is never handed out twice in
/// one editing session even after the row or column carrying it is deleted.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdAllocator {
    next_row: u64,
    next_col: u64,
}

impl IdAllocator {
    pub(crate) fn next_row(&mut self, taken: impl Fn(&RowId) -> bool) -> RowId {
        loop {
            self.next_row += 1;
            let id = RowId(format!("row-{}", self.next_row));
            if !taken(&id) {
                return id;
            }
        }
    }

    pub(crate) fn next_col(&mut self, taken: impl Fn(&ColId) -> bool) -> ColId {
        loop {
            self.next_col += 1;
            let id = ColId(format!("col-{}", self.next_col));
            if !taken(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_skips_taken_ids() {
        let mut ids = IdAllocator::default();
        let taken = [RowId::from("row-1"), RowId::from("row-2")];
        let id = ids.next_row(|id| taken.contains(id));
        assert_eq!(id.as_str(), "row-3");
        assert_eq!(ids.next_row(|_| false).as_str(), "row-4");
        assert_eq!(ids.next_col(|_| false).as_str(), "col-1");
    }

    #[test]
    fn test_generated_table_ids_differ() {
        assert_ne!(TableId::generate(), TableId::generate());
        assert!(TableId::generate().as_str().starts_with("table-"));
    }

    #[test]
    fn test_cell_key_serializes_camel_case() {
        let key = CellKey::new(RowId::from("r"), ColId::from("c"));
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"row":"r","col":"c"}"#);
    }
}
