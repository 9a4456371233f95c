//! Data models for history tables
//!
//! This module provides data structures for representing table schemas,
//! typed values and rows.

mod table;
mod row;

pub use table::{ColumnType, ColumnDefinition, TableSchema};
pub use row::{Row, Value, KeyTuple};

/// Domain constants for hashing
pub mod domains {
    /// Domain for a table digest
    pub const TABLE: &str = "LEDGERTABLES_TABLE";

    /// Domain for a single row inside a table digest
    pub const ROW: &str = "LEDGERTABLES_ROW";
}
