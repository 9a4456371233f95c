//! # Ledger Tables Core
//!
//! Append-only history tables keyed by composite keys.
//! This crate provides the schema registry, the composite-key index, the
//! mutation engine and the query formatter. Storage durability and
//! transaction ordering belong to the hosting ledger.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod format;
pub mod index;
pub mod models;
pub mod schema;
pub mod store;

/// Re-export common types for ease of use
pub use config::StoreConfig;
pub use error::{CoreError, Result, SchemaError, StoreError};
pub use format::{format, HistoryFormatter, QueryResult};
pub use index::PrefixScan;
pub use models::{ColumnDefinition, ColumnType, KeyTuple, Row, TableSchema, Value};
pub use store::{StoreContext, UnitOfWork};

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hex digest of a table, as printed by tooling
///
/// # Arguments
///
/// * `store` - Store holding the table
/// * `table` - Table name
///
/// # Returns
///
/// The 64-character lowercase hex encoding of the table digest
pub fn table_digest_hex(store: &StoreContext, table: &str) -> Result<String> {
    Ok(crypto::digest_hex(&store.digest(table)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_hex_tracks_mutations() {
        let schema = TableSchema::new(
            "PriceListHistory",
            vec![
                ColumnDefinition::key("ItemId", ColumnType::String),
                ColumnDefinition::value("Price", ColumnType::Int32),
            ],
        );
        let store = StoreContext::new(StoreConfig::testing().with_table(schema)).unwrap();

        let before = table_digest_hex(&store, "PriceListHistory").unwrap();
        store.insert_raw("PriceListHistory", &["A1", "100"]).unwrap();
        let after = table_digest_hex(&store, "PriceListHistory").unwrap();

        assert_eq!(before.len(), 64);
        assert_ne!(before, after);
        assert!(table_digest_hex(&store, "Missing").is_err());
    }
}
