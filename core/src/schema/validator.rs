//! Schema validation
//!
//! This module checks table definitions before they are registered.

use std::collections::HashSet;

use crate::error::{SchemaError, SchemaResult};
use crate::models::TableSchema;

/// Schema validator
#[derive(Debug, Clone)]
pub struct SchemaValidator;

impl SchemaValidator {
    /// Validate a table schema
    ///
    /// A valid schema has a non-empty name, uniquely and non-emptily named
    /// columns, and at least one key column. All key columns come before the
    /// first value column.
    pub fn validate_table(table: &TableSchema) -> SchemaResult<()> {
        let invalid = |reason: String| SchemaError::InvalidSchema {
            table: table.name.clone(),
            reason,
        };

        if table.name.trim().is_empty() {
            return Err(invalid("table name is empty".to_string()));
        }

        // Check for empty and duplicate column names
        let mut column_names = HashSet::new();
        for column in &table.columns {
            if column.name.trim().is_empty() {
                return Err(invalid("column name is empty".to_string()));
            }
            if !column_names.insert(column.name.as_str()) {
                return Err(invalid(format!("duplicate column {}", column.name)));
            }
        }

        // Check for key columns
        if !table.columns.iter().any(|col| col.key) {
            return Err(invalid("no column is marked key".to_string()));
        }

        // Key columns must be a leading contiguous prefix
        if let Some(stray) = table.columns[table.key_len()..].iter().find(|col| col.key) {
            return Err(invalid(format!(
                "key column {} follows a value column",
                stray.name
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnDefinition, ColumnType};
    use rstest::rstest;

    fn key(name: &str) -> ColumnDefinition {
        ColumnDefinition::key(name, ColumnType::String)
    }

    fn value(name: &str) -> ColumnDefinition {
        ColumnDefinition::value(name, ColumnType::Int32)
    }

    #[test]
    fn test_valid_schemas() {
        let history = TableSchema::new(
            "InventoryHistory",
            vec![key("ItemId"), key("OrgCode"), key("CreateTS"), value("Qty")],
        );
        assert!(SchemaValidator::validate_table(&history).is_ok());

        // Key-only tables are allowed
        let keys_only = TableSchema::new("Keys", vec![key("ItemId")]);
        assert!(SchemaValidator::validate_table(&keys_only).is_ok());
    }

    #[rstest]
    #[case::no_key(vec![value("Qty")], "no column is marked key")]
    #[case::no_columns(vec![], "no column is marked key")]
    #[case::key_after_value(vec![key("ItemId"), value("Qty"), key("CreateTS")], "key column CreateTS follows a value column")]
    #[case::leading_value(vec![value("Qty"), key("ItemId")], "key column ItemId follows a value column")]
    #[case::duplicate(vec![key("ItemId"), key("ItemId")], "duplicate column ItemId")]
    #[case::empty_column(vec![key("")], "column name is empty")]
    fn test_invalid_schemas(#[case] columns: Vec<ColumnDefinition>, #[case] reason: &str) {
        let schema = TableSchema::new("Broken", columns);

        let err = SchemaValidator::validate_table(&schema).unwrap_err();
        assert_eq!(err, SchemaError::InvalidSchema {
            table: "Broken".to_string(),
            reason: reason.to_string(),
        });
    }

    #[test]
    fn test_empty_table_name() {
        let schema = TableSchema::new(" ", vec![key("ItemId")]);
        assert!(matches!(
            SchemaValidator::validate_table(&schema),
            Err(SchemaError::InvalidSchema { .. })
        ));
    }
}
