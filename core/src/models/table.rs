//! Table schema representation
//!
//! A table is an ordered list of typed columns. The leading contiguous run of
//! columns flagged `key` forms the composite key; the remaining columns hold
//! the row's values and are addressed by position.

use serde::{Serialize, Deserialize};

use crate::error::{StoreError, StoreResult};
use super::row::{KeyTuple, Row, Value};

/// Type of column in a table schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Text string, stored verbatim
    String,

    /// Integer (32-bit)
    Int32,
}

/// Definition of a column in a table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Name of the column
    pub name: String,

    /// Type of the column
    pub column_type: ColumnType,

    /// Whether the column is part of the composite key
    pub key: bool,
}

impl ColumnDefinition {
    /// Create a key column
    pub fn key(name: impl Into<String>, column_type: ColumnType) -> Self {
        ColumnDefinition {
            name: name.into(),
            column_type,
            key: true,
        }
    }

    /// Create a value column
    pub fn value(name: impl Into<String>, column_type: ColumnType) -> Self {
        ColumnDefinition {
            name: name.into(),
            column_type,
            key: false,
        }
    }

    fn check(&self, value: &Value) -> StoreResult<()> {
        if value.column_type() != self.column_type {
            return Err(StoreError::TypeMismatch {
                column: self.name.clone(),
                expected: self.column_type,
                actual: value.column_type(),
            });
        }
        Ok(())
    }
}

/// Schema of a history table
///
/// Schemas are checked once when registered (see
/// [`SchemaValidator`](crate::schema::SchemaValidator)); the accessors below
/// assume the key columns form a leading prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Name of the table
    pub name: String,

    /// Columns in declaration order, key columns first
    pub columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    /// Create a new table schema
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDefinition>) -> Self {
        TableSchema {
            name: name.into(),
            columns,
        }
    }

    /// Number of key columns
    pub fn key_len(&self) -> usize {
        self.columns.iter().take_while(|col| col.key).count()
    }

    /// Number of value columns
    pub fn value_len(&self) -> usize {
        self.columns.len() - self.key_len()
    }

    /// The key columns, in key order
    pub fn key_columns(&self) -> &[ColumnDefinition] {
        &self.columns[..self.key_len()]
    }

    /// The value columns, in declaration order
    pub fn value_columns(&self) -> &[ColumnDefinition] {
        &self.columns[self.key_len()..]
    }

    /// Get a column by name
    pub fn get_column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|col| col.name == name)
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.name.clone()).collect()
    }

    /// Check that a row matches the schema's arity and column types
    pub fn check_row(&self, row: &Row) -> StoreResult<()> {
        if row.key.len() != self.key_len() {
            return Err(StoreError::ArityMismatch {
                table: self.name.clone(),
                section: "key",
                expected: self.key_len(),
                actual: row.key.len(),
            });
        }
        self.check_key(&row.key)?;

        let value_columns = self.value_columns();
        if row.values.len() != value_columns.len() {
            return Err(StoreError::ArityMismatch {
                table: self.name.clone(),
                section: "value",
                expected: value_columns.len(),
                actual: row.values.len(),
            });
        }
        for (column, value) in value_columns.iter().zip(&row.values) {
            column.check(value)?;
        }
        Ok(())
    }

    /// Check a complete key tuple, as required by exact-key operations
    pub fn check_key(&self, key: &[Value]) -> StoreResult<()> {
        let key_columns = self.key_columns();
        if key.len() != key_columns.len() {
            return Err(StoreError::InvalidKeyLength {
                table: self.name.clone(),
                expected: key_columns.len(),
                actual: key.len(),
            });
        }
        for (column, value) in key_columns.iter().zip(key) {
            column.check(value)?;
        }
        Ok(())
    }

    /// Check a key prefix of length 1 through `key_len()`
    pub fn check_prefix(&self, prefix: &[Value]) -> StoreResult<()> {
        let key_columns = self.key_columns();
        if prefix.is_empty() || prefix.len() > key_columns.len() {
            return Err(StoreError::InvalidPrefixLength {
                table: self.name.clone(),
                len: prefix.len(),
                max: key_columns.len(),
            });
        }
        for (column, value) in key_columns.iter().zip(prefix) {
            column.check(value)?;
        }
        Ok(())
    }

    /// Parse one string argument per column into a row
    pub fn parse_row(&self, args: &[&str]) -> StoreResult<Row> {
        if args.len() != self.columns.len() {
            return Err(StoreError::ArityMismatch {
                table: self.name.clone(),
                section: "column",
                expected: self.columns.len(),
                actual: args.len(),
            });
        }

        let key_len = self.key_len();
        let mut fields = self
            .columns
            .iter()
            .zip(args)
            .map(|(column, raw)| Value::parse(column, raw))
            .collect::<StoreResult<Vec<_>>>()?;
        let values = fields.split_off(key_len);

        Ok(Row::new(fields, values))
    }

    /// Parse leading key columns from string arguments
    ///
    /// Accepts any length up to `key_len()`; callers decide whether they need
    /// the full key or a prefix.
    pub fn parse_key(&self, args: &[&str]) -> StoreResult<KeyTuple> {
        let key_columns = self.key_columns();
        if args.len() > key_columns.len() {
            return Err(StoreError::InvalidKeyLength {
                table: self.name.clone(),
                expected: key_columns.len(),
                actual: args.len(),
            });
        }
        key_columns
            .iter()
            .zip(args)
            .map(|(column, raw)| Value::parse(column, raw))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helper to create the inventory history schema
    fn inventory_schema() -> TableSchema {
        TableSchema::new(
            "InventoryHistory",
            vec![
                ColumnDefinition::key("ItemId", ColumnType::String),
                ColumnDefinition::key("OrgCode", ColumnType::String),
                ColumnDefinition::key("CreateTS", ColumnType::String),
                ColumnDefinition::value("Qty", ColumnType::Int32),
            ],
        )
    }

    #[test]
    fn test_key_and_value_columns() {
        let schema = inventory_schema();

        assert_eq!(schema.key_len(), 3);
        assert_eq!(schema.value_len(), 1);
        assert_eq!(schema.key_columns()[2].name, "CreateTS");
        assert_eq!(schema.value_columns()[0].name, "Qty");
        assert_eq!(schema.column_names(), vec!["ItemId", "OrgCode", "CreateTS", "Qty"]);
        assert!(schema.get_column("Qty").is_some());
        assert!(schema.get_column("Price").is_none());
    }

    #[test]
    fn test_parse_row() {
        let schema = inventory_schema();

        let row = schema.parse_row(&["A1", "O1", "20240101000000", "5"]).unwrap();
        assert_eq!(row.key, vec![
            Value::Text("A1".to_string()),
            Value::Text("O1".to_string()),
            Value::Text("20240101000000".to_string()),
        ]);
        assert_eq!(row.values, vec![Value::Int32(5)]);
    }

    #[test]
    fn test_parse_row_rejects_bad_integer() {
        let schema = inventory_schema();

        let err = schema.parse_row(&["A1", "O1", "20240101000000", "five"]).unwrap_err();
        assert_eq!(err, StoreError::ParseError {
            column: "Qty".to_string(),
            value: "five".to_string(),
        });

        // Values outside the i32 range are rejected rather than truncated
        let err = schema.parse_row(&["A1", "O1", "20240101000000", "4294967296"]).unwrap_err();
        assert!(matches!(err, StoreError::ParseError { .. }));
    }

    #[test]
    fn test_parse_row_arity() {
        let schema = inventory_schema();

        let err = schema.parse_row(&["A1", "O1", "5"]).unwrap_err();
        assert!(matches!(err, StoreError::ArityMismatch { expected: 4, actual: 3, .. }));
    }

    #[test]
    fn test_check_row_types() {
        let schema = inventory_schema();

        let row = Row::new(
            vec![
                Value::Text("A1".to_string()),
                Value::Text("O1".to_string()),
                Value::Text("20240101000000".to_string()),
            ],
            vec![Value::Text("5".to_string())],
        );
        let err = schema.check_row(&row).unwrap_err();
        assert_eq!(err, StoreError::TypeMismatch {
            column: "Qty".to_string(),
            expected: ColumnType::Int32,
            actual: ColumnType::String,
        });
    }

    #[test]
    fn test_check_row_arity() {
        let schema = inventory_schema();

        let short_key = Row::new(vec![Value::from("A1")], vec![Value::from(5)]);
        assert!(matches!(
            schema.check_row(&short_key),
            Err(StoreError::ArityMismatch { section: "key", expected: 3, actual: 1, .. })
        ));

        let no_values = Row::new(
            vec![Value::from("A1"), Value::from("O1"), Value::from("1")],
            vec![],
        );
        assert!(matches!(
            schema.check_row(&no_values),
            Err(StoreError::ArityMismatch { section: "value", expected: 1, actual: 0, .. })
        ));
    }

    #[test]
    fn test_check_prefix_bounds() {
        let schema = inventory_schema();
        let item = Value::Text("A1".to_string());

        assert!(schema.check_prefix(&[item.clone()]).is_ok());
        assert!(matches!(
            schema.check_prefix(&[]),
            Err(StoreError::InvalidPrefixLength { len: 0, max: 3, .. })
        ));

        let too_long = vec![item.clone(), item.clone(), item.clone(), item];
        assert!(matches!(
            schema.check_prefix(&too_long),
            Err(StoreError::InvalidPrefixLength { len: 4, max: 3, .. })
        ));
    }

    #[test]
    fn test_parse_key() {
        let schema = inventory_schema();

        let prefix = schema.parse_key(&["A1", "O1"]).unwrap();
        assert_eq!(prefix.len(), 2);

        let err = schema.parse_key(&["A1", "O1", "TS", "extra"]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidKeyLength { expected: 3, actual: 4, .. }));
    }
}
