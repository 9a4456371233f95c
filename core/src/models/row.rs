//! History row representation
//!
//! This module provides the typed values stored in a table and the row that
//! groups a key tuple with its value columns.

use std::fmt::{Display, Formatter, Result as FmtResult};
use serde::{Serialize, Deserialize};

use crate::error::{StoreError, StoreResult};
use super::table::{ColumnDefinition, ColumnType};

/// Value in a row
///
/// Values order by variant first and by content second. The composite-key
/// index relies on this order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Text string
    Text(String),

    /// Integer (32-bit)
    Int32(i32),
}

impl Value {
    /// Get the column type this value belongs to
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Text(_) => ColumnType::String,
            Value::Int32(_) => ColumnType::Int32,
        }
    }

    /// Parse a raw string argument for the given column
    ///
    /// Integer columns accept base-10 `i32` literals only; anything else is
    /// a `ParseError`.
    pub fn parse(column: &ColumnDefinition, raw: &str) -> StoreResult<Value> {
        match column.column_type {
            ColumnType::String => Ok(Value::Text(raw.to_string())),
            ColumnType::Int32 => raw
                .parse::<i32>()
                .map(Value::Int32)
                .map_err(|_| StoreError::ParseError {
                    column: column.name.clone(),
                    value: raw.to_string(),
                }),
        }
    }

    /// Serialize the value to tagged bytes for hashing
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::Text(v) => {
                let mut bytes = Vec::with_capacity(v.len() + 1);
                bytes.push(0x01);
                bytes.extend_from_slice(v.as_bytes());
                bytes
            }
            Value::Int32(v) => {
                let mut bytes = vec![0x02];
                bytes.extend_from_slice(&v.to_be_bytes());
                bytes
            }
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Value::Text(v) => f.write_str(v),
            Value::Int32(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

/// Ordered values of a table's key columns
pub type KeyTuple = Vec<Value>;

/// A row in a history table
///
/// Rows are never updated in place. A new fact is a new row with a different
/// key tuple, typically a fresh timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Values of the key columns, in key order
    pub key: KeyTuple,

    /// Values of the value columns, in declaration order
    pub values: Vec<Value>,
}

impl Row {
    /// Create a new row
    pub fn new(key: KeyTuple, values: Vec<Value>) -> Self {
        Row { key, values }
    }

    /// All fields in column order: key values followed by value values
    pub fn fields(&self) -> impl Iterator<Item = &Value> {
        self.key.iter().chain(self.values.iter())
    }

    /// Whether the key tuple starts with the given prefix
    pub fn matches_prefix(&self, prefix: &[Value]) -> bool {
        self.key.starts_with(prefix)
    }
}
