//! Error types for the core crate
//!
//! Schema definition and row mutation each have their own error enum so that
//! callers can match on the precise failure. `CoreError` consolidates both
//! together with the I/O and serialization failures of config files and
//! checkpoints.

use thiserror::Error;
use std::io;

use crate::models::ColumnType;

/// Errors raised while defining a table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A table with the same name is already registered
    #[error("Table {0} already exists")]
    DuplicateTable(String),

    /// The column list violates a schema rule
    #[error("Invalid schema for table {table}: {reason}")]
    InvalidSchema {
        /// Table being defined
        table: String,
        /// Human-readable rule that was violated
        reason: String,
    },
}

/// Errors raised by row mutations and queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A row with an identical key tuple already exists
    #[error("The record already exists in table {table}")]
    DuplicateKey {
        /// Table the insert targeted
        table: String,
    },

    /// No row has the requested key tuple
    #[error("No record with the given key exists in table {table}")]
    NotFound {
        /// Table the delete targeted
        table: String,
    },

    /// Prefix queries need between one and all of the key columns
    #[error("Invalid key prefix length {len} for table {table}: expected 1..={max}")]
    InvalidPrefixLength {
        /// Table being queried
        table: String,
        /// Supplied prefix length
        len: usize,
        /// Number of key columns in the table
        max: usize,
    },

    /// A string supplied for an integer column is not a valid `i32`
    #[error("Column {column} expects a 32-bit integer, got {value:?}")]
    ParseError {
        /// Column the value was destined for
        column: String,
        /// The raw input
        value: String,
    },

    /// The named table was never defined
    #[error("Table {0} does not exist")]
    UnknownTable(String),

    /// A value does not have its column's declared type
    #[error("Column {column} expects {expected:?}, got {actual:?}")]
    TypeMismatch {
        /// Column name
        column: String,
        /// Declared type
        expected: ColumnType,
        /// Supplied type
        actual: ColumnType,
    },

    /// A row has the wrong number of key or value fields
    #[error("Table {table} expects {expected} {section} values, got {actual}")]
    ArityMismatch {
        /// Table name
        table: String,
        /// Either "key" or "value"
        section: &'static str,
        /// Declared number of columns
        expected: usize,
        /// Supplied number of values
        actual: usize,
    },

    /// Exact-key operations need a value for every key column
    #[error("Table {table} expects a key of {expected} values, got {actual}")]
    InvalidKeyLength {
        /// Table name
        table: String,
        /// Number of key columns
        expected: usize,
        /// Supplied tuple length
        actual: usize,
    },

    /// Schema definition failed
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A thread panicked while holding the store lock
    #[error("Store state poisoned: {0}")]
    Poisoned(String),
}

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Row mutation or query error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Schema definition error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Bincode error
    #[error("Bincode error: {0}")]
    BincodeError(#[from] bincode::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Checkpoint contents are inconsistent
    #[error("Checkpoint error: {0}")]
    CheckpointError(String),
}

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, CoreError>;

/// Result type for schema definition
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Result type for row mutations and queries
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Convert a lock poisoning error into a StoreError
pub fn to_poisoned_error<E: std::fmt::Display>(err: E) -> StoreError {
    StoreError::Poisoned(err.to_string())
}
