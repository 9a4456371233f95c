//! Schema registry
//!
//! Tables are defined once by name and never altered or dropped afterwards.
//! The registry owns every schema known to a store.

mod validator;

pub use validator::SchemaValidator;

use std::collections::BTreeMap;
use log::info;

use crate::error::{SchemaError, SchemaResult};
use crate::models::TableSchema;

/// Write-once catalog of table schemas
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    /// Tables by name
    tables: BTreeMap<String, TableSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new table
    pub fn define_table(&mut self, schema: TableSchema) -> SchemaResult<()> {
        self.check_definable(&schema)?;

        info!(
            "Defined table {} ({} key columns, {} value columns)",
            schema.name,
            schema.key_len(),
            schema.value_len()
        );
        self.tables.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Register several tables, either all of them or none
    pub fn define_tables(&mut self, schemas: Vec<TableSchema>) -> SchemaResult<()> {
        let mut staged = self.clone();
        for schema in schemas {
            staged.define_table(schema)?;
        }
        *self = staged;
        Ok(())
    }

    /// Check that a schema is valid and its name is free
    pub fn check_definable(&self, schema: &TableSchema) -> SchemaResult<()> {
        if self.tables.contains_key(&schema.name) {
            return Err(SchemaError::DuplicateTable(schema.name.clone()));
        }
        SchemaValidator::validate_table(schema)
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    /// Check if the registry has a table
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Names of all registered tables, sorted
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Get the number of registered tables
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Iterate schemas in name order
    pub fn iter(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }
}
