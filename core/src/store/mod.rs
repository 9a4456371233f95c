//! Store context
//!
//! `StoreContext` owns the schema registry and one composite-key index per
//! table. It is passed by reference to every operation; there is no global
//! table catalog.
//!
//! Every call is atomic with respect to every other call. Mutations take the
//! write lock for their whole duration. Queries take the read lock just long
//! enough to snapshot the table, then iterate without holding any lock.

mod checkpoint;
mod unit_of_work;

pub use checkpoint::CHECKPOINT_VERSION;
pub use unit_of_work::{OverlayScan, UnitOfWork};

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use log::debug;

use crate::config::StoreConfig;
use crate::crypto::{self, TableDigest};
use crate::error::{to_poisoned_error, Result, SchemaResult, StoreError, StoreResult};
use crate::index::{CompositeIndex, PrefixScan};
use crate::models::{Row, TableSchema, Value};
use crate::schema::SchemaRegistry;

/// Schemas and their row indexes, guarded together
#[derive(Debug, Clone, Default)]
pub(crate) struct Catalog {
    registry: SchemaRegistry,
    indexes: HashMap<String, CompositeIndex>,
}

impl Catalog {
    fn define_tables(&mut self, schemas: Vec<TableSchema>) -> SchemaResult<()> {
        let names: Vec<String> = schemas.iter().map(|schema| schema.name.clone()).collect();
        self.registry.define_tables(schemas)?;
        for name in names {
            self.indexes.entry(name).or_default();
        }
        Ok(())
    }

    pub(crate) fn table(&self, name: &str) -> StoreResult<(&TableSchema, &CompositeIndex)> {
        let schema = self
            .registry
            .get_table(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))?;
        let index = self
            .indexes
            .get(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))?;
        Ok((schema, index))
    }

    pub(crate) fn table_mut(&mut self, name: &str) -> StoreResult<(&TableSchema, &mut CompositeIndex)> {
        let schema = self
            .registry
            .get_table(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))?;
        let index = self
            .indexes
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))?;
        Ok((schema, index))
    }
}

/// Owner of all tables in one store
#[derive(Debug)]
pub struct StoreContext {
    /// Schemas and rows
    catalog: RwLock<Catalog>,

    /// Configuration
    config: StoreConfig,
}

impl StoreContext {
    /// Create a store and define the tables listed in the configuration
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let mut catalog = Catalog::default();
        catalog.define_tables(config.tables.clone())?;

        Ok(StoreContext {
            catalog: RwLock::new(catalog),
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn read(&self) -> StoreResult<RwLockReadGuard<'_, Catalog>> {
        self.catalog.read().map_err(to_poisoned_error)
    }

    pub(crate) fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Catalog>> {
        self.catalog.write().map_err(to_poisoned_error)
    }

    /// Register a new table
    pub fn define_table(&self, schema: TableSchema) -> StoreResult<()> {
        self.define_tables(vec![schema])
    }

    /// Register several tables atomically
    pub fn define_tables(&self, schemas: Vec<TableSchema>) -> StoreResult<()> {
        let mut catalog = self.write()?;
        catalog.define_tables(schemas)?;
        Ok(())
    }

    /// Get a table's schema
    pub fn table(&self, name: &str) -> StoreResult<Option<TableSchema>> {
        let catalog = self.read()?;
        Ok(catalog.registry.get_table(name).cloned())
    }

    /// Names of all tables, sorted
    pub fn table_names(&self) -> StoreResult<Vec<String>> {
        let catalog = self.read()?;
        Ok(catalog.registry.table_names())
    }

    /// Insert a row unless its key tuple already exists
    pub fn insert(&self, table: &str, row: Row) -> StoreResult<()> {
        let mut catalog = self.write()?;
        let (schema, index) = catalog.table_mut(table)?;
        schema.check_row(&row)?;

        debug!("Inserting into {}: {:?}", table, row.key);
        if !index.insert(row.key, row.values) {
            return Err(StoreError::DuplicateKey {
                table: table.to_string(),
            });
        }
        Ok(())
    }

    /// Parse one string per column and insert the resulting row
    pub fn insert_raw(&self, table: &str, args: &[&str]) -> StoreResult<Row> {
        let row = self.parse_row(table, args)?;
        self.insert(table, row.clone())?;
        Ok(row)
    }

    /// Delete the row with exactly this key tuple
    pub fn delete(&self, table: &str, key: &[Value]) -> StoreResult<()> {
        let mut catalog = self.write()?;
        let (schema, index) = catalog.table_mut(table)?;
        schema.check_key(key)?;

        debug!("Deleting from {}: {:?}", table, key);
        match index.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                table: table.to_string(),
            }),
        }
    }

    /// Parse one string per key column and delete that row
    pub fn delete_raw(&self, table: &str, args: &[&str]) -> StoreResult<()> {
        let key = self.parse_key(table, args)?;
        self.delete(table, &key)
    }

    /// Exact-key lookup
    pub fn get(&self, table: &str, key: &[Value]) -> StoreResult<Option<Row>> {
        let catalog = self.read()?;
        let (schema, index) = catalog.table(table)?;
        schema.check_key(key)?;
        Ok(index.get(key))
    }

    /// Lazily scan rows whose key tuple starts with `prefix`
    ///
    /// The prefix must cover between one and all of the key columns. Rows
    /// come back in ascending key order from a snapshot taken at call time.
    pub fn query(&self, table: &str, prefix: &[Value]) -> StoreResult<PrefixScan> {
        let catalog = self.read()?;
        let (schema, index) = catalog.table(table)?;
        schema.check_prefix(prefix)?;

        debug!("Scanning {} with prefix {:?}", table, prefix);
        Ok(index.scan(prefix.to_vec()))
    }

    /// Parse leading key columns from strings and scan by that prefix
    pub fn query_raw(&self, table: &str, args: &[&str]) -> StoreResult<PrefixScan> {
        let catalog = self.read()?;
        let (schema, _) = catalog.table(table)?;
        if args.is_empty() || args.len() > schema.key_len() {
            return Err(StoreError::InvalidPrefixLength {
                table: table.to_string(),
                len: args.len(),
                max: schema.key_len(),
            });
        }
        let prefix = schema.parse_key(args)?;
        drop(catalog);

        self.query(table, &prefix)
    }

    /// Count rows whose key tuple starts with `prefix`
    pub fn count(&self, table: &str, prefix: &[Value]) -> StoreResult<usize> {
        let catalog = self.read()?;
        let (schema, index) = catalog.table(table)?;
        schema.check_prefix(prefix)?;
        Ok(index.count_prefix(prefix))
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> StoreResult<usize> {
        let catalog = self.read()?;
        let (_, index) = catalog.table(table)?;
        Ok(index.len())
    }

    /// Digest of a table's schema and committed rows
    pub fn digest(&self, table: &str) -> Result<TableDigest> {
        let catalog = self.read()?;
        let (schema, index) = catalog.table(table)?;
        crypto::table_digest(schema, index.iter())
    }

    /// Start a unit of work that buffers mutations until commit
    pub fn begin(&self) -> UnitOfWork<'_> {
        UnitOfWork::new(self)
    }

    pub(crate) fn parse_row(&self, table: &str, args: &[&str]) -> StoreResult<Row> {
        let catalog = self.read()?;
        let (schema, _) = catalog.table(table)?;
        schema.parse_row(args)
    }

    pub(crate) fn parse_key(&self, table: &str, args: &[&str]) -> StoreResult<Vec<Value>> {
        let catalog = self.read()?;
        let (schema, _) = catalog.table(table)?;
        let key = schema.parse_key(args)?;
        schema.check_key(&key)?;
        Ok(key)
    }
}
