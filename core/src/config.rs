//! Configuration for the core crate
//!
//! A store can be started with a set of tables already defined, which is
//! how a ledger node bootstraps the same schemas on every replica.

use serde::{Serialize, Deserialize};

use crate::error::{CoreError, Result};
use crate::models::TableSchema;

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Tables defined when the store is created
    #[serde(default)]
    pub tables: Vec<TableSchema>,

    /// Default log filter for binaries hosting the store
    pub log_level: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            tables: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table to define at startup
    pub fn with_table(mut self, schema: TableSchema) -> Self {
        self.tables.push(schema);
        self
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config: StoreConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Check settings that cannot be expressed in the type
    pub fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            return Err(CoreError::ConfigError("log_level must not be empty".to_string()));
        }
        Ok(())
    }

    /// Create a development configuration, logging every mutation and query
    pub fn development() -> Self {
        StoreConfig {
            log_level: "debug".to_string(),
            ..Self::default()
        }
    }

    /// Create a testing configuration that only logs problems
    pub fn testing() -> Self {
        StoreConfig {
            log_level: "warn".to_string(),
            ..Self::default()
        }
    }
}
