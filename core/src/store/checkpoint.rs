//! Checkpoints of committed state
//!
//! The store keeps nothing on disk. A checkpoint is the bincode encoding of
//! every schema together with its rows in key order; the hosting substrate
//! decides where those bytes live.

use std::sync::RwLock;
use log::info;
use serde::{Serialize, Deserialize};

use crate::config::StoreConfig;
use crate::error::{CoreError, Result};
use crate::index::CompositeIndex;
use crate::models::{Row, TableSchema};
use super::{Catalog, StoreContext};

/// Bumped whenever the checkpoint layout changes
pub const CHECKPOINT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct TableCheckpoint {
    schema: TableSchema,
    rows: Vec<Row>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Checkpoint {
    version: u32,
    tables: Vec<TableCheckpoint>,
}

impl StoreContext {
    /// Serialize all committed tables
    pub fn checkpoint(&self) -> Result<Vec<u8>> {
        let catalog = self.read()?;

        let mut tables = Vec::with_capacity(catalog.registry.table_count());
        for schema in catalog.registry.iter() {
            let (_, index) = catalog.table(&schema.name)?;
            let rows = index
                .iter()
                .map(|(key, values)| Row::new(key.clone(), values.clone()))
                .collect();
            tables.push(TableCheckpoint {
                schema: schema.clone(),
                rows,
            });
        }

        let checkpoint = Checkpoint {
            version: CHECKPOINT_VERSION,
            tables,
        };
        Ok(bincode::serialize(&checkpoint)?)
    }

    /// Rebuild a store from checkpoint bytes
    ///
    /// Every row is checked against its schema again. Tables listed in
    /// `config` that the checkpoint lacks are defined empty; a configured
    /// table whose schema differs from the checkpointed one is an error.
    pub fn restore(config: StoreConfig, bytes: &[u8]) -> Result<Self> {
        let checkpoint: Checkpoint = bincode::deserialize(bytes)?;
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CoreError::CheckpointError(format!(
                "unsupported checkpoint version {}, expected {}",
                checkpoint.version, CHECKPOINT_VERSION
            )));
        }

        let mut catalog = Catalog::default();
        let mut total_rows = 0;
        for table in checkpoint.tables {
            catalog.registry.define_table(table.schema.clone())?;

            for row in &table.rows {
                table.schema.check_row(row)?;
            }
            total_rows += table.rows.len();

            let index = CompositeIndex::from_rows(table.rows).map_err(|key| {
                CoreError::CheckpointError(format!(
                    "duplicate key {:?} in table {}",
                    key, table.schema.name
                ))
            })?;
            catalog.indexes.insert(table.schema.name.clone(), index);
        }

        let mut missing = Vec::new();
        for schema in &config.tables {
            match catalog.registry.get_table(&schema.name) {
                Some(existing) if existing != schema => {
                    return Err(CoreError::CheckpointError(format!(
                        "configured table {} differs from the checkpointed schema",
                        schema.name
                    )));
                }
                Some(_) => {}
                None => missing.push(schema.clone()),
            }
        }
        catalog.define_tables(missing)?;

        info!(
            "Restored {} tables with {} rows from checkpoint",
            catalog.registry.table_count(),
            total_rows
        );

        Ok(StoreContext {
            catalog: RwLock::new(catalog),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnDefinition, ColumnType, Value};

    fn history(name: &str, value: &str) -> TableSchema {
        TableSchema::new(
            name,
            vec![
                ColumnDefinition::key("ItemId", ColumnType::String),
                ColumnDefinition::key("OrgCode", ColumnType::String),
                ColumnDefinition::key("CreateTS", ColumnType::String),
                ColumnDefinition::value(value, ColumnType::Int32),
            ],
        )
    }

    fn config() -> StoreConfig {
        StoreConfig::testing()
            .with_table(history("InventoryHistory", "Qty"))
            .with_table(history("PriceListHistory", "Price"))
    }

    fn populated() -> StoreContext {
        let store = StoreContext::new(config()).unwrap();
        store.insert_raw("InventoryHistory", &["A1", "O1", "20240101000000", "5"]).unwrap();
        store.insert_raw("InventoryHistory", &["A1", "O1", "20240102000000", "7"]).unwrap();
        store.insert_raw("InventoryHistory", &["A2", "O1", "20240101000000", "-3"]).unwrap();
        store.insert_raw("PriceListHistory", &["A1", "O1", "20240101000000", "1999"]).unwrap();
        store
    }

    #[test]
    fn test_restore_matches_original() {
        let original = populated();
        let bytes = original.checkpoint().unwrap();
        let restored = StoreContext::restore(config(), &bytes).unwrap();

        assert_eq!(restored.table_names().unwrap(), original.table_names().unwrap());
        for table in original.table_names().unwrap() {
            assert_eq!(restored.digest(&table).unwrap(), original.digest(&table).unwrap());
        }

        let prefix = vec![Value::from("A1")];
        let before: Vec<Row> = original.query("InventoryHistory", &prefix).unwrap().collect();
        let after: Vec<Row> = restored.query("InventoryHistory", &prefix).unwrap().collect();
        assert_eq!(before, after);

        // The restored store still enforces uniqueness
        assert!(restored
            .insert_raw("InventoryHistory", &["A1", "O1", "20240101000000", "5"])
            .is_err());
    }

    #[test]
    fn test_restore_defines_missing_config_tables() {
        let bytes = StoreContext::new(StoreConfig::testing().with_table(history("InventoryHistory", "Qty")))
            .unwrap()
            .checkpoint()
            .unwrap();

        let restored = StoreContext::restore(config(), &bytes).unwrap();
        assert_eq!(
            restored.table_names().unwrap(),
            vec!["InventoryHistory".to_string(), "PriceListHistory".to_string()]
        );
        assert_eq!(restored.row_count("PriceListHistory").unwrap(), 0);
    }

    #[test]
    fn test_restore_rejects_conflicting_schema() {
        let bytes = populated().checkpoint().unwrap();
        let conflicting = StoreConfig::testing().with_table(history("InventoryHistory", "Quantity"));

        let err = StoreContext::restore(conflicting, &bytes).unwrap_err();
        assert!(matches!(err, CoreError::CheckpointError(_)));
    }

    #[test]
    fn test_restore_rejects_other_versions() {
        let bytes = bincode::serialize(&Checkpoint {
            version: CHECKPOINT_VERSION + 1,
            tables: Vec::new(),
        })
        .unwrap();

        let err = StoreContext::restore(StoreConfig::testing(), &bytes).unwrap_err();
        assert!(matches!(err, CoreError::CheckpointError(_)));
    }

    #[test]
    fn test_restore_rejects_duplicate_rows() {
        let row = Row::new(
            vec![Value::from("A1"), Value::from("O1"), Value::from("1")],
            vec![Value::from(5)],
        );
        let bytes = bincode::serialize(&Checkpoint {
            version: CHECKPOINT_VERSION,
            tables: vec![TableCheckpoint {
                schema: history("InventoryHistory", "Qty"),
                rows: vec![row.clone(), row],
            }],
        })
        .unwrap();

        let err = StoreContext::restore(StoreConfig::testing(), &bytes).unwrap_err();
        assert!(matches!(err, CoreError::CheckpointError(_)));
    }

    #[test]
    fn test_restore_rejects_garbage() {
        let err = StoreContext::restore(StoreConfig::testing(), b"not a checkpoint").unwrap_err();
        assert!(matches!(err, CoreError::BincodeError(_)));
    }
}
