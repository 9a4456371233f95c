//! Units of work
//!
//! The hosting ledger groups mutations into units (one ledger transaction)
//! that must commit or roll back as a whole. A `UnitOfWork` buffers inserts
//! and deletes against the store without touching committed state. `commit`
//! re-checks every buffered mutation under the write lock and then applies
//! all of them. Dropping the unit without committing discards the buffer.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::iter::Peekable;
use std::ops::Bound;
use log::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::index::PrefixScan;
use crate::models::{KeyTuple, Row, Value};
use super::StoreContext;

/// Buffered change for one table, `None` marks a delete
type Overlay = BTreeMap<KeyTuple, Option<Vec<Value>>>;

/// A buffered mutation, in the order it was requested
#[derive(Debug, Clone)]
enum Mutation {
    Insert { table: String, row: Row },
    Delete { table: String, key: KeyTuple },
}

impl Mutation {
    fn target(&self) -> (&str, &[Value]) {
        match self {
            Mutation::Insert { table, row } => (table.as_str(), row.key.as_slice()),
            Mutation::Delete { table, key } => (table.as_str(), key.as_slice()),
        }
    }
}

/// Mutations buffered until the hosting ledger commits
#[derive(Debug)]
pub struct UnitOfWork<'a> {
    store: &'a StoreContext,
    mutations: Vec<Mutation>,
    overlay: HashMap<String, Overlay>,
}

impl<'a> UnitOfWork<'a> {
    pub(crate) fn new(store: &'a StoreContext) -> Self {
        Self {
            store,
            mutations: Vec::new(),
            overlay: HashMap::new(),
        }
    }

    /// Number of buffered mutations
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Whether nothing has been buffered
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// State of a key inside this unit, if the unit touched it
    fn buffered(&self, table: &str, key: &[Value]) -> Option<&Option<Vec<Value>>> {
        self.overlay.get(table)?.get(key)
    }

    fn stage(&mut self, table: &str, key: KeyTuple, values: Option<Vec<Value>>) {
        self.overlay
            .entry(table.to_string())
            .or_default()
            .insert(key, values);
    }

    /// Buffer an insert, rejecting keys that exist in committed or buffered state
    pub fn insert(&mut self, table: &str, row: Row) -> StoreResult<()> {
        let store = self.store;
        let catalog = store.read()?;
        let (schema, index) = catalog.table(table)?;
        schema.check_row(&row)?;

        let exists = match self.buffered(table, &row.key) {
            Some(state) => state.is_some(),
            None => index.contains(&row.key),
        };
        drop(catalog);

        if exists {
            return Err(StoreError::DuplicateKey {
                table: table.to_string(),
            });
        }

        debug!("Buffered insert into {}: {:?}", table, row.key);
        self.stage(table, row.key.clone(), Some(row.values.clone()));
        self.mutations.push(Mutation::Insert {
            table: table.to_string(),
            row,
        });
        Ok(())
    }

    /// Parse one string per column and buffer an insert
    pub fn insert_raw(&mut self, table: &str, args: &[&str]) -> StoreResult<Row> {
        let row = self.store.parse_row(table, args)?;
        self.insert(table, row.clone())?;
        Ok(row)
    }

    /// Buffer a delete of the row with exactly this key tuple
    pub fn delete(&mut self, table: &str, key: &[Value]) -> StoreResult<()> {
        let store = self.store;
        let catalog = store.read()?;
        let (schema, index) = catalog.table(table)?;
        schema.check_key(key)?;

        let exists = match self.buffered(table, key) {
            Some(state) => state.is_some(),
            None => index.contains(key),
        };
        drop(catalog);

        if !exists {
            return Err(StoreError::NotFound {
                table: table.to_string(),
            });
        }

        debug!("Buffered delete from {}: {:?}", table, key);
        self.stage(table, key.to_vec(), None);
        self.mutations.push(Mutation::Delete {
            table: table.to_string(),
            key: key.to_vec(),
        });
        Ok(())
    }

    /// Parse one string per key column and buffer a delete
    pub fn delete_raw(&mut self, table: &str, args: &[&str]) -> StoreResult<()> {
        let key = self.store.parse_key(table, args)?;
        self.delete(table, &key)
    }

    /// Exact-key lookup that sees this unit's own changes
    pub fn get(&self, table: &str, key: &[Value]) -> StoreResult<Option<Row>> {
        match self.buffered(table, key) {
            Some(Some(values)) => Ok(Some(Row::new(key.to_vec(), values.clone()))),
            Some(None) => Ok(None),
            None => self.store.get(table, key),
        }
    }

    /// Prefix scan over committed rows merged with this unit's changes
    pub fn query(&self, table: &str, prefix: &[Value]) -> StoreResult<OverlayScan> {
        let committed = self.store.query(table, prefix)?;

        let pending: Vec<(KeyTuple, Option<Vec<Value>>)> = match self.overlay.get(table) {
            Some(overlay) => overlay
                .range::<[Value], _>((Bound::Included(prefix), Bound::Unbounded))
                .take_while(|(key, _)| key.starts_with(prefix))
                .map(|(key, values)| (key.clone(), values.clone()))
                .collect(),
            None => Vec::new(),
        };

        Ok(OverlayScan {
            committed: committed.peekable(),
            pending: pending.into_iter().peekable(),
        })
    }

    /// Apply every buffered mutation, or none of them
    ///
    /// Returns the number of mutations applied. If the committed state
    /// changed since a mutation was buffered so that it no longer applies,
    /// the error is returned and the store is left untouched.
    pub fn commit(self) -> StoreResult<usize> {
        if self.mutations.is_empty() {
            return Ok(0);
        }

        let mut catalog = self.store.write()?;

        // Replay presence checks against the state as it is now
        {
            let mut presence: HashMap<(&str, &[Value]), bool> = HashMap::new();
            for mutation in &self.mutations {
                let (table, key) = mutation.target();
                let (_, index) = catalog.table(table)?;
                let present = presence
                    .entry((table, key))
                    .or_insert_with(|| index.contains(key));

                match mutation {
                    Mutation::Insert { .. } if *present => {
                        return Err(StoreError::DuplicateKey {
                            table: table.to_string(),
                        });
                    }
                    Mutation::Delete { .. } if !*present => {
                        return Err(StoreError::NotFound {
                            table: table.to_string(),
                        });
                    }
                    Mutation::Insert { .. } => *present = true,
                    Mutation::Delete { .. } => *present = false,
                }
            }
        }

        let applied = self.mutations.len();
        for mutation in self.mutations {
            match mutation {
                Mutation::Insert { table, row } => {
                    let (_, index) = catalog.table_mut(&table)?;
                    index.insert(row.key, row.values);
                }
                Mutation::Delete { table, key } => {
                    let (_, index) = catalog.table_mut(&table)?;
                    index.remove(&key);
                }
            }
        }

        info!("Committed unit of work with {} mutations", applied);
        Ok(applied)
    }

    /// Discard every buffered mutation
    pub fn rollback(self) {
        if !self.mutations.is_empty() {
            info!("Rolled back unit of work with {} mutations", self.mutations.len());
        }
    }
}

/// Prefix scan merging committed rows with a unit's buffered changes
///
/// Both inputs are in key order; a buffered entry shadows the committed row
/// with the same key.
#[derive(Debug)]
pub struct OverlayScan {
    committed: Peekable<PrefixScan>,
    pending: Peekable<std::vec::IntoIter<(KeyTuple, Option<Vec<Value>>)>>,
}

impl Iterator for OverlayScan {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        loop {
            let ordering = match (self.committed.peek(), self.pending.peek()) {
                (None, None) => return None,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(row), Some((key, _))) => row.key.cmp(key),
            };

            if ordering == Ordering::Less {
                return self.committed.next();
            }
            if ordering == Ordering::Equal {
                self.committed.next();
            }

            if let Some((key, Some(values))) = self.pending.next() {
                return Some(Row::new(key, values));
            }
        }
    }
}
