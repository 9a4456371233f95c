//! Composite-key index
//!
//! Each table's rows live in a `BTreeMap` ordered by key tuple, so every row
//! sharing a key prefix sits in one contiguous range. The map sits behind an
//! `Arc`: readers take a cheap snapshot and writers copy the map only when a
//! snapshot is still alive.

mod scan;

pub use scan::PrefixScan;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{KeyTuple, Row, Value};

/// Committed rows of one table, keyed by key tuple
pub type RowMap = BTreeMap<KeyTuple, Vec<Value>>;

/// Ordered mapping from key tuple to value columns
#[derive(Debug, Clone, Default)]
pub struct CompositeIndex {
    entries: Arc<RowMap>,
}

impl CompositeIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from existing rows, rejecting duplicate keys
    ///
    /// Returns the first duplicated key tuple on failure.
    pub fn from_rows<I>(rows: I) -> Result<Self, KeyTuple>
    where
        I: IntoIterator<Item = Row>,
    {
        let mut index = Self::new();
        for row in rows {
            if index.contains(&row.key) {
                return Err(row.key);
            }
            index.insert(row.key, row.values);
        }
        Ok(index)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no rows
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a row with exactly this key tuple exists
    pub fn contains(&self, key: &[Value]) -> bool {
        self.entries.contains_key(key)
    }

    /// Exact lookup
    pub fn get(&self, key: &[Value]) -> Option<Row> {
        self.entries
            .get_key_value(key)
            .map(|(key, values)| Row::new(key.clone(), values.clone()))
    }

    /// Insert a row if its key is absent
    ///
    /// Returns `false`, leaving the index untouched, when the key exists.
    pub fn insert(&mut self, key: KeyTuple, values: Vec<Value>) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        Arc::make_mut(&mut self.entries).insert(key, values);
        true
    }

    /// Remove the row with exactly this key tuple
    pub fn remove(&mut self, key: &[Value]) -> Option<Vec<Value>> {
        if !self.entries.contains_key(key) {
            return None;
        }
        Arc::make_mut(&mut self.entries).remove(key)
    }

    /// Lazily scan rows whose key starts with `prefix`, in key order
    ///
    /// The scan reads from a snapshot taken now; later mutations of this
    /// index are not observed.
    pub fn scan(&self, prefix: KeyTuple) -> PrefixScan {
        PrefixScan::new(Arc::clone(&self.entries), prefix)
    }

    /// Count rows whose key starts with `prefix`
    pub fn count_prefix(&self, prefix: &[Value]) -> usize {
        self.entries
            .range::<[Value], _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .count()
    }

    /// Iterate all rows in key order
    pub fn iter(&self) -> impl Iterator<Item = (&KeyTuple, &Vec<Value>)> {
        self.entries.iter()
    }
}
