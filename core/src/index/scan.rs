//! Lazy prefix scan over an index snapshot

use std::iter::FusedIterator;
use std::ops::Bound;
use std::sync::Arc;

use crate::models::{KeyTuple, Row};
use super::RowMap;

/// Iterator over the rows whose key tuple starts with a prefix
///
/// Holds its own snapshot of the table. Each step seeks just past the last
/// key it yielded, so at most one row is materialized at a time. Rows come
/// out in ascending key order.
#[derive(Debug, Clone)]
pub struct PrefixScan {
    entries: Arc<RowMap>,
    prefix: KeyTuple,
    last_key: Option<KeyTuple>,
    exhausted: bool,
}

impl PrefixScan {
    pub(crate) fn new(entries: Arc<RowMap>, prefix: KeyTuple) -> Self {
        Self {
            entries,
            prefix,
            last_key: None,
            exhausted: false,
        }
    }

    /// The prefix being scanned
    pub fn prefix(&self) -> &[crate::models::Value] {
        &self.prefix
    }
}

impl Iterator for PrefixScan {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        if self.exhausted {
            return None;
        }

        // A prefix sorts before every key it is a prefix of
        let lower = match &self.last_key {
            Some(key) => Bound::Excluded(key),
            None => Bound::Included(&self.prefix),
        };

        let found = self
            .entries
            .range::<KeyTuple, _>((lower, Bound::Unbounded))
            .next()
            .filter(|(key, _)| key.starts_with(&self.prefix))
            .map(|(key, values)| (key.clone(), values.clone()));

        match found {
            Some((key, values)) => {
                self.last_key = Some(key.clone());
                Some(Row::new(key, values))
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }
}

impl FusedIterator for PrefixScan {}
