//! Table digests
//!
//! Replicas of the hosting ledger apply the same ordered mutations, so their
//! tables must end up identical. A digest is a domain-separated SHA-256 over
//! a table's schema and its rows in key order, cheap to compare across
//! replicas.

use sha2::{Sha256, Digest};
use constant_time_eq::constant_time_eq;

use crate::error::Result;
use crate::models::{domains, KeyTuple, TableSchema, Value};

/// A 32-byte table digest
pub type TableDigest = [u8; 32];

/// Incremental hasher with domain separation and length-prefixed fields
#[derive(Debug, Clone)]
pub struct DomainHasher {
    inner: Sha256,
}

impl DomainHasher {
    /// Start a hash in the given domain
    pub fn new(domain: &str) -> Self {
        let mut inner = Sha256::new();

        // Domain length as a single byte keeps domains from running together
        inner.update(domain.as_bytes());
        inner.update([domain.len() as u8]);

        DomainHasher { inner }
    }

    /// Add one length-prefixed field
    pub fn update_field(&mut self, data: &[u8]) {
        self.inner.update((data.len() as u32).to_be_bytes());
        self.inner.update(data);
    }

    /// Finalize and return the digest
    pub fn finalize(self) -> TableDigest {
        let result = self.inner.finalize();
        let mut output = [0u8; 32];
        output.copy_from_slice(&result);
        output
    }
}

/// Hash a single row's fields in column order
fn row_hash(key: &[Value], values: &[Value]) -> TableDigest {
    let mut hasher = DomainHasher::new(domains::ROW);
    hasher.update_field(&(key.len() as u32).to_be_bytes());
    for value in key.iter().chain(values) {
        hasher.update_field(&value.to_bytes());
    }
    hasher.finalize()
}

/// Compute the digest of a table
///
/// `rows` must be supplied in ascending key order, which is the order the
/// composite-key index iterates in.
pub fn table_digest<'a, I>(schema: &TableSchema, rows: I) -> Result<TableDigest>
where
    I: IntoIterator<Item = (&'a KeyTuple, &'a Vec<Value>)>,
{
    let mut hasher = DomainHasher::new(domains::TABLE);

    // Serialized schema binds the digest to column names and types
    let schema_json = serde_json::to_vec(schema)?;
    hasher.update_field(&schema_json);

    let mut count: u64 = 0;
    for (key, values) in rows {
        hasher.update_field(&row_hash(key, values));
        count += 1;
    }
    hasher.update_field(&count.to_be_bytes());

    Ok(hasher.finalize())
}

/// Compare two digests in constant time
pub fn verify_digest(expected: &TableDigest, actual: &TableDigest) -> bool {
    constant_time_eq(expected, actual)
}

/// Hex-encode a digest for logs and CLI output
pub fn digest_hex(digest: &TableDigest) -> String {
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnDefinition, ColumnType};

    fn schema() -> TableSchema {
        TableSchema::new(
            "PriceListHistory",
            vec![
                ColumnDefinition::key("ItemId", ColumnType::String),
                ColumnDefinition::value("Price", ColumnType::Int32),
            ],
        )
    }

    fn entry(item: &str, price: i32) -> (KeyTuple, Vec<Value>) {
        (vec![Value::from(item)], vec![Value::from(price)])
    }

    #[test]
    fn test_digest_is_deterministic() {
        let rows = vec![entry("A1", 5), entry("A2", 7)];

        let d1 = table_digest(&schema(), rows.iter().map(|(k, v)| (k, v))).unwrap();
        let d2 = table_digest(&schema(), rows.iter().map(|(k, v)| (k, v))).unwrap();
        assert!(verify_digest(&d1, &d2));
        assert_eq!(digest_hex(&d1).len(), 64);
    }

    #[test]
    fn test_digest_changes_with_content() {
        let base = vec![entry("A1", 5), entry("A2", 7)];
        let changed = vec![entry("A1", 5), entry("A2", 8)];
        let shorter = vec![entry("A1", 5)];

        let d_base = table_digest(&schema(), base.iter().map(|(k, v)| (k, v))).unwrap();
        let d_changed = table_digest(&schema(), changed.iter().map(|(k, v)| (k, v))).unwrap();
        let d_shorter = table_digest(&schema(), shorter.iter().map(|(k, v)| (k, v))).unwrap();

        assert_ne!(d_base, d_changed);
        assert_ne!(d_base, d_shorter);
        assert!(!verify_digest(&d_base, &d_changed));
    }

    #[test]
    fn test_digest_binds_schema() {
        let rows: Vec<(KeyTuple, Vec<Value>)> = vec![];
        let mut renamed = schema();
        renamed.name = "InventoryHistory".to_string();

        let d1 = table_digest(&schema(), rows.iter().map(|(k, v)| (k, v))).unwrap();
        let d2 = table_digest(&renamed, rows.iter().map(|(k, v)| (k, v))).unwrap();
        assert_ne!(d1, d2);
    }

    #[test]
    fn test_field_boundaries_matter() {
        // ("AB", "C") and ("A", "BC") must hash differently
        let mut h1 = DomainHasher::new("TEST");
        h1.update_field(b"AB");
        h1.update_field(b"C");

        let mut h2 = DomainHasher::new("TEST");
        h2.update_field(b"A");
        h2.update_field(b"BC");

        assert_ne!(h1.finalize(), h2.finalize());
    }
}
