//! Ledger Tables - append-only history tables for ledger-hosted state
//!
//! This is the root crate that provides workspace-level documentation.
//! Actual implementation is in the subcrates:
//! - `ledger-tables-core`: schema registry, composite-key index and mutation engine
//! - `ledger-tables-router`: command router and the `ledger-tables` CLI

/// Returns the version of the package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
