//! Ledger Tables command router
//!
//! This crate maps named commands with string arguments onto the history
//! table store, and hosts the `ledger-tables` command-line tool.

// Error types and result
pub mod error;
pub use error::{Result, RouterError};

// Configuration
pub mod config;
pub use config::{OutputFormat, RouterConfig};

// Time source
pub mod clock;
pub use clock::{Clock, FixedClock, SystemClock};

// Table definitions
pub mod tables;

// Dispatch
pub mod router;
pub use router::{Response, Router};
