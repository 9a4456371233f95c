//! Error types for the command router

use std::io;
use thiserror::Error;

use ledger_tables_core::{CoreError, StoreError};

/// Result type for the router
pub type Result<T> = std::result::Result<T, RouterError>;

/// Error type for the router
#[derive(Debug, Error)]
pub enum RouterError {
    /// Store rejected the request
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Core failure outside a single mutation
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Command called with the wrong number of arguments
    #[error("Incorrect number of arguments for {command}. Expecting {expected}, got {actual}")]
    ArgumentCount {
        /// Command name
        command: String,
        /// Arguments the command takes
        expected: usize,
        /// Arguments supplied
        actual: usize,
    },

    /// No command with this name
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
