use std::path::PathBuf;

use thiserror::Error;

use crate::ledger::TransactionId;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Transaction {0} not found")]
    TransactionNotFound(TransactionId),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("File '{}' not found", .0.display())]
    ImportSourceMissing(PathBuf),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
