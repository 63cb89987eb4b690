//! Text menu shell and table viewer over the ledger store.

pub mod output;
pub mod prompts;
pub mod shell;
pub mod table;
pub mod viewer;

use thiserror::Error;

use crate::errors::LedgerError;

pub use shell::{run_cli, Shell};

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("Input closed")]
    InputClosed,
}
