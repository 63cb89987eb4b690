//! Ledger domain models and persistence-friendly types.

#[allow(clippy::module_inception)]
pub mod ledger;
pub mod transaction;

pub use ledger::{CategoryEntry, Ledger};
pub use transaction::{
    parse_amount, parse_date, validate_date, Transaction, TransactionId, DATE_FORMAT,
};
