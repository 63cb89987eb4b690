//! Store operations the shell drives: mutations, totals, and bulk import.

pub mod import;
pub mod ledger_store;

pub use import::{
    parse_line, BulkImporter, ImportLine, ImportLineError, ImportOptions, ImportReport,
    SkippedLine,
};
pub use ledger_store::{CategoryTotal, LedgerStore, Summary, TransactionUpdate};
