use std::path::{Path, PathBuf};

use finance_tracker::{core::LedgerStore, storage::JsonStorage};
use tempfile::TempDir;

/// Store backed by `expenses.json` inside a fresh temporary directory.
///
/// The returned `TempDir` must outlive the store.
pub fn json_store() -> (LedgerStore, PathBuf, TempDir) {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join("expenses.json");
    let store = LedgerStore::open(Box::new(JsonStorage::new(path.clone())));
    (store, path, temp)
}

#[allow(dead_code)]
pub fn reopen(path: &Path) -> LedgerStore {
    LedgerStore::open(Box::new(JsonStorage::new(path)))
}
