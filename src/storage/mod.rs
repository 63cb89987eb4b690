//! Persistence adapters for the ledger.
//!
//! [`JsonStorage`] owns the durable store file. [`ViewCache`] dumps a
//! pretty-printed copy whenever the table viewer renders; it is never read
//! back.

pub mod json_backend;
pub mod view_cache;

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::{errors::Result, ledger::Ledger};

pub use json_backend::JsonStorage;
pub use view_cache::ViewCache;

/// Abstraction over places a ledger can be persisted to.
pub trait StorageBackend {
    /// Loads the persisted ledger; `Ok(None)` when nothing was saved yet.
    fn load(&self) -> Result<Option<Ledger>>;

    /// Replaces the persisted ledger with `ledger`.
    fn save(&self, ledger: &Ledger) -> Result<()>;
}

/// Keeps the ledger in memory; used by tests and throwaway sessions.
///
/// Clones share the same state, so a caller can keep a handle to inspect
/// what a store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    saved: RefCell<Option<Ledger>>,
    saves: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ledger(ledger: Ledger) -> Self {
        let storage = Self::new();
        *storage.inner.saved.borrow_mut() = Some(ledger);
        storage
    }

    /// Number of completed `save` calls.
    pub fn save_count(&self) -> usize {
        self.inner.saves.get()
    }

    pub fn snapshot(&self) -> Option<Ledger> {
        self.inner.saved.borrow().clone()
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> Result<Option<Ledger>> {
        Ok(self.inner.saved.borrow().clone())
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        *self.inner.saved.borrow_mut() = Some(ledger.clone());
        self.inner.saves.set(self.inner.saves.get() + 1);
        Ok(())
    }
}
