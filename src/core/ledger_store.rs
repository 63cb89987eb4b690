//! The owned transaction store: id assignment, mutations, and totals.

use crate::{
    errors::{LedgerError, Result},
    ledger::{validate_date, Ledger, Transaction, TransactionId},
    storage::StorageBackend,
};

/// Field changes for [`LedgerStore::update`]. `None` or an empty string keeps
/// the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Totals per category in store order, plus their sum.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub grand_total: f64,
    pub categories: Vec<CategoryTotal>,
}

/// Owns the ledger and writes it through to storage after every mutation.
pub struct LedgerStore {
    ledger: Ledger,
    next_id: TransactionId,
    storage: Box<dyn StorageBackend>,
}

impl LedgerStore {
    /// Startup hook: loads persisted state and recomputes the id counter.
    ///
    /// A missing or unreadable store file yields an empty ledger.
    pub fn open(storage: Box<dyn StorageBackend>) -> Self {
        let ledger = match storage.load() {
            Ok(Some(ledger)) => ledger,
            Ok(None) => Ledger::new(),
            Err(err) => {
                tracing::warn!(error = %err, "stored ledger unreadable, starting empty");
                Ledger::new()
            }
        };
        let next_id = ledger.max_id().map_or(1, |max| max + 1);
        tracing::info!(records = ledger.len(), next_id, "ledger loaded");
        Self {
            ledger,
            next_id,
            storage,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Id the next added record will receive.
    pub fn next_id(&self) -> TransactionId {
        self.next_id
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Every record with its category, in category then append order.
    pub fn transactions(&self) -> impl Iterator<Item = (&str, &Transaction)> {
        self.ledger.transactions()
    }

    /// Records a new transaction and persists the store.
    ///
    /// The date is stored as given; callers validate interactive input.
    pub fn add(
        &mut self,
        category: &str,
        amount: f64,
        description: &str,
        date: &str,
    ) -> Result<Transaction> {
        let transaction = self.insert(category, amount, description, date);
        self.persist()?;
        Ok(transaction)
    }

    /// Appends a record without persisting. Used for batched inserts.
    pub(crate) fn insert(
        &mut self,
        category: &str,
        amount: f64,
        description: &str,
        date: &str,
    ) -> Transaction {
        let transaction = Transaction::new(self.next_id, amount, description, date);
        self.next_id += 1;
        self.ledger.push(category, transaction.clone());
        tracing::debug!(id = transaction.id, category, "transaction added");
        transaction
    }

    pub fn find_by_id(&self, id: TransactionId) -> Option<(&str, &Transaction)> {
        self.ledger.find(id)
    }

    /// Applies `changes` in the order amount, description, date, category.
    ///
    /// A category change appends the record to the end of its new category.
    /// Inputs are validated before anything is modified.
    pub fn update(
        &mut self,
        id: TransactionId,
        changes: TransactionUpdate,
    ) -> Result<Transaction> {
        let current_category = match self.ledger.find(id) {
            Some((category, _)) => category.to_string(),
            None => return Err(LedgerError::TransactionNotFound(id)),
        };
        if let Some(amount) = changes.amount {
            if !amount.is_finite() {
                return Err(LedgerError::InvalidInput(format!(
                    "`{}` is not a valid amount",
                    amount
                )));
            }
        }
        let date = non_empty(&changes.date).map(validate_date).transpose()?;
        let description = non_empty(&changes.description);
        let category = non_empty(&changes.category);

        let transaction = self
            .ledger
            .find_mut(id)
            .ok_or(LedgerError::TransactionNotFound(id))?;
        if let Some(amount) = changes.amount {
            transaction.amount = amount;
        }
        if let Some(description) = description {
            transaction.description = description.to_string();
        }
        if let Some(date) = date {
            transaction.date = date;
        }
        let mut updated = transaction.clone();

        if let Some(category) = category.filter(|name| *name != current_category) {
            if let Some((_, moved)) = self.ledger.remove(id) {
                updated = moved.clone();
                self.ledger.push(category, moved);
            }
            tracing::debug!(id, from = %current_category, to = category, "transaction moved");
        }

        tracing::debug!(id, "transaction updated");
        self.persist()?;
        Ok(updated)
    }

    /// Removes the record and persists; returns what was removed.
    pub fn delete(&mut self, id: TransactionId) -> Result<Transaction> {
        let (category, removed) = self
            .ledger
            .remove(id)
            .ok_or(LedgerError::TransactionNotFound(id))?;
        tracing::debug!(id, category = %category, "transaction deleted");
        self.persist()?;
        Ok(removed)
    }

    /// Sums amounts per category. `None` when the store holds no records.
    pub fn aggregate(&self) -> Option<Summary> {
        if self.ledger.is_empty() {
            return None;
        }
        let categories: Vec<CategoryTotal> = self
            .ledger
            .categories()
            .iter()
            .map(|entry| CategoryTotal {
                category: entry.name.clone(),
                total: entry.transactions.iter().map(|txn| txn.amount).sum(),
            })
            .collect();
        let grand_total = categories.iter().map(|entry| entry.total).sum();
        Some(Summary {
            grand_total,
            categories,
        })
    }

    pub fn persist(&self) -> Result<()> {
        self.storage.save(&self.ledger)
    }

    /// Shutdown hook: forces a final write of the store.
    pub fn close(self) -> Result<()> {
        self.persist()?;
        tracing::info!(records = self.ledger.len(), "ledger closed");
        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}
