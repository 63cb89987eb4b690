use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

use super::transaction::{Transaction, TransactionId};

/// Category name paired with its records in append order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEntry {
    pub name: String,
    pub transactions: Vec<Transaction>,
}

/// Ordered mapping from category name to that category's records.
///
/// Categories keep their insertion order. A category exists only while it
/// holds at least one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    categories: Vec<CategoryEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of records across every category.
    pub fn len(&self) -> usize {
        self.categories
            .iter()
            .map(|entry| entry.transactions.len())
            .sum()
    }

    pub fn categories(&self) -> &[CategoryEntry] {
        &self.categories
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|entry| entry.name.as_str())
    }

    pub fn category(&self, name: &str) -> Option<&[Transaction]> {
        self.categories
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.transactions.as_slice())
    }

    pub fn contains_category(&self, name: &str) -> bool {
        self.category(name).is_some()
    }

    /// Flattens the ledger in category order, then append order.
    pub fn transactions(&self) -> impl Iterator<Item = (&str, &Transaction)> {
        self.categories.iter().flat_map(|entry| {
            entry
                .transactions
                .iter()
                .map(move |txn| (entry.name.as_str(), txn))
        })
    }

    pub fn max_id(&self) -> Option<TransactionId> {
        self.transactions().map(|(_, txn)| txn.id).max()
    }

    /// Appends `transaction` to `category`, creating the category when absent.
    pub fn push(&mut self, category: &str, transaction: Transaction) {
        match self
            .categories
            .iter_mut()
            .find(|entry| entry.name == category)
        {
            Some(entry) => entry.transactions.push(transaction),
            None => self.categories.push(CategoryEntry {
                name: category.to_string(),
                transactions: vec![transaction],
            }),
        }
    }

    /// Position of `id` as `(category index, record index)`; first match wins.
    fn locate(&self, id: TransactionId) -> Option<(usize, usize)> {
        self.categories
            .iter()
            .enumerate()
            .find_map(|(cat_idx, entry)| {
                entry
                    .transactions
                    .iter()
                    .position(|txn| txn.id == id)
                    .map(|txn_idx| (cat_idx, txn_idx))
            })
    }

    pub fn find(&self, id: TransactionId) -> Option<(&str, &Transaction)> {
        let (cat_idx, txn_idx) = self.locate(id)?;
        let entry = &self.categories[cat_idx];
        Some((entry.name.as_str(), &entry.transactions[txn_idx]))
    }

    pub fn find_mut(&mut self, id: TransactionId) -> Option<&mut Transaction> {
        let (cat_idx, txn_idx) = self.locate(id)?;
        Some(&mut self.categories[cat_idx].transactions[txn_idx])
    }

    /// Removes the record with `id`, dropping its category if it became empty.
    pub fn remove(&mut self, id: TransactionId) -> Option<(String, Transaction)> {
        let (cat_idx, txn_idx) = self.locate(id)?;
        let entry = &mut self.categories[cat_idx];
        let removed = entry.transactions.remove(txn_idx);
        let name = if entry.transactions.is_empty() {
            self.categories.remove(cat_idx).name
        } else {
            entry.name.clone()
        };
        Some((name, removed))
    }

    /// Inserts a whole category; a repeated name replaces the earlier records
    /// but keeps the earlier position. Empty record lists are ignored.
    fn insert_category(&mut self, name: String, transactions: Vec<Transaction>) {
        if let Some(existing) = self.categories.iter_mut().find(|entry| entry.name == name) {
            existing.transactions = transactions;
            if existing.transactions.is_empty() {
                self.categories.retain(|entry| !entry.transactions.is_empty());
            }
            return;
        }
        if !transactions.is_empty() {
            self.categories.push(CategoryEntry { name, transactions });
        }
    }
}

impl Serialize for Ledger {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for entry in &self.categories {
            map.serialize_entry(&entry.name, &entry.transactions)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Ledger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LedgerVisitor;

        impl<'de> Visitor<'de> for LedgerVisitor {
            type Value = Ledger;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of category names to transaction lists")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut ledger = Ledger::new();
                while let Some((name, transactions)) =
                    access.next_entry::<String, Vec<Transaction>>()?
                {
                    ledger.insert_category(name, transactions);
                }
                Ok(ledger)
            }
        }

        deserializer.deserialize_map(LedgerVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(id: TransactionId, amount: f64) -> Transaction {
        Transaction::new(id, amount, "", "2024-01-01")
    }

    #[test]
    fn push_creates_categories_in_insertion_order() {
        let mut ledger = Ledger::new();
        ledger.push("Food", txn(1, 1.0));
        ledger.push("Bills", txn(2, 2.0));
        ledger.push("Food", txn(3, 3.0));

        let names: Vec<&str> = ledger.category_names().collect();
        assert_eq!(names, vec!["Food", "Bills"]);
        let food: Vec<TransactionId> = ledger
            .category("Food")
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(food, vec![1, 3]);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.max_id(), Some(3));
    }

    #[test]
    fn remove_drops_emptied_category() {
        let mut ledger = Ledger::new();
        ledger.push("Travel", txn(2, 10.0));
        ledger.push("Food", txn(3, 5.0));

        let (category, removed) = ledger.remove(2).unwrap();
        assert_eq!(category, "Travel");
        assert_eq!(removed.id, 2);
        assert!(!ledger.contains_category("Travel"));
        assert!(ledger.remove(2).is_none());
    }

    #[test]
    fn categories_are_case_sensitive() {
        let mut ledger = Ledger::new();
        ledger.push("food", txn(1, 1.0));
        ledger.push("Food", txn(2, 1.0));
        assert_eq!(ledger.categories().len(), 2);
    }

    #[test]
    fn find_scans_category_order_first() {
        let mut ledger = Ledger::new();
        ledger.push("A", txn(1, 1.0));
        ledger.push("B", txn(5, 2.0));
        ledger.push("A", txn(4, 3.0));
        let (category, found) = ledger.find(5).unwrap();
        assert_eq!(category, "B");
        assert_eq!(found.amount, 2.0);
        assert!(ledger.find(9).is_none());
    }

    #[test]
    fn deserialize_preserves_file_order_and_skips_empty_lists() {
        let json = r#"{
            "Zeta": [{"transaction_number":"2","amount":1.5,"description":"","date":"2024-01-02"}],
            "Empty": [],
            "Alpha": [{"transaction_number":"1","amount":2,"description":"x","date":"2024-01-01"}]
        }"#;
        let ledger: Ledger = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = ledger.category_names().collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn serialize_round_trips_through_json() {
        let mut ledger = Ledger::new();
        ledger.push("Food", Transaction::new(1, 12.5, "lunch", "2024-01-05"));
        ledger.push("Bills", Transaction::new(2, -30.0, "", "2024-01-06"));

        let json = serde_json::to_string(&ledger).unwrap();
        assert!(json.starts_with(r#"{"Food":[{"transaction_number":"1""#));
        let restored: Ledger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ledger);
    }
}
