//! Read-only projections used by the table viewer.
//!
//! Everything here works on a [`Snapshot`] copied from the store and is
//! recomputed per request; nothing writes back into the ledger.

use std::{cmp::Ordering, fmt};

use chrono::NaiveDate;

use crate::ledger::{Ledger, Transaction, TransactionId};

/// Owned copy of the ledger with category names trimmed.
///
/// Categories whose names only differ by surrounding whitespace are merged,
/// in the order their records are encountered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    ledger: Ledger,
}

impl Snapshot {
    pub fn from_ledger(source: &Ledger) -> Self {
        let mut ledger = Ledger::new();
        for (category, transaction) in source.transactions() {
            ledger.push(category.trim(), transaction.clone());
        }
        Self { ledger }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Rows in category order, then append order.
    pub fn rows(&self) -> Vec<ViewRow> {
        self.ledger
            .transactions()
            .map(|(category, txn)| ViewRow::new(category, txn))
            .collect()
    }
}

/// One table line: a record together with its category.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow {
    pub id: TransactionId,
    pub amount: f64,
    pub category: String,
    pub date: String,
    pub description: String,
}

impl ViewRow {
    fn new(category: &str, transaction: &Transaction) -> Self {
        Self {
            id: transaction.id,
            amount: transaction.amount,
            category: category.to_string(),
            date: transaction.date.clone(),
            description: transaction.description.clone(),
        }
    }

    fn parsed_date(&self) -> Option<NaiveDate> {
        crate::ledger::parse_date(&self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Oldest to newest across every category.
    Date,
    /// Categories A to Z, records in their stored order.
    Category,
    /// Smallest to largest inside each category.
    Amount,
    /// Ascending transaction number inside each category.
    Id,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Date,
        SortMode::Category,
        SortMode::Amount,
        SortMode::Id,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Date => "Date (Oldest to Newest)",
            SortMode::Category => "Category (A to Z)",
            SortMode::Amount => "Amount (Smallest to Largest), category wise",
            SortMode::Id => "Transaction Number (Ascending), category wise",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keeps records matching `term`.
///
/// A record matches when any whitespace-separated token of `term` occurs in
/// the text of one of its fields, or when the whole `term` occurs in its
/// category name. Matching ignores case.
pub fn filter(snapshot: &Snapshot, term: &str) -> Snapshot {
    let needle = term.to_lowercase();
    let tokens: Vec<&str> = needle.split_whitespace().collect();

    let mut ledger = Ledger::new();
    for entry in snapshot.ledger.categories() {
        let category_hit = entry.name.to_lowercase().contains(&needle);
        for txn in &entry.transactions {
            if category_hit || record_matches(txn, &tokens) {
                ledger.push(&entry.name, txn.clone());
            }
        }
    }
    Snapshot { ledger }
}

fn record_matches(transaction: &Transaction, tokens: &[&str]) -> bool {
    if tokens.is_empty() {
        return false;
    }
    let fields = [
        transaction.id.to_string(),
        amount_text(transaction.amount),
        transaction.description.to_lowercase(),
        transaction.date.to_lowercase(),
    ];
    tokens
        .iter()
        .any(|token| fields.iter().any(|field| field.contains(token)))
}

/// Text form of an amount used for matching; whole numbers keep a `.0` and
/// exponents are signed with at least two digits (`1e+16`, `1e-05`).
fn amount_text(amount: f64) -> String {
    let text = format!("{:?}", amount).to_lowercase();
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

/// Orders the snapshot's rows for `mode`. All sorts are stable.
pub fn sort(snapshot: &Snapshot, mode: SortMode) -> Vec<ViewRow> {
    match mode {
        SortMode::Date => {
            let mut rows = snapshot.rows();
            let undated = rows.iter().filter(|row| row.parsed_date().is_none()).count();
            if undated > 0 {
                tracing::warn!(undated, "records with unparsable dates sorted last");
            }
            rows.sort_by(|a, b| compare_dates(a.parsed_date(), b.parsed_date()));
            rows
        }
        SortMode::Category => {
            let mut entries: Vec<_> = snapshot.ledger.categories().iter().collect();
            entries.sort_by(|a, b| a.name.cmp(&b.name));
            entries
                .into_iter()
                .flat_map(|entry| {
                    entry
                        .transactions
                        .iter()
                        .map(move |txn| ViewRow::new(&entry.name, txn))
                })
                .collect()
        }
        SortMode::Amount => {
            sort_within_categories(snapshot, |a, b| a.amount.total_cmp(&b.amount))
        }
        SortMode::Id => sort_within_categories(snapshot, |a, b| a.id.cmp(&b.id)),
    }
}

fn sort_within_categories<F>(snapshot: &Snapshot, compare: F) -> Vec<ViewRow>
where
    F: Fn(&Transaction, &Transaction) -> Ordering,
{
    let mut rows = Vec::with_capacity(snapshot.ledger.len());
    for entry in snapshot.ledger.categories() {
        let mut transactions: Vec<&Transaction> = entry.transactions.iter().collect();
        transactions.sort_by(|a, b| compare(*a, *b));
        rows.extend(
            transactions
                .into_iter()
                .map(|txn| ViewRow::new(&entry.name, txn)),
        );
    }
    rows
}

/// Valid dates ascend; unparsable ones go last.
fn compare_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
