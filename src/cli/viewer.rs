//! Table view with search and sort over a fresh snapshot of the store.

use crate::cli::{output, prompts::Prompter, table, CliError};
use crate::core::LedgerStore;
use crate::storage::ViewCache;
use crate::view::{self, Snapshot, SortMode, ViewRow};

pub struct TableViewer<'a> {
    store: &'a LedgerStore,
    cache: &'a ViewCache,
    prompter: &'a mut dyn Prompter,
}

impl<'a> TableViewer<'a> {
    pub fn new(
        store: &'a LedgerStore,
        cache: &'a ViewCache,
        prompter: &'a mut dyn Prompter,
    ) -> Self {
        Self {
            store,
            cache,
            prompter,
        }
    }

    /// Shows every transaction, then serves search/sort requests until "Back".
    pub fn run(&mut self) -> Result<(), CliError> {
        self.display(&self.snapshot().rows());
        loop {
            output::section("Transaction Table");
            output::plain("1. Search");
            output::plain("2. Sort");
            output::plain("3. Refresh");
            output::plain("4. Back");
            let choice = self.prompter.text("Enter your choice")?;
            match choice.trim() {
                "1" => self.search()?,
                "2" => self.sort()?,
                "3" => self.display(&self.snapshot().rows()),
                "4" => return Ok(()),
                _ => output::warning("Invalid choice. Please try again."),
            }
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::from_ledger(self.store.ledger())
    }

    fn search(&mut self) -> Result<(), CliError> {
        let term = self.prompter.text("Search")?;
        let hits = view::filter(&self.snapshot(), &term);
        if hits.is_empty() {
            output::info("No search found.");
        }
        self.display(&hits.rows());
        Ok(())
    }

    fn sort(&mut self) -> Result<(), CliError> {
        for (idx, mode) in SortMode::ALL.iter().enumerate() {
            output::plain(format!("{}. {}", idx + 1, mode));
        }
        let choice = self.prompter.text("Sort by")?;
        let mode = choice
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| SortMode::ALL.get(idx).copied());
        match mode {
            Some(mode) => self.display(&view::sort(&self.snapshot(), mode)),
            None => output::warning("Invalid choice. Please try again."),
        }
        Ok(())
    }

    /// Prints `rows` and refreshes the view cache with the full snapshot.
    fn display(&self, rows: &[ViewRow]) {
        output::plain(render_rows(rows));
        if let Err(err) = self.cache.write(self.snapshot().ledger()) {
            tracing::warn!(
                error = %err,
                path = %self.cache.path().display(),
                "view cache not written"
            );
            output::warning(format!("Could not write view cache: {err}"));
        }
    }
}

pub fn render_rows(rows: &[ViewRow]) -> String {
    use table::{Alignment, Table, TableColumn};

    let mut table = Table::new(vec![
        TableColumn::new("Transaction Number", Alignment::Right),
        TableColumn::new("Amount", Alignment::Right),
        TableColumn::new("Category", Alignment::Left).max_width(24),
        TableColumn::new("Date", Alignment::Left),
    ]);
    for row in rows {
        table.push_row(vec![
            row.id.to_string(),
            format!("{:.2}", row.amount),
            row.category.clone(),
            row.date.clone(),
        ]);
    }
    table.render()
}
