use std::{env, io, path::PathBuf};

use crate::cli::{
    output,
    prompts::{
        prompt_amount, prompt_date, prompt_optional_amount, prompt_optional_date,
        prompt_required, InteractivePrompter, Prompter, ScriptPrompter,
    },
    table::{Alignment, Table, TableColumn},
    viewer::TableViewer,
    CliError,
};
use crate::config::{Config, ConfigManager};
use crate::core::{BulkImporter, LedgerStore, TransactionUpdate};
use crate::errors::LedgerError;
use crate::ledger::TransactionId;
use crate::storage::{JsonStorage, ViewCache};

const SCRIPT_ENV: &str = "FINANCE_TRACKER_CLI_SCRIPT";

pub enum LoopControl {
    Continue,
    Exit,
}

/// Loads configuration and the store, then runs the menu until exit.
///
/// Setting `FINANCE_TRACKER_CLI_SCRIPT` reads answers line by line from stdin.
pub fn run_cli() -> Result<(), CliError> {
    let manager = ConfigManager::new()?;
    let config = manager.load_or_init()?;
    let store = LedgerStore::open(Box::new(JsonStorage::new(manager.store_path(&config))));
    let view_cache = ViewCache::new(manager.view_cache_path(&config));

    let prompter: Box<dyn Prompter> = if env::var_os(SCRIPT_ENV).is_some() {
        Box::new(ScriptPrompter::new(io::stdin().lock()))
    } else {
        Box::new(InteractivePrompter::new())
    };

    Shell::new(store, config, view_cache, prompter).run()
}

pub struct Shell {
    store: LedgerStore,
    config: Config,
    view_cache: ViewCache,
    prompter: Box<dyn Prompter>,
}

impl Shell {
    pub fn new(
        store: LedgerStore,
        config: Config,
        view_cache: ViewCache,
        prompter: Box<dyn Prompter>,
    ) -> Self {
        Self {
            store,
            config,
            view_cache,
            prompter,
        }
    }

    /// Runs the main menu. The store is persisted once more on the way out,
    /// including when input runs dry.
    pub fn run(mut self) -> Result<(), CliError> {
        loop {
            print_menu();
            let outcome = self
                .prompter
                .text("Enter your choice")
                .and_then(|choice| self.dispatch(choice.trim()));
            match outcome {
                Ok(LoopControl::Continue) => {}
                Ok(LoopControl::Exit) => break,
                Err(CliError::InputClosed) => break,
                Err(CliError::Ledger(err)) => output::error(err),
                Err(err) => return Err(err),
            }
        }
        output::info("Exiting program.");
        self.store.close()?;
        Ok(())
    }

    fn dispatch(&mut self, choice: &str) -> Result<LoopControl, CliError> {
        match choice {
            "1" => self.add_transaction()?,
            "2" => self.view_transactions(),
            "3" => self.update_transaction()?,
            "4" => self.delete_transaction()?,
            "5" => self.display_summary(),
            "6" => self.bulk_import()?,
            "7" => {
                TableViewer::new(&self.store, &self.view_cache, self.prompter.as_mut()).run()?
            }
            "8" => return Ok(LoopControl::Exit),
            _ => output::warning("Invalid choice. Please try again."),
        }
        Ok(LoopControl::Continue)
    }

    fn add_transaction(&mut self) -> Result<(), CliError> {
        let prompter = self.prompter.as_mut();
        let category = prompt_required(prompter, "Enter transaction category")?;
        let amount = prompt_amount(
            prompter,
            &format!("Enter transaction amount ({})", self.config.currency_label),
        )?;
        let description = prompter.text("Enter transaction description (optional)")?;
        let date = prompt_date(prompter, "Enter transaction date (YYYY-MM-DD)")?;

        let transaction = self
            .store
            .add(category.trim(), amount, &description, &date)?;
        output::success(format!(
            "Transaction {} successfully added!",
            transaction.id
        ));
        Ok(())
    }

    fn view_transactions(&self) {
        if self.store.is_empty() {
            output::info("No transactions found.");
            return;
        }
        let mut table = Table::new(vec![
            TableColumn::new("Transaction #", Alignment::Right),
            TableColumn::new("Category", Alignment::Left).max_width(24),
            TableColumn::new(
                format!("Amount({})", self.config.currency_label),
                Alignment::Right,
            ),
            TableColumn::new("Date", Alignment::Left),
            TableColumn::new("Description", Alignment::Left).max_width(40),
        ]);
        for (category, txn) in self.store.transactions() {
            table.push_row(vec![
                txn.id.to_string(),
                category.to_string(),
                self.format_amount(txn.amount),
                txn.date.clone(),
                txn.description.clone(),
            ]);
        }
        output::plain(table.render());
    }

    fn update_transaction(&mut self) -> Result<(), CliError> {
        self.view_transactions();
        let Some(id) = self.prompt_id("Enter the transaction number to update")? else {
            output::warning("Transaction not found.");
            return Ok(());
        };
        let Some((category, current)) = self.store.find_by_id(id) else {
            output::warning("Transaction not found.");
            return Ok(());
        };
        output::section("Transaction found");
        output::plain(format!("Category: {}", category));
        output::plain(format!("Amount: {}", self.format_amount(current.amount)));
        output::plain(format!("Date: {}", current.date));
        output::plain(format!("Description: {}", current.description));

        let prompter = self.prompter.as_mut();
        let amount =
            prompt_optional_amount(prompter, "Enter the new amount or press Enter to keep current")?;
        let description =
            prompter.text("Enter the new description or press Enter to keep current")?;
        let date = prompt_optional_date(
            prompter,
            "Enter the new transaction date (YYYY-MM-DD) or press Enter to keep current",
        )?;
        let category = prompter.text("Enter the new category or press Enter to keep current")?;

        let changes = TransactionUpdate {
            amount,
            description: Some(description),
            date,
            category: Some(category.trim().to_string()),
        };
        match self.store.update(id, changes) {
            Ok(_) => output::success("Transaction successfully updated!"),
            Err(LedgerError::TransactionNotFound(_)) => output::warning("Transaction not found."),
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    fn delete_transaction(&mut self) -> Result<(), CliError> {
        self.view_transactions();
        let Some(id) = self.prompt_id("Enter the transaction number to delete")? else {
            output::warning("Transaction not found.");
            return Ok(());
        };
        match self.store.delete(id) {
            Ok(_) => output::success("Transaction successfully deleted!"),
            Err(LedgerError::TransactionNotFound(_)) => output::warning("Transaction not found."),
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    fn display_summary(&self) {
        let Some(summary) = self.store.aggregate() else {
            output::info("No transactions found.");
            return;
        };
        output::section("Summary");
        output::plain(format!(
            "Total Expenses: {}",
            self.format_amount(summary.grand_total)
        ));
        output::plain("Category-wise Expenses:");
        for entry in &summary.categories {
            output::plain(format!(
                "{}: {}",
                entry.category,
                self.format_amount(entry.total)
            ));
        }
    }

    fn bulk_import(&mut self) -> Result<(), CliError> {
        let filename =
            prompt_required(self.prompter.as_mut(), "Enter the filename to import transactions")?;
        let path = PathBuf::from(filename.trim());
        let importer = BulkImporter::new(self.config.import_options());
        match importer.import_file(&mut self.store, &path) {
            Ok(report) => {
                for skipped in &report.skipped {
                    output::warning(format!(
                        "Line {} skipped ({}): {}",
                        skipped.line_number, skipped.content, skipped.reason
                    ));
                }
                output::success(format!(
                    "Imported {} transactions, skipped {} lines.",
                    report.imported_count(),
                    report.skipped_count()
                ));
            }
            Err(err @ LedgerError::ImportSourceMissing(_)) => output::error(err),
            Err(err) => output::error(format!(
                "An error occurred while importing transactions: {err}"
            )),
        }
        Ok(())
    }

    /// Reads a transaction number; anything that is not one yields `None`.
    fn prompt_id(&mut self, prompt: &str) -> Result<Option<TransactionId>, CliError> {
        let answer = self.prompter.text(prompt)?;
        Ok(answer.trim().parse().ok())
    }

    fn format_amount(&self, amount: f64) -> String {
        format!("{} {:.2}", self.config.currency_label, amount)
    }
}

fn print_menu() {
    output::section("Personal Finance Tracker");
    output::plain("1. Add Transaction");
    output::plain("2. View Transactions");
    output::plain("3. Update Transaction");
    output::plain("4. Delete Transaction");
    output::plain("5. Display Summary");
    output::plain("6. Bulk Import Transactions from File");
    output::plain("7. Open Transaction Table");
    output::plain("8. Exit");
}
