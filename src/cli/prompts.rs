use std::io::{self, BufRead, Write};

use dialoguer::{theme::ColorfulTheme, Input};

use crate::cli::{output, CliError};
use crate::ledger::{parse_amount, validate_date};

/// Source of answers for the menu shell.
pub trait Prompter {
    /// Asks `prompt` and returns the raw answer without its line ending.
    ///
    /// Returns [`CliError::InputClosed`] once no more input can arrive.
    fn text(&mut self, prompt: &str) -> Result<String, CliError>;
}

/// Terminal prompts rendered with dialoguer.
pub struct InteractivePrompter {
    theme: ColorfulTheme,
}

impl InteractivePrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for InteractivePrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for InteractivePrompter {
    fn text(&mut self, prompt: &str) -> Result<String, CliError> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(CliError::from)
    }
}

/// Reads one answer per line, e.g. from piped stdin.
pub struct ScriptPrompter<R> {
    reader: R,
}

impl<R: BufRead> ScriptPrompter<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> Prompter for ScriptPrompter<R> {
    fn text(&mut self, prompt: &str) -> Result<String, CliError> {
        print!("{}: ", prompt);
        io::stdout().flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            println!();
            return Err(CliError::InputClosed);
        }
        let answer = line.trim_end_matches(&['\r', '\n'][..]).to_string();
        println!("{}", answer);
        Ok(answer)
    }
}

/// Re-prompts until a non-blank answer is given.
pub fn prompt_required(prompter: &mut dyn Prompter, prompt: &str) -> Result<String, CliError> {
    loop {
        let answer = prompter.text(prompt)?;
        if !answer.trim().is_empty() {
            return Ok(answer);
        }
        output::warning("A value is required.");
    }
}

pub fn prompt_amount(prompter: &mut dyn Prompter, prompt: &str) -> Result<f64, CliError> {
    loop {
        match parse_amount(&prompter.text(prompt)?) {
            Ok(amount) => return Ok(amount),
            Err(_) => output::warning("Please enter a valid amount!"),
        }
    }
}

/// Like [`prompt_amount`], but an empty answer means "keep current".
pub fn prompt_optional_amount(
    prompter: &mut dyn Prompter,
    prompt: &str,
) -> Result<Option<f64>, CliError> {
    loop {
        let answer = prompter.text(prompt)?;
        if answer.trim().is_empty() {
            return Ok(None);
        }
        match parse_amount(&answer) {
            Ok(amount) => return Ok(Some(amount)),
            Err(_) => output::warning("Please enter a valid amount!"),
        }
    }
}

pub fn prompt_date(prompter: &mut dyn Prompter, prompt: &str) -> Result<String, CliError> {
    loop {
        match validate_date(&prompter.text(prompt)?) {
            Ok(date) => return Ok(date),
            Err(_) => output::warning("Invalid date format. Please use YYYY-MM-DD."),
        }
    }
}

/// Like [`prompt_date`], but an empty answer means "keep current".
pub fn prompt_optional_date(
    prompter: &mut dyn Prompter,
    prompt: &str,
) -> Result<Option<String>, CliError> {
    loop {
        let answer = prompter.text(prompt)?;
        if answer.trim().is_empty() {
            return Ok(None);
        }
        match validate_date(&answer) {
            Ok(date) => return Ok(Some(date)),
            Err(_) => output::warning("Invalid date format. Please use YYYY-MM-DD."),
        }
    }
}
