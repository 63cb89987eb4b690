use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{errors::Result, ledger::Ledger, utils::write_atomic};

use super::StorageBackend;

/// Primary store file: a compact JSON object of category → records.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self) -> Result<Option<Ledger>> {
        load_ledger_from_path(&self.path)
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        save_ledger_to_path(ledger, &self.path)
    }
}

/// Writes the ledger without indentation, staging through a temporary file.
pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    let json = serde_json::to_string(ledger)?;
    write_atomic(path, &json)?;
    tracing::debug!(path = %path.display(), records = ledger.len(), "ledger saved");
    Ok(())
}

pub fn load_ledger_from_path(path: &Path) -> Result<Option<Ledger>> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_str(&data)?))
}
