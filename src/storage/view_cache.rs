use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::{errors::Result, ledger::Ledger, utils::write_atomic};

const INDENT: &[u8] = b"    ";

/// Pretty-printed copy of the ledger written each time the table viewer
/// displays rows. Derived data only; nothing reads it back.
#[derive(Debug, Clone)]
pub struct ViewCache {
    path: PathBuf,
}

impl ViewCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, ledger: &Ledger) -> Result<()> {
        let json = to_pretty_json(ledger)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), "view cache refreshed");
        Ok(())
    }
}

fn to_pretty_json(ledger: &Ledger) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    ledger.serialize(&mut serializer)?;
    // serde_json only emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Transaction;

    #[test]
    fn writes_four_space_indented_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ViewCache::new(dir.path().join("transactions.json"));
        let mut ledger = Ledger::new();
        ledger.push("Food", Transaction::new(1, 2.0, "", "2024-01-05"));

        cache.write(&ledger).unwrap();
        let raw = std::fs::read_to_string(cache.path()).unwrap();
        assert!(raw.starts_with("{\n    \"Food\": [\n        {\n"), "got: {raw}");
        assert!(raw.contains("            \"transaction_number\": \"1\""));
        let restored: Ledger = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored, ledger);
    }
}
