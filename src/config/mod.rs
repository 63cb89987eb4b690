use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    core::ImportOptions,
    errors::{LedgerError, Result},
    utils::{app_data_dir, ensure_dir, resolve_in, write_atomic},
};

const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Durable store file, relative to the data directory unless absolute.
    pub store_file: PathBuf,
    /// Pretty-printed copy refreshed by the table viewer.
    pub view_cache_file: PathBuf,
    /// Reject imported dates that are not `YYYY-MM-DD`.
    pub strict_import_dates: bool,
    pub currency_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_file: PathBuf::from("expenses.json"),
            view_cache_file: PathBuf::from("transactions.json"),
            strict_import_dates: false,
            currency_label: "Rs.".into(),
        }
    }
}

impl Config {
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            strict_dates: self.strict_import_dates,
        }
    }
}

/// Loads and saves [`Config`] under the application data directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        let path = base.join(CONFIG_DIR).join(CONFIG_FILE);
        Ok(Self { base, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config file, falling back to defaults when it does not exist.
    pub fn load(&self) -> Result<Config> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&data).map_err(|err| {
            LedgerError::Config(format!("{}: {}", self.path.display(), err))
        })
    }

    /// Like [`ConfigManager::load`], but writes the defaults out on first run.
    pub fn load_or_init(&self) -> Result<Config> {
        if self.path.exists() {
            return self.load();
        }
        let config = Config::default();
        self.save(&config)?;
        tracing::info!(path = %self.path.display(), "wrote default configuration");
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }

    pub fn store_path(&self, config: &Config) -> PathBuf {
        resolve_in(&self.base, &config.store_file)
    }

    pub fn view_cache_path(&self, config: &Config) -> PathBuf {
        resolve_in(&self.base, &config.view_cache_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            manager.store_path(&config),
            dir.path().join("expenses.json")
        );
        assert_eq!(
            manager.view_cache_path(&config),
            dir.path().join("transactions.json")
        );
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = Config {
            strict_import_dates: true,
            currency_label: "EUR".into(),
            ..Config::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert!(config.import_options().strict_dates);
    }

    #[test]
    fn load_or_init_writes_defaults_once() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert!(!manager.path().exists());

        assert_eq!(manager.load_or_init().unwrap(), Config::default());
        assert!(manager.path().exists());

        let edited = Config {
            currency_label: "USD".into(),
            ..Config::default()
        };
        manager.save(&edited).unwrap();
        assert_eq!(manager.load_or_init().unwrap(), edited);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        write_atomic(manager.path(), r#"{"store_file":"/tmp/ledger.json"}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.store_file, PathBuf::from("/tmp/ledger.json"));
        assert_eq!(config.currency_label, "Rs.");
        assert_eq!(
            manager.store_path(&config),
            PathBuf::from("/tmp/ledger.json")
        );
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        write_atomic(manager.path(), "not json").unwrap();
        assert!(matches!(manager.load(), Err(LedgerError::Config(_))));
    }
}
