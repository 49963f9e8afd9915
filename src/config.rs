//! Configuration for the history store.
//!
//! Values come from an optional JSON file and are then overridden by the
//! environment:
//! - `FIELD_HISTORY_CONFIG` - path of the JSON file to start from
//! - `FIELD_HISTORY_CAPACITY` - byte budget for all histories
//! - `FIELD_HISTORY_FILE` - where the history is loaded from and saved to
//!
//! The capacity is read once when the store is built and stays fixed for the
//! store's lifetime.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::history::{DEFAULT_CAPACITY, HistoryStore, persistence};

pub const ENV_CONFIG: &str = "FIELD_HISTORY_CONFIG";
pub const ENV_CAPACITY: &str = "FIELD_HISTORY_CAPACITY";
pub const ENV_FILE: &str = "FIELD_HISTORY_FILE";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Byte budget shared by every history id.
    pub capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            history_file: None,
        }
    }
}

impl HistoryConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config JSON at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup(ENV_CONFIG) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(raw) = lookup(ENV_CAPACITY) {
            config.capacity = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be a byte count, got {:?}", ENV_CAPACITY, raw))?;
        }
        if let Some(path) = lookup(ENV_FILE) {
            config.history_file = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            anyhow::bail!("history capacity must be greater than zero");
        }
        Ok(())
    }

    /// History file to use, falling back to the per-user default.
    pub fn history_path(&self) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(persistence::default_history_path)
    }

    /// Empty store, or the saved history when the history file exists.
    pub fn build_store(&self) -> Result<HistoryStore> {
        let path = self.history_path();
        if !path.exists() {
            return Ok(HistoryStore::with_capacity(self.capacity));
        }
        let state = persistence::load(&path)?;
        Ok(HistoryStore::restore(&state, self.capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = HistoryConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.capacity, 1024);
        assert_eq!(config.history_file, None);
    }

    #[test]
    fn test_env_overrides() {
        let config = HistoryConfig::from_lookup(lookup(&[
            (ENV_CAPACITY, " 4096 "),
            (ENV_FILE, "/tmp/hist.json"),
        ]))
        .unwrap();
        assert_eq!(config.capacity, 4096);
        assert_eq!(config.history_path(), PathBuf::from("/tmp/hist.json"));
    }

    #[test]
    fn test_bad_capacity() {
        let err = HistoryConfig::from_lookup(lookup(&[(ENV_CAPACITY, "lots")])).unwrap_err();
        assert!(err.to_string().contains(ENV_CAPACITY));

        assert!(HistoryConfig::from_lookup(lookup(&[(ENV_CAPACITY, "0")])).is_err());
    }

    #[test]
    fn test_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"capacity": 2048, "history_file": "/var/h.json"}"#).unwrap();
        let path_str = path.to_string_lossy().to_string();

        let config = HistoryConfig::from_lookup(lookup(&[(ENV_CONFIG, path_str.as_str())])).unwrap();
        assert_eq!(config.capacity, 2048);
        assert_eq!(config.history_file, Some(PathBuf::from("/var/h.json")));

        let config = HistoryConfig::from_lookup(lookup(&[
            (ENV_CONFIG, path_str.as_str()),
            (ENV_CAPACITY, "512"),
        ]))
        .unwrap();
        assert_eq!(config.capacity, 512);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{}").unwrap();
        assert_eq!(HistoryConfig::load(&path).unwrap(), HistoryConfig::default());
    }

    #[test]
    fn test_build_store_restores_saved_history() {
        let dir = tempfile::tempdir().unwrap();
        let config = HistoryConfig {
            capacity: 256,
            history_file: Some(dir.path().join("history.json")),
        };

        let store = config.build_store().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 256);

        let mut store = store;
        store.add(4, Some("saved"));
        persistence::save(&config.history_path(), &store.snapshot()).unwrap();

        let store = config.build_store().unwrap();
        assert_eq!(store.value_at(4, 0), Some("saved"));
    }
}
