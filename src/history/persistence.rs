//! Disk persistence for histories.
//!
//! Goal: a field's history survives program restarts. The file holds the
//! chronological sequence as-is; loading replays it through
//! [`HistoryStore::add`] so a hand-edited file still ends up deduplicated
//! and within budget.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::entry::HistoryEntry;
use super::store::HistoryStore;

pub const PERSIST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedHistory {
    pub version: u32,
    /// Budget the store had when it was saved. Informational only; the
    /// loading side decides its own capacity.
    pub capacity: usize,
    /// Oldest first.
    #[serde(default)]
    pub entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn snapshot(&self) -> PersistedHistory {
        PersistedHistory {
            version: PERSIST_VERSION,
            capacity: self.capacity(),
            entries: self.entries().cloned().collect(),
        }
    }

    /// Rebuild a store of `capacity` bytes from a saved state.
    pub fn restore(state: &PersistedHistory, capacity: usize) -> Self {
        let mut store = Self::with_capacity(capacity);
        for entry in &state.entries {
            store.add(entry.owner_id, Some(&entry.value));
        }
        store
    }
}

pub fn default_history_path() -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    home.join(".field-history").join("history.json")
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create history directory: {}", parent.display()))?;
    }
    Ok(())
}

fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    ensure_parent_dir(path)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).with_context(|| format!("Failed to write temp file: {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| {
        format!(
            "Failed to replace {} with {}",
            path.display(),
            tmp.display()
        )
    })?;
    Ok(())
}

pub fn load(path: &Path) -> anyhow::Result<PersistedHistory> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let state: PersistedHistory =
        serde_json::from_str(&raw).with_context(|| format!("Invalid history JSON at {}", path.display()))?;
    if state.version != PERSIST_VERSION {
        anyhow::bail!(
            "Unsupported history version {} in {} (expected {})",
            state.version,
            path.display(),
            PERSIST_VERSION
        );
    }
    info!(entries = state.entries.len(), "loaded history from {}", path.display());
    Ok(state)
}

pub fn save(path: &Path, state: &PersistedHistory) -> anyhow::Result<()> {
    let data = serde_json::to_vec_pretty(state).context("Failed to serialize history")?;
    write_atomic(path, &data)?;
    info!(entries = state.entries.len(), "saved history to {}", path.display());
    Ok(())
}
