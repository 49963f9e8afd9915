//! A single remembered value and what it costs to keep it.

use serde::{Deserialize, Serialize};

/// Key that scopes entries to one logical history (one input field).
pub type HistoryId = u8;

/// Bytes charged per entry on top of the value itself: one for the owner id
/// and one for the length marker of the packed history block layout.
pub const ENTRY_OVERHEAD: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub owner_id: HistoryId,
    pub value: String,
}

impl HistoryEntry {
    pub fn new(owner_id: HistoryId, value: impl Into<String>) -> Self {
        Self {
            owner_id,
            value: value.into(),
        }
    }

    /// Bytes this entry occupies in the capacity budget.
    pub fn cost(&self) -> usize {
        cost_of(&self.value)
    }
}

pub(crate) fn cost_of(value: &str) -> usize {
    value.len() + ENTRY_OVERHEAD
}
