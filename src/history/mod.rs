//! Input-field histories.
//!
//! Remembers the distinct values a user confirmed in each input field, keyed
//! by a small [`HistoryId`], so the field can recall them later. All fields
//! share a single [`HistoryStore`]; multi-threaded callers go through
//! [`SharedHistory`].

mod entry;
mod recall;
mod shared;
mod store;

pub mod persistence;

pub use entry::{ENTRY_OVERHEAD, HistoryEntry, HistoryId};
pub use persistence::PersistedHistory;
pub use recall::HistoryRecall;
pub use shared::SharedHistory;
pub use store::{AddOutcome, DEFAULT_CAPACITY, HistoryStore};
