//! field-history - remembered values for input fields
//!
//! This library provides:
//! - One store shared by any number of input-field histories, each keyed by
//!   a small integer id, with dedup-by-move and a byte budget
//! - A thread-safe handle and a per-field recall cursor on top of it
//! - JSON persistence, configuration and logging setup for the driver binary
//!
//! # Example
//!
//! ```
//! use field_history::HistoryStore;
//!
//! let mut store = HistoryStore::new();
//! store.add(1, Some("foo"));
//! store.add(1, Some("bar"));
//! store.add(1, Some("foo"));
//!
//! assert_eq!(store.count(1), 2);
//! assert_eq!(store.value_at(1, 0), Some("bar"));
//! assert_eq!(store.value_at(1, 1), Some("foo"));
//! assert_eq!(store.value_at(1, 2), None);
//! ```

pub mod command;
pub mod config;
pub mod history;
pub mod utils;

// Re-export commonly used types
pub use config::HistoryConfig;
pub use history::{
    AddOutcome, HistoryEntry, HistoryId, HistoryRecall, HistoryStore, PersistedHistory,
    SharedHistory,
};
