//! Thread-safe handle to a single [`HistoryStore`].
//!
//! Every call holds the lock for the whole operation. `add` scans, splices
//! and appends in one critical section, which is what keeps each id free of
//! duplicates when several threads record input at once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::entry::HistoryId;
use super::persistence::PersistedHistory;
use super::store::{AddOutcome, HistoryStore};

#[derive(Clone, Debug, Default)]
pub struct SharedHistory {
    inner: Arc<Mutex<HistoryStore>>,
}

impl From<HistoryStore> for SharedHistory {
    fn from(store: HistoryStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }
}

impl SharedHistory {
    pub fn new(store: HistoryStore) -> Self {
        Self::from(store)
    }

    pub fn add(&self, owner_id: HistoryId, value: Option<&str>) -> AddOutcome {
        self.lock().add(owner_id, value)
    }

    pub fn count(&self, owner_id: HistoryId) -> usize {
        self.lock().count(owner_id)
    }

    /// Owned copy of the value, since the lock is released on return.
    pub fn value_at(&self, owner_id: HistoryId, index: usize) -> Option<String> {
        self.lock().value_at(owner_id, index).map(str::to_owned)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn snapshot(&self) -> PersistedHistory {
        self.lock().snapshot()
    }

    /// Run `f` with exclusive access to the store.
    pub fn with<R>(&self, f: impl FnOnce(&mut HistoryStore) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, HistoryStore> {
        // A panic inside `with` cannot leave a half-spliced list behind:
        // every store method finishes its mutation before returning.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
