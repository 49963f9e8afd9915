use super::entry::HistoryId;
use super::store::HistoryStore;

/// Browsing position of one input field inside its history.
///
/// Walks newest to oldest with [`older`](Self::older), the way an up-arrow
/// recall does. The store keeps its own oldest-first indexing; this type only
/// translates an offset from the newest entry into a `value_at` index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecall {
    owner_id: HistoryId,
    /// Steps back from the newest entry. `None` means fresh input.
    offset: Option<usize>,
}

impl HistoryRecall {
    pub fn new(owner_id: HistoryId) -> Self {
        Self {
            owner_id,
            offset: None,
        }
    }

    pub fn owner_id(&self) -> HistoryId {
        self.owner_id
    }

    pub fn reset(&mut self) {
        self.offset = None;
    }

    /// Step one entry further into the past. Returns `None` once the oldest
    /// entry has been shown.
    pub fn older<'a>(&mut self, store: &'a HistoryStore) -> Option<&'a str> {
        let count = store.count(self.owner_id);
        let next = self.offset.map_or(0, |offset| offset + 1);
        if next >= count {
            self.offset = count.checked_sub(1);
            return None;
        }

        self.offset = Some(next);
        store.value_at(self.owner_id, count - 1 - next)
    }

    /// Step back toward the newest entry. Moving past it returns `None` and
    /// puts the field back on fresh input.
    pub fn newer<'a>(&mut self, store: &'a HistoryStore) -> Option<&'a str> {
        let count = store.count(self.owner_id);
        match self.offset {
            Some(offset) if offset > 0 && offset <= count => {
                self.offset = Some(offset - 1);
                store.value_at(self.owner_id, count - offset)
            }
            _ => {
                self.offset = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> HistoryStore {
        let mut store = HistoryStore::new();
        store.add(1, Some("first"));
        store.add(2, Some("other"));
        store.add(1, Some("second"));
        store.add(1, Some("third"));
        store
    }

    #[test]
    fn test_older_walks_newest_first() {
        let store = store();
        let mut recall = HistoryRecall::new(1);

        assert_eq!(recall.older(&store), Some("third"));
        assert_eq!(recall.older(&store), Some("second"));
        assert_eq!(recall.older(&store), Some("first"));
        assert_eq!(recall.older(&store), None);
        // stays parked on the oldest
        assert_eq!(recall.newer(&store), Some("second"));
    }

    #[test]
    fn test_newer_returns_to_fresh_input() {
        let store = store();
        let mut recall = HistoryRecall::new(1);

        recall.older(&store);
        recall.older(&store);
        assert_eq!(recall.newer(&store), Some("third"));
        assert_eq!(recall.newer(&store), None);
        assert_eq!(recall.older(&store), Some("third"));
    }

    #[test]
    fn test_empty_history() {
        let store = HistoryStore::new();
        let mut recall = HistoryRecall::new(9);
        assert_eq!(recall.older(&store), None);
        assert_eq!(recall.newer(&store), None);
    }

    #[test]
    fn test_reset_after_commit() {
        let mut store = store();
        let mut recall = HistoryRecall::new(1);
        recall.older(&store);
        recall.older(&store);

        store.add(1, Some("fourth"));
        recall.reset();
        assert_eq!(recall.older(&store), Some("fourth"));
    }
}
