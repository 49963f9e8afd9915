//! The chronological history store.
//!
//! Every logical history lives in one insertion-ordered sequence; an owner id
//! is a filter over that sequence, not a key into a separate container. The
//! sequence is kept as a doubly-linked list threaded through an arena of
//! slots, so removing an entry in the middle never shifts its neighbours and
//! freed slots are handed out again on the next insert.
//!
//! # Capacity
//!
//! The store enforces its byte budget (see [`HistoryEntry::cost`]). When an
//! insert would exceed it, the oldest entries are evicted regardless of
//! which id owns them. A value that could never fit is not stored at all.

use tracing::{debug, warn};

use super::entry::{HistoryEntry, HistoryId, cost_of};

/// Default budget in bytes for all histories together.
pub const DEFAULT_CAPACITY: usize = 1024;

/// What [`HistoryStore::add`] did with a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// No value was supplied.
    Ignored,
    /// The value alone is larger than the whole capacity.
    Rejected,
    /// A new entry was appended.
    Inserted { evicted: usize },
    /// The value was already present for this id and is now the newest.
    Moved { evicted: usize },
}

#[derive(Clone, Debug)]
struct Slot {
    entry: HistoryEntry,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct HistoryStore {
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    /// Oldest entry.
    head: Option<usize>,
    /// Newest entry.
    tail: Option<usize>,
    len: usize,
    used: usize,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty store with a byte budget. The budget cannot be
    /// changed afterwards.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            used: 0,
            capacity,
        }
    }

    /// Remember `value` as the newest entry of history `owner_id`.
    ///
    /// An earlier entry with the same value for the same id is removed first,
    /// so each id holds a value at most once. `None` leaves the store as is.
    pub fn add(&mut self, owner_id: HistoryId, value: Option<&str>) -> AddOutcome {
        let Some(value) = value else {
            return AddOutcome::Ignored;
        };

        let cost = cost_of(value);
        if cost > self.capacity {
            warn!(
                owner_id,
                cost,
                capacity = self.capacity,
                "history value larger than capacity, not stored"
            );
            return AddOutcome::Rejected;
        }

        let moved = match self.find(owner_id, value) {
            Some(idx) => self.unlink(idx).is_some(),
            None => false,
        };

        let mut evicted = 0;
        while self.used + cost > self.capacity {
            let Some(oldest) = self.head else {
                break;
            };
            let Some(gone) = self.unlink(oldest) else {
                break;
            };
            debug!(owner_id = gone.owner_id, "evicted oldest history entry");
            evicted += 1;
        }

        self.link_back(HistoryEntry::new(owner_id, value));
        debug!(owner_id, moved, evicted, "history entry added");

        if moved {
            AddOutcome::Moved { evicted }
        } else {
            AddOutcome::Inserted { evicted }
        }
    }

    /// Number of entries held for `owner_id`.
    pub fn count(&self, owner_id: HistoryId) -> usize {
        self.matching(owner_id).count()
    }

    /// The `index`-th value of `owner_id`, counting from the oldest (0) to
    /// the newest (`count - 1`).
    ///
    /// Callers wanting "most recent first" should index from the end or use
    /// [`HistoryRecall`](super::HistoryRecall).
    pub fn value_at(&self, owner_id: HistoryId, index: usize) -> Option<&str> {
        self.values(owner_id).nth(index)
    }

    /// Drop every entry of every id.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
        self.used = 0;
    }

    /// Values of `owner_id`, oldest first.
    pub fn values(&self, owner_id: HistoryId) -> impl Iterator<Item = &str> + '_ {
        self.matching(owner_id)
            .map(|(_, entry)| entry.value.as_str())
    }

    /// All entries in chronological order.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let slot = self.slot(cursor?)?;
            cursor = slot.next;
            Some(&slot.entry)
        })
    }

    /// Ids that currently own entries, in order of their oldest entry.
    pub fn ids(&self) -> Vec<HistoryId> {
        let mut ids = Vec::new();
        for entry in self.entries() {
            if !ids.contains(&entry.owner_id) {
                ids.push(entry.owner_id);
            }
        }
        ids
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn used_bytes(&self) -> usize {
        self.used
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Every slot owned by `owner_id`, oldest first.
    fn matching(&self, owner_id: HistoryId) -> impl Iterator<Item = (usize, &HistoryEntry)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let idx = self.seek(owner_id, cursor)?;
            let slot = self.slot(idx)?;
            cursor = slot.next;
            Some((idx, &slot.entry))
        })
    }

    /// Walk forward from `cursor` (inclusive) to the next slot of `owner_id`.
    fn seek(&self, owner_id: HistoryId, mut cursor: Option<usize>) -> Option<usize> {
        while let Some(idx) = cursor {
            let slot = self.slot(idx)?;
            if slot.entry.owner_id == owner_id {
                return Some(idx);
            }
            cursor = slot.next;
        }
        None
    }

    fn find(&self, owner_id: HistoryId, value: &str) -> Option<usize> {
        self.matching(owner_id)
            .find(|(_, entry)| entry.value == value)
            .map(|(idx, _)| idx)
    }

    fn slot(&self, idx: usize) -> Option<&Slot> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, idx: usize) -> Option<&mut Slot> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn link_back(&mut self, entry: HistoryEntry) {
        let cost = entry.cost();
        let slot = Slot {
            entry,
            prev: self.tail,
            next: None,
        };

        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(slot);
                idx
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };

        match self.tail.and_then(|tail| self.slot_mut(tail)) {
            Some(tail) => tail.next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
        self.used += cost;
    }

    /// Splice slot `idx` out of the sequence and release it for reuse.
    fn unlink(&mut self, idx: usize) -> Option<HistoryEntry> {
        let slot = self.slots.get_mut(idx)?.take()?;

        match slot.prev.and_then(|prev| self.slot_mut(prev)) {
            Some(prev) => prev.next = slot.next,
            None => self.head = slot.next,
        }
        match slot.next.and_then(|next| self.slot_mut(next)) {
            Some(next) => next.prev = slot.prev,
            None => self.tail = slot.prev,
        }

        self.free.push(idx);
        self.len -= 1;
        self.used -= slot.entry.cost();
        Some(slot.entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::ENTRY_OVERHEAD;

    fn values(store: &HistoryStore, id: HistoryId) -> Vec<&str> {
        store.values(id).collect()
    }

    #[test]
    fn test_remove_middle_keeps_links() {
        let mut store = HistoryStore::new();
        store.add(1, Some("a"));
        store.add(2, Some("b"));
        store.add(1, Some("c"));
        store.add(2, Some("d"));

        // moving "b" splices it out between "a" and "c"
        assert_eq!(store.add(2, Some("b")), AddOutcome::Moved { evicted: 0 });

        let all: Vec<&str> = store.entries().map(|e| e.value.as_str()).collect();
        assert_eq!(all, vec!["a", "c", "d", "b"]);
        assert_eq!(values(&store, 2), vec!["d", "b"]);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_move_head_and_tail() {
        let mut store = HistoryStore::new();
        store.add(1, Some("a"));
        store.add(1, Some("b"));

        // newest re-added stays in place
        store.add(1, Some("b"));
        assert_eq!(values(&store, 1), vec!["a", "b"]);

        // oldest re-added becomes newest
        store.add(1, Some("a"));
        assert_eq!(values(&store, 1), vec!["b", "a"]);
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut store = HistoryStore::new();
        store.add(1, Some("a"));
        store.add(1, Some("b"));
        for _ in 0..100 {
            store.add(1, Some("a"));
            store.add(1, Some("b"));
        }
        assert_eq!(store.slot_count(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_eviction_drops_oldest_across_ids() {
        // room for exactly three one-byte values
        let mut store = HistoryStore::with_capacity(3 * (1 + ENTRY_OVERHEAD));
        store.add(1, Some("a"));
        store.add(2, Some("b"));
        store.add(1, Some("c"));
        assert_eq!(store.used_bytes(), store.capacity());

        assert_eq!(store.add(3, Some("d")), AddOutcome::Inserted { evicted: 1 });
        assert_eq!(values(&store, 1), vec!["c"]);
        assert_eq!(values(&store, 2), vec!["b"]);
        assert_eq!(values(&store, 3), vec!["d"]);
        assert!(store.used_bytes() <= store.capacity());
    }

    #[test]
    fn test_eviction_frees_enough_for_long_value() {
        let mut store = HistoryStore::with_capacity(12);
        store.add(1, Some("aa")); // 4
        store.add(1, Some("bb")); // 8
        store.add(1, Some("cc")); // 12

        assert_eq!(store.add(2, Some("dddddd")), AddOutcome::Inserted { evicted: 2 });
        assert_eq!(values(&store, 1), vec!["cc"]);
        assert_eq!(store.used_bytes(), 12);
    }

    #[test]
    fn test_dedup_happens_before_eviction() {
        let mut store = HistoryStore::with_capacity(3 * (1 + ENTRY_OVERHEAD));
        store.add(1, Some("a"));
        store.add(1, Some("b"));
        store.add(1, Some("c"));

        // re-adding frees its own space, so nothing else goes
        assert_eq!(store.add(1, Some("a")), AddOutcome::Moved { evicted: 0 });
        assert_eq!(values(&store, 1), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_oversize_value_is_rejected() {
        let mut store = HistoryStore::with_capacity(8);
        store.add(1, Some("keep"));

        assert_eq!(store.add(1, Some("far too long")), AddOutcome::Rejected);
        assert_eq!(values(&store, 1), vec!["keep"]);

        // exactly the capacity still fits
        assert_eq!(store.add(2, Some("sixsix")), AddOutcome::Inserted { evicted: 1 });
        assert_eq!(store.count(1), 0);
    }

    #[test]
    fn test_ids_in_order_of_oldest_entry() {
        let mut store = HistoryStore::new();
        store.add(7, Some("x"));
        store.add(3, Some("y"));
        store.add(7, Some("z"));
        assert_eq!(store.ids(), vec![7, 3]);
    }

    #[test]
    fn test_used_bytes_tracks_entries() {
        let mut store = HistoryStore::new();
        store.add(1, Some("abc"));
        store.add(2, Some("de"));
        assert_eq!(store.used_bytes(), 5 + 2 * ENTRY_OVERHEAD);

        store.add(1, Some("abc"));
        assert_eq!(store.used_bytes(), 5 + 2 * ENTRY_OVERHEAD);

        store.clear();
        assert_eq!(store.used_bytes(), 0);
        assert!(store.is_empty());
    }
}
