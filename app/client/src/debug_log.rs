//! Append-only trace of every observed frame.

use protocol::DebugLog;
use std::collections::{VecDeque, vec_deque};

/// Ordered debug log.
///
/// Entries are never reordered, deduplicated or mutated. Without a capacity
/// the log grows without bound; with one it evicts the oldest entries first.
#[derive(Debug, Clone, Default)]
pub struct DebugLogStore {
    entries: VecDeque<DebugLog>,
    capacity: Option<usize>,
}

impl DebugLogStore {
    /// An unbounded log.
    pub fn new() -> Self {
        Self::default()
    }

    /// A log keeping at most `capacity` entries. `None` or zero is unbounded.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.filter(|c| *c > 0),
        }
    }

    /// Append one entry.
    pub fn append(&mut self, entry: DebugLog) {
        if let Some(capacity) = self.capacity
            && self.entries.len() >= capacity
        {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Append entries in order.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = DebugLog>) {
        for entry in entries {
            self.append(entry);
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in arrival order.
    pub fn all(&self) -> vec_deque::Iter<'_, DebugLog> {
        self.entries.iter()
    }

    /// Entry at `index`, oldest first.
    pub fn get(&self, index: usize) -> Option<&DebugLog> {
        self.entries.get(index)
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&DebugLog> {
        self.entries.back()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}
