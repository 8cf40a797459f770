//! Bounded undo/redo history
//!
//! One manager per list. Every snapshot is an owned copy; nothing handed
//! out aliases the stored states.

use std::collections::VecDeque;

use crate::models::Phrase;

pub const DEFAULT_CAPACITY: usize = 50;

pub type Snapshot = Vec<Phrase>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryManager {
    snapshots: VecDeque<Snapshot>,
    current_index: usize,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            current_index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Rebuild a manager from persisted parts. Returns `None` when the
    /// cursor or length do not fit.
    pub fn from_parts(capacity: usize, current_index: usize, snapshots: Vec<Snapshot>) -> Option<Self> {
        if capacity == 0 || snapshots.len() > capacity {
            return None;
        }
        if !snapshots.is_empty() && current_index >= snapshots.len() {
            return None;
        }
        if snapshots.is_empty() && current_index != 0 {
            return None;
        }
        Some(Self {
            snapshots: snapshots.into(),
            current_index,
            capacity,
        })
    }

    /// Reset to a single snapshot at index 0
    pub fn set_initial_state(&mut self, state: &[Phrase]) {
        self.snapshots.clear();
        self.snapshots.push_back(state.to_vec());
        self.current_index = 0;
    }

    /// Drop any redo branch, append, and advance the cursor
    pub fn add_state(&mut self, state: &[Phrase]) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.current_index + 1);
        }
        self.snapshots.push_back(state.to_vec());
        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.current_index = self.snapshots.len() - 1;
    }

    pub fn undo(&mut self) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.current_index -= 1;
        self.snapshots.get(self.current_index).cloned()
    }

    pub fn redo(&mut self) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.current_index += 1;
        self.snapshots.get(self.current_index).cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_index + 1 < self.snapshots.len()
    }

    /// Copy of the snapshot under the cursor
    pub fn current(&self) -> Option<Snapshot> {
        self.snapshots.get(self.current_index).cloned()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }
}
