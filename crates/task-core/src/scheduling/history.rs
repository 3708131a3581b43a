//! Bounded per-worker activity history.

use std::collections::VecDeque;

use task_events::ActivityRecord;

#[derive(Debug, Clone)]
pub struct ActivityLog {
    capacity: usize,
    entries: VecDeque<ActivityRecord>,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    /// Appends an entry unless it repeats the latest one. The oldest entry is
    /// dropped once the log is full.
    pub fn record(&mut self, entry: ActivityRecord) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.entries.back().is_some_and(|last| last.same_activity(&entry)) {
            return false;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        true
    }

    pub fn latest(&self) -> Option<&ActivityRecord> {
        self.entries.back()
    }

    /// Entries, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &ActivityRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
