// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Bounded undo/redo timeline of whole-document snapshots.
//!
//! Entries before the cursor are the undo buffer, entries after it are the
//! redo buffer. Pushing discards the redo buffer. When the timeline is full
//! the oldest snapshot is evicted and every index shifts down by one.

use std::collections::VecDeque;

/// Snapshot history with a cursor
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    cursor: usize,
    capacity: usize,
}

impl<T> History<T> {
    /// Create an empty history holding at most `capacity` snapshots
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    /// Create a history whose only entry is `initial`
    pub fn new(initial: T, capacity: usize) -> Self {
        let mut history = Self::with_capacity(capacity);
        history.entries.push_back(initial);
        history
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

    /// Index of the current snapshot (meaningless while empty)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The snapshot the cursor points at
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Record a new current snapshot, discarding the redo buffer
    pub fn push(&mut self, snapshot: T) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one snapshot. Returns `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one snapshot. Returns `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// Replace the whole timeline with a single snapshot
    pub fn reset(&mut self, snapshot: T) {
        self.entries.clear();
        self.entries.push_back(snapshot);
        self.cursor = 0;
    }
}
