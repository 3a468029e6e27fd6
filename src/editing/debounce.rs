// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Single-slot debounce timer.
//!
//! One `Debouncer` is one logical stream (content edits, autosave). A new
//! value replaces the pending one and pushes the deadline out, so only the
//! last value of a burst fires, once the stream has been quiet for the
//! whole window. Time is passed in explicitly; nothing here sleeps.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending value, if any
    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|(value, _)| value)
    }

    /// When the pending value will fire
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Replace the pending value and restart the quiet period
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    /// Restart the quiet period without changing the pending value
    pub fn reschedule(&mut self, now: Instant) {
        if let Some((_, deadline)) = &mut self.pending {
            *deadline = now + self.window;
        }
    }

    /// Take the pending value if its quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|deadline| now >= deadline) {
            self.flush()
        } else {
            None
        }
    }

    /// Take the pending value regardless of the deadline
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Drop the pending value
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
