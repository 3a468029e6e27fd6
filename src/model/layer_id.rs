// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Stable identifiers for text layers.
//!
//! A `LayerId` is an opaque string. Ids survive a save/reload cycle, so they
//! combine the wall-clock time at creation with a process-wide counter; a
//! freshly generated id can never collide with one restored from storage
//! unless the clock goes backwards within the same millisecond.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A unique identifier for a text layer
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

static LAYER_COUNTER: AtomicU64 = AtomicU64::new(1);

impl LayerId {
    /// Create a new unique layer ID
    pub fn next() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let serial = LAYER_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("layer-{millis}-{serial}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
