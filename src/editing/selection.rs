// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Layer selection: an ordered set of ids plus the operations that edit it.
//!
//! `Selection` wraps an `Arc<Vec<LayerId>>` so it can be cheaply cloned and
//! compared. Insertion order is click order, which shift-range selection
//! uses as its anchor. Mutations copy on write.
//!
//! The document stores the selection denormalized three ways
//! (`selected_layer_ids`, `selected_layer_id` and each layer's
//! `is_selected`). All three are written together by [`set_selection`];
//! nothing else may touch them.

use crate::model::{EditorDocument, LayerId};
use std::collections::HashSet;
use std::sync::Arc;

/// An ordered set of selected layer ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    inner: Arc<Vec<LayerId>>,
}

impl Selection {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from ids, dropping repeats but keeping first-seen order
    pub fn from_ids<I: IntoIterator<Item = LayerId>>(ids: I) -> Self {
        let mut selection = Self::new();
        for id in ids {
            selection.insert(id);
        }
        selection
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn contains(&self, id: &LayerId) -> bool {
        self.inner.contains(id)
    }

    /// Iterate in click order
    pub fn iter(&self) -> impl Iterator<Item = &LayerId> {
        self.inner.iter()
    }

    /// The id when exactly one layer is selected
    pub fn single(&self) -> Option<&LayerId> {
        match self.inner.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Append an id if it isn't already selected
    pub fn insert(&mut self, id: LayerId) {
        if !self.contains(&id) {
            Arc::make_mut(&mut self.inner).push(id);
        }
    }

    pub fn remove(&mut self, id: &LayerId) {
        if self.contains(id) {
            Arc::make_mut(&mut self.inner).retain(|existing| existing != id);
        }
    }

    /// Add the id if absent, remove it if present
    pub fn toggle(&mut self, id: LayerId) {
        if self.contains(&id) {
            self.remove(&id);
        } else {
            self.insert(id);
        }
    }

    /// Same members, ignoring order
    pub fn same_members(&self, other: &Selection) -> bool {
        self.len() == other.len() && self.iter().all(|id| other.contains(id))
    }

    pub fn to_vec(&self) -> Vec<LayerId> {
        self.inner.as_ref().clone()
    }
}

// ============================================================================
// SELECTION MANAGER
// ============================================================================

/// The document's current selection
pub fn current(doc: &EditorDocument) -> Selection {
    Selection::from_ids(doc.selected_layer_ids.iter().cloned())
}

/// Write `selection` into the document.
///
/// Ids that don't name a layer are dropped. The single-id field and every
/// layer's `is_selected` flag are recomputed from the result.
pub fn set_selection(doc: &mut EditorDocument, selection: Selection) {
    let present: HashSet<&LayerId> = doc.text_layers.iter().map(|layer| &layer.id).collect();
    let kept: Vec<LayerId> = selection
        .iter()
        .filter(|id| present.contains(id))
        .cloned()
        .collect();
    let kept = Selection::from_ids(kept);

    doc.selected_layer_id = kept.single().cloned();
    doc.selected_layer_ids = kept.to_vec();
    for layer in &mut doc.text_layers {
        layer.is_selected = kept.contains(&layer.id);
    }
}

/// Recompute the denormalized fields from `selected_layer_ids`
pub fn refresh(doc: &mut EditorDocument) {
    let selection = current(doc);
    set_selection(doc, selection);
}

/// Click selection.
///
/// Additive clicks toggle membership; plain clicks replace the selection.
/// `None` clears. Returns whether anything changed.
pub fn select_one(doc: &mut EditorDocument, id: Option<&LayerId>, additive: bool) -> bool {
    let Some(id) = id else {
        return clear(doc);
    };
    if !doc.contains(id) {
        tracing::debug!("select_one: no layer {id}");
        return false;
    }

    let mut selection = if additive {
        current(doc)
    } else {
        Selection::new()
    };
    if additive {
        selection.toggle(id.clone());
    } else {
        selection.insert(id.clone());
    }
    replace_if_changed(doc, selection)
}

/// Shift-click selection.
///
/// Unions every id between `anchor` and `target` (inclusive) in
/// `ordered_ids` into the current selection.
pub fn select_range(
    doc: &mut EditorDocument,
    anchor: &LayerId,
    target: &LayerId,
    ordered_ids: &[LayerId],
) -> bool {
    let anchor_index = ordered_ids.iter().position(|id| id == anchor);
    let target_index = ordered_ids.iter().position(|id| id == target);
    let (Some(a), Some(b)) = (anchor_index, target_index) else {
        tracing::debug!("select_range: {anchor} or {target} not in order");
        return false;
    };

    let mut selection = current(doc);
    for id in &ordered_ids[a.min(b)..=a.max(b)] {
        selection.insert(id.clone());
    }
    replace_if_changed(doc, selection)
}

/// Replace the selection wholesale.
///
/// A request naming the same set as the current selection is a no-op.
pub fn select_many(doc: &mut EditorDocument, ids: &[LayerId]) -> bool {
    let requested = Selection::from_ids(ids.iter().filter(|id| doc.contains(id)).cloned());
    if requested.same_members(&current(doc)) {
        return false;
    }
    set_selection(doc, requested);
    true
}

/// Deselect everything
pub fn clear(doc: &mut EditorDocument) -> bool {
    if doc.selected_layer_ids.is_empty() && doc.selected_layer_id.is_none() {
        return false;
    }
    set_selection(doc, Selection::new());
    true
}

fn replace_if_changed(doc: &mut EditorDocument, selection: Selection) -> bool {
    if selection == current(doc) {
        return false;
    }
    set_selection(doc, selection);
    true
}
