// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Layer operations as pure document transforms.
//!
//! Each function takes the current document and returns the next one.
//! Rejected operations (unknown id, locked layer, duplicate font name)
//! return an unchanged clone; callers detect failure by comparing. The
//! history engine relies on that to skip no-op commits.
//!
//! Lock rule: a locked layer accepts a patch only if the patch changes
//! nothing but the lock itself. Bulk variants apply the rule per layer.

use super::selection::{self, Selection};
use crate::model::{
    BackgroundImage, CustomFont, EditorDocument, LayerId, LayerPatch, NewTextLayer, TextLayer,
    new_layer_id, next_z_index,
};

/// Which way `reorder` moves a layer in the stacking order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the top (later in the layer list)
    Up,
    /// Toward the bottom (earlier in the layer list)
    Down,
}

fn accepts(layer: &TextLayer, patch: &LayerPatch) -> bool {
    !layer.is_locked || !patch.touches_locked_fields()
}

/// Replace the background. Clears every layer and the selection; custom
/// fonts are kept.
pub fn set_background(doc: &EditorDocument, image: &BackgroundImage) -> EditorDocument {
    EditorDocument {
        background_image: Some(image.reference.clone()),
        image_width: image.width,
        image_height: image.height,
        text_layers: Vec::new(),
        selected_layer_id: None,
        selected_layer_ids: Vec::new(),
        custom_fonts: doc.custom_fonts.clone(),
    }
}

/// Append a new layer on top and select it exclusively
pub fn add_layer(doc: &EditorDocument, new: NewTextLayer, id: LayerId) -> EditorDocument {
    let mut next = doc.clone();
    if next.contains(&id) {
        tracing::warn!("add_layer: id {id} already exists");
        return next;
    }
    let z_index = next_z_index(&next.text_layers);
    next.text_layers.push(new.into_layer(id.clone(), z_index));
    selection::set_selection(&mut next, Selection::from_ids([id]));
    next
}

/// Apply `patch` to one layer, subject to its lock
pub fn update_layer(doc: &EditorDocument, id: &LayerId, patch: &LayerPatch) -> EditorDocument {
    let mut next = doc.clone();
    let Some(layer) = next.layer_mut(id) else {
        tracing::debug!("update_layer: no layer {id}");
        return next;
    };
    if !accepts(layer, patch) {
        tracing::warn!("update_layer: layer {id} is locked");
        return next;
    }
    layer.apply(patch);
    next
}

/// Apply the same patch to several layers; locked ones are skipped
pub fn update_layers(doc: &EditorDocument, ids: &[LayerId], patch: &LayerPatch) -> EditorDocument {
    let mut next = doc.clone();
    for layer in next.text_layers.iter_mut().filter(|l| ids.contains(&l.id)) {
        if accepts(layer, patch) {
            layer.apply(patch);
        }
    }
    next
}

/// Apply a separate patch per layer in one step; locked ones are skipped
pub fn update_each(doc: &EditorDocument, patches: &[(LayerId, LayerPatch)]) -> EditorDocument {
    let mut next = doc.clone();
    for (id, patch) in patches {
        match next.layer_mut(id) {
            Some(layer) if accepts(layer, patch) => layer.apply(patch),
            Some(_) => tracing::debug!("update_each: skipping locked layer {id}"),
            None => tracing::debug!("update_each: no layer {id}"),
        }
    }
    next
}

/// Remove one layer unless it's locked
pub fn delete_layer(doc: &EditorDocument, id: &LayerId) -> EditorDocument {
    delete_layers(doc, std::slice::from_ref(id))
}

/// Remove every unlocked layer named in `ids`
pub fn delete_layers(doc: &EditorDocument, ids: &[LayerId]) -> EditorDocument {
    let mut next = doc.clone();
    let before = next.text_layers.len();
    next.text_layers
        .retain(|layer| layer.is_locked || !ids.contains(&layer.id));
    if next.text_layers.len() == before {
        return next;
    }
    selection::refresh(&mut next);
    next
}

/// Clone one layer, offset by `offset` in both axes, and select the clone
pub fn duplicate_layer(doc: &EditorDocument, id: &LayerId, offset: f64) -> EditorDocument {
    duplicate_layers(doc, std::slice::from_ref(id), offset)
}

/// Clone every unlocked layer named in `ids` and select the clones.
///
/// Clones go on top, in their sources' stacking order.
pub fn duplicate_layers(doc: &EditorDocument, ids: &[LayerId], offset: f64) -> EditorDocument {
    let mut next = doc.clone();
    let base_z = next_z_index(&next.text_layers);
    let clones: Vec<TextLayer> = next
        .text_layers
        .iter()
        .filter(|layer| ids.contains(&layer.id) && !layer.is_locked)
        .enumerate()
        .map(|(index, source)| TextLayer {
            id: new_layer_id(),
            x: source.x + offset,
            y: source.y + offset,
            z_index: base_z + index as i64,
            is_selected: false,
            is_locked: false,
            ..source.clone()
        })
        .collect();
    if clones.is_empty() {
        return next;
    }

    let new_ids = Selection::from_ids(clones.iter().map(|layer| layer.id.clone()));
    next.text_layers.extend(clones);
    selection::set_selection(&mut next, new_ids);
    next
}

/// Swap a layer with its neighbour and renumber z-indices to 0..n-1
pub fn reorder_layer(doc: &EditorDocument, id: &LayerId, direction: Direction) -> EditorDocument {
    let mut next = doc.clone();
    let Some(index) = next.layer_index(id) else {
        return next;
    };
    if next.text_layers[index].is_locked {
        tracing::warn!("reorder_layer: layer {id} is locked");
        return next;
    }
    let neighbour = match direction {
        Direction::Up if index + 1 < next.text_layers.len() => index + 1,
        Direction::Down if index > 0 => index - 1,
        _ => return next,
    };
    next.text_layers.swap(index, neighbour);
    for (z, layer) in next.text_layers.iter_mut().enumerate() {
        layer.z_index = z as i64;
    }
    next
}

/// Flip a layer's lock. Selection is untouched.
pub fn toggle_lock(doc: &EditorDocument, id: &LayerId) -> EditorDocument {
    let mut next = doc.clone();
    if let Some(layer) = next.layer_mut(id) {
        layer.is_locked = !layer.is_locked;
    }
    next
}

/// Register a custom font. A name that's already taken is a no-op.
pub fn add_custom_font(doc: &EditorDocument, name: &str, src: &str) -> EditorDocument {
    let mut next = doc.clone();
    let name = CustomFont::display_name(name);
    if next.custom_font(&name).is_some() {
        tracing::warn!("Font {name} already exists");
        return next;
    }
    next.custom_fonts.push(CustomFont {
        name,
        src: src.to_string(),
    });
    next
}
