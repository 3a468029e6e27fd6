// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Document data model

pub mod document;
pub mod layer;
pub mod layer_id;

pub use document::{
    BackgroundImage, CustomFont, EditorDocument, display_scale, new_layer_id, next_z_index,
};
pub use layer::{Alignment, LayerPatch, NewTextLayer, TextLayer};
pub use layer_id::LayerId;
