// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! The editor document: background, text layers, selection and fonts.
//!
//! `EditorDocument` is the unit the history engine snapshots. It holds no
//! history of its own and no UI-only flags. Everything here is plain data
//! plus read accessors; mutation lives in `editing::ops` and
//! `editing::selection`.

use super::{LayerId, TextLayer};
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// A user-uploaded font registered by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFont {
    /// Family name, unique within the document
    pub name: String,
    /// Resolvable reference to the font data (usually a data URL)
    pub src: String,
}

impl CustomFont {
    /// Font file extensions stripped when deriving a family name
    pub const EXTENSIONS: [&'static str; 4] = ["ttf", "otf", "woff", "woff2"];

    /// Family name for an uploaded file: the file name minus a known font
    /// extension (case-insensitive)
    pub fn display_name(file_name: &str) -> String {
        file_name
            .rsplit_once('.')
            .filter(|(_, ext)| {
                Self::EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .map_or(file_name, |(stem, _)| stem)
            .to_string()
    }
}

/// A decoded background image ready to hand to the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundImage {
    /// Display-ready reference (usually a data URL)
    pub reference: String,
    /// Natural pixel width
    pub width: u32,
    /// Natural pixel height
    pub height: u32,
}

/// Complete document state at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorDocument {
    pub background_image: Option<String>,
    pub image_width: u32,
    pub image_height: u32,
    /// Layers in stacking order, bottom first
    pub text_layers: Vec<TextLayer>,
    /// The selected id when exactly one layer is selected
    pub selected_layer_id: Option<LayerId>,
    /// Selected ids in click order
    pub selected_layer_ids: Vec<LayerId>,
    pub custom_fonts: Vec<CustomFont>,
}

impl EditorDocument {
    /// An empty document with no background
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(&self, id: &LayerId) -> Option<&TextLayer> {
        self.text_layers.iter().find(|layer| &layer.id == id)
    }

    pub fn layer_mut(&mut self, id: &LayerId) -> Option<&mut TextLayer> {
        self.text_layers.iter_mut().find(|layer| &layer.id == id)
    }

    pub fn layer_index(&self, id: &LayerId) -> Option<usize> {
        self.text_layers.iter().position(|layer| &layer.id == id)
    }

    pub fn contains(&self, id: &LayerId) -> bool {
        self.layer_index(id).is_some()
    }

    /// Layer ids in stacking order, bottom first
    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.text_layers.iter().map(|layer| layer.id.clone()).collect()
    }

    pub fn selected_layer(&self) -> Option<&TextLayer> {
        self.selected_layer_id.as_ref().and_then(|id| self.layer(id))
    }

    pub fn custom_font(&self, name: &str) -> Option<&CustomFont> {
        self.custom_fonts.iter().find(|font| font.name == name)
    }

    /// Whether there's anything worth persisting
    pub fn has_content(&self) -> bool {
        self.background_image.is_some() || !self.text_layers.is_empty()
    }

    /// Native image size in pixels
    pub fn image_size(&self) -> Size {
        Size::new(self.image_width as f64, self.image_height as f64)
    }
}

/// Generate a fresh layer id
pub fn new_layer_id() -> LayerId {
    LayerId::next()
}

/// The z-index one above the current maximum, or 0 for no layers
pub fn next_z_index(layers: &[TextLayer]) -> i64 {
    layers
        .iter()
        .map(|layer| layer.z_index)
        .max()
        .map_or(0, |max| max + 1)
}

/// Scale at which an image is shown on screen.
///
/// The image is fit inside `max` and never upscaled. Export ignores this.
pub fn display_scale(image: Size, max: Size) -> f64 {
    if image.width <= 0.0 || image.height <= 0.0 {
        return 1.0;
    }
    (max.width / image.width)
        .min(max.height / image.height)
        .min(1.0)
}
