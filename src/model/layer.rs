// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Text layers: one positioned, styled block of text over the background.
//!
//! Geometry is in image pixels with the origin at the top-left corner.
//! `rotation` is clockwise degrees around the layer center. Width and height
//! are the single source of truth for size; scale never accumulates on a
//! layer.

use super::LayerId;
use crate::settings;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Horizontal text alignment within the layer box
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

/// A positioned, styled text element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    pub id: LayerId,
    pub content: String,

    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,

    pub font_size: f64,
    pub font_family: String,
    pub font_weight: String,
    pub color: String,
    /// 0.0 (transparent) to 1.0 (opaque)
    pub opacity: f64,
    pub alignment: Alignment,
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    #[serde(default)]
    pub letter_spacing: f64,

    /// Stacking order; unique across the document
    pub z_index: i64,

    /// Mirror of the selection set. Never read as the source of truth.
    #[serde(default)]
    pub is_selected: bool,
    /// Locked layers reject every field change except locking itself
    #[serde(default)]
    pub is_locked: bool,
}

fn default_line_height() -> f64 {
    settings::layers::DEFAULT_LINE_HEIGHT
}

impl TextLayer {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Unrotated bounding box in image space
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position(), self.size())
    }

    /// Apply every field present in `patch`.
    ///
    /// This does not check the lock; callers in `editing::ops` do.
    pub fn apply(&mut self, patch: &LayerPatch) {
        if let Some(content) = &patch.content {
            self.content.clone_from(content);
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width.max(0.0);
        }
        if let Some(height) = patch.height {
            self.height = height.max(0.0);
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = font_size;
        }
        if let Some(family) = &patch.font_family {
            self.font_family.clone_from(family);
        }
        if let Some(weight) = &patch.font_weight {
            self.font_weight.clone_from(weight);
        }
        if let Some(color) = &patch.color {
            self.color.clone_from(color);
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(alignment) = patch.alignment {
            self.alignment = alignment;
        }
        if let Some(line_height) = patch.line_height {
            self.line_height = line_height.max(0.0);
        }
        if let Some(letter_spacing) = patch.letter_spacing {
            self.letter_spacing = letter_spacing;
        }
        if let Some(locked) = patch.is_locked {
            self.is_locked = locked;
        }
    }
}

/// A partial update to a text layer.
///
/// `id`, `z_index` and `is_selected` have no slot here: ids never
/// change, stacking goes through reorder, and selection goes through the
/// selection manager.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPatch {
    pub content: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub color: Option<String>,
    pub opacity: Option<f64>,
    pub alignment: Option<Alignment>,
    pub line_height: Option<f64>,
    pub letter_spacing: Option<f64>,
    pub is_locked: Option<bool>,
}

impl LayerPatch {
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn lock(locked: bool) -> Self {
        Self {
            is_locked: Some(locked),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True if the patch changes anything a lock protects
    pub fn touches_locked_fields(&self) -> bool {
        let without_lock = Self {
            is_locked: None,
            ..self.clone()
        };
        !without_lock.is_empty()
    }

    /// Fold a later patch into this one; later values win
    pub fn merge(&mut self, later: LayerPatch) {
        fn take<T>(slot: &mut Option<T>, later: Option<T>) {
            if later.is_some() {
                *slot = later;
            }
        }
        take(&mut self.content, later.content);
        take(&mut self.x, later.x);
        take(&mut self.y, later.y);
        take(&mut self.width, later.width);
        take(&mut self.height, later.height);
        take(&mut self.rotation, later.rotation);
        take(&mut self.font_size, later.font_size);
        take(&mut self.font_family, later.font_family);
        take(&mut self.font_weight, later.font_weight);
        take(&mut self.color, later.color);
        take(&mut self.opacity, later.opacity);
        take(&mut self.alignment, later.alignment);
        take(&mut self.line_height, later.line_height);
        take(&mut self.letter_spacing, later.letter_spacing);
        take(&mut self.is_locked, later.is_locked);
    }
}

/// Everything needed to create a layer except the id and stacking order
#[derive(Debug, Clone, PartialEq)]
pub struct NewTextLayer {
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: String,
    pub color: String,
    pub opacity: f64,
    pub alignment: Alignment,
    /// Defaults to 1.16 when absent
    pub line_height: Option<f64>,
    /// Defaults to 0 when absent
    pub letter_spacing: Option<f64>,
}

impl Default for NewTextLayer {
    fn default() -> Self {
        use settings::layers::new_text;
        Self {
            content: new_text::CONTENT.to_string(),
            x: 0.0,
            y: 0.0,
            width: new_text::WIDTH,
            height: new_text::HEIGHT,
            rotation: 0.0,
            font_size: new_text::FONT_SIZE,
            font_family: settings::fonts::DEFAULT_FAMILY.to_string(),
            font_weight: new_text::FONT_WEIGHT.to_string(),
            color: new_text::COLOR.to_string(),
            opacity: 1.0,
            alignment: Alignment::Center,
            line_height: None,
            letter_spacing: None,
        }
    }
}

impl NewTextLayer {
    /// The default text box, centered on an image of the given size
    pub fn centered_on(image_width: u32, image_height: u32) -> Self {
        let defaults = Self::default();
        Self {
            x: image_width as f64 / 2.0 - defaults.width / 2.0,
            y: image_height as f64 / 2.0 - defaults.height / 2.0,
            ..defaults
        }
    }

    /// Materialize into a layer with the given identity
    pub fn into_layer(self, id: LayerId, z_index: i64) -> TextLayer {
        TextLayer {
            id,
            content: self.content,
            x: self.x,
            y: self.y,
            width: self.width.max(0.0),
            height: self.height.max(0.0),
            rotation: self.rotation,
            font_size: self.font_size,
            font_family: self.font_family,
            font_weight: self.font_weight,
            color: self.color,
            opacity: self.opacity.clamp(0.0, 1.0),
            alignment: self.alignment,
            line_height: self
                .line_height
                .unwrap_or(settings::layers::DEFAULT_LINE_HEIGHT)
                .max(0.0),
            letter_spacing: self
                .letter_spacing
                .unwrap_or(settings::layers::DEFAULT_LETTER_SPACING),
            z_index,
            is_selected: false,
            is_locked: false,
        }
    }
}
