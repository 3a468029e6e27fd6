// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! The visual scene and its synchronization with the document.
//!
//! The rendering surface is an external collaborator seen only through the
//! [`Scene`] trait. It owns drawable text objects keyed by layer id, an
//! active selection (one object, or a group of several), and a rasterizer.
//! [`SceneReconciler`] is the only thing that creates or removes objects
//! on it.

pub mod fonts;
pub mod memory;
pub mod reconciler;
pub mod transform;

pub use fonts::{FontLoader, FontSource, FontStatus, ReadyFonts, ScriptedFonts};
pub use memory::{MemoryScene, SceneStats};
pub use reconciler::SceneReconciler;
pub use transform::ObjectTransform;

use crate::model::{Alignment, LayerId, TextLayer};
use image::RgbaImage;
use kurbo::{Point, Size};

/// What the user may do with a drawable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction {
    pub movable: bool,
    pub resizable: bool,
    pub rotatable: bool,
    pub editable: bool,
}

impl Interaction {
    /// Everything allowed unless the layer is locked
    pub fn for_layer(locked: bool) -> Self {
        let allowed = !locked;
        Self {
            movable: allowed,
            resizable: allowed,
            rotatable: allowed,
            editable: allowed,
        }
    }
}

/// Properties of a drawable text object, in document space
#[derive(Debug, Clone, PartialEq)]
pub struct TextProps {
    pub content: String,
    pub position: Point,
    pub size: Size,
    /// Clockwise degrees
    pub rotation: f64,
    pub font_size: f64,
    /// Family actually used, after font loading and fallback
    pub font_family: String,
    pub font_weight: String,
    pub color: String,
    pub opacity: f64,
    pub alignment: Alignment,
    pub line_height: f64,
    pub letter_spacing: f64,
    pub interaction: Interaction,
}

impl TextProps {
    pub fn from_layer(layer: &TextLayer, font_family: &str) -> Self {
        Self {
            content: layer.content.clone(),
            position: layer.position(),
            size: layer.size(),
            rotation: layer.rotation,
            font_size: layer.font_size,
            font_family: font_family.to_string(),
            font_weight: layer.font_weight.clone(),
            color: layer.color.clone(),
            opacity: layer.opacity,
            alignment: layer.alignment,
            line_height: layer.line_height,
            letter_spacing: layer.letter_spacing,
            interaction: Interaction::for_layer(layer.is_locked),
        }
    }
}

/// The scene's notion of what is currently being manipulated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActiveSelection {
    #[default]
    None,
    Single(LayerId),
    /// Several objects moved, rotated and scaled together
    Group(Vec<LayerId>),
}

impl ActiveSelection {
    /// The visual selection matching a set of selected ids
    pub fn for_ids(ids: &[LayerId]) -> Self {
        match ids {
            [] => Self::None,
            [only] => Self::Single(only.clone()),
            many => Self::Group(many.to_vec()),
        }
    }

    /// Same selection, ignoring group member order
    pub fn matches(&self, other: &ActiveSelection) -> bool {
        match (self, other) {
            (Self::Group(a), Self::Group(b)) => {
                a.len() == b.len() && a.iter().all(|id| b.contains(id))
            }
            _ => self == other,
        }
    }

    pub fn ids(&self) -> Vec<LayerId> {
        match self {
            Self::None => Vec::new(),
            Self::Single(id) => vec![id.clone()],
            Self::Group(ids) => ids.clone(),
        }
    }
}

/// What a settled transform applied to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformTarget {
    Object(LayerId),
    Group,
}

/// Notifications raised by user interaction with the scene.
///
/// Some surfaces also raise these for programmatic changes; the reconciler
/// discards anything raised while it is syncing.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// A drag, resize or rotate ended
    TransformSettled(TransformTarget),
    /// The user selected objects on the surface
    SelectionChanged(Vec<LayerId>),
    SelectionCleared,
    /// In-place text editing, fired per keystroke
    TextChanged { id: LayerId, text: String },
    /// In-place text editing session ended
    EditingExited { id: LayerId, text: String },
}

/// The rendering surface capability.
///
/// Positions handed over in [`TextProps`] are always in document space.
/// [`Scene::transform`] reports an object's transform in its current frame:
/// relative to the group while it is a group member, absolute otherwise.
pub trait Scene {
    /// On-screen size and zoom of the surface
    fn set_viewport(&mut self, display: Size, zoom: f64);

    /// Background reference and its native pixel size
    fn set_background(&mut self, reference: Option<&str>, native: Size);

    /// Ids of every text object on the surface
    fn object_ids(&self) -> Vec<LayerId>;

    fn create_text(&mut self, id: &LayerId, props: &TextProps);

    /// Update an existing object in place
    fn update_text(&mut self, id: &LayerId, props: &TextProps);

    fn remove(&mut self, id: &LayerId);

    /// Restack objects, bottom first
    fn set_stacking(&mut self, order: &[LayerId]);

    fn active_selection(&self) -> ActiveSelection;

    fn set_active_selection(&mut self, selection: &ActiveSelection);

    fn transform(&self, id: &LayerId) -> Option<ObjectTransform>;

    fn set_transform(&mut self, id: &LayerId, transform: ObjectTransform);

    /// Unscaled size of an object
    fn size(&self, id: &LayerId) -> Option<Size>;

    fn set_size(&mut self, id: &LayerId, size: Size);

    /// Transform of the active group, if a group is active
    fn group_transform(&self) -> Option<ObjectTransform>;

    fn set_group_transform(&mut self, transform: ObjectTransform);

    /// Render the full composition at the given pixel size, ignoring any
    /// display zoom
    fn rasterize(&self, width: u32, height: u32) -> anyhow::Result<RgbaImage>;

    /// Drain events raised since the last call
    fn take_events(&mut self) -> Vec<SceneEvent> {
        Vec::new()
    }
}
