// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! In-memory scene.
//!
//! Keeps objects, the active selection and the group frame the way an
//! interactive surface does, without drawing anything. The `user_*`
//! methods stand in for pointer and keyboard interaction: they change the
//! scene directly and queue the event the surface would raise.
//!
//! With [`MemoryScene::echo_programmatic`] set, programmatic selection
//! changes raise events too, like surfaces that can't tell the two apart.

use super::transform::{compose, to_local};
use super::{
    ActiveSelection, ObjectTransform, Scene, SceneEvent, TextProps, TransformTarget,
};
use crate::model::LayerId;
use image::{Rgba, RgbaImage};
use kurbo::{Point, Size, Vec2};

/// One drawable text object
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryObject {
    pub props: TextProps,
    /// Relative to the group while grouped, absolute otherwise
    pub transform: ObjectTransform,
    pub size: Size,
}

/// Counters for calls made through the [`Scene`] trait
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub selection_sets: usize,
}

#[derive(Debug)]
pub struct MemoryScene {
    /// Bottom first
    objects: Vec<(LayerId, MemoryObject)>,
    active: ActiveSelection,
    group: Option<ObjectTransform>,
    background: Option<String>,
    native: Size,
    display: Size,
    zoom: f64,
    fill: Rgba<u8>,
    stats: SceneStats,
    events: Vec<SceneEvent>,
    echo: bool,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            active: ActiveSelection::None,
            group: None,
            background: None,
            native: Size::ZERO,
            display: Size::ZERO,
            zoom: 1.0,
            fill: Rgba([255, 255, 255, 255]),
            stats: SceneStats::default(),
            events: Vec::new(),
            echo: false,
        }
    }

    /// Raise selection events for programmatic selection changes too
    pub fn echo_programmatic(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn object(&self, id: &LayerId) -> Option<&MemoryObject> {
        self.objects
            .iter()
            .find(|(object_id, _)| object_id == id)
            .map(|(_, object)| object)
    }

    fn object_mut(&mut self, id: &LayerId) -> Option<&mut MemoryObject> {
        self.objects
            .iter_mut()
            .find(|(object_id, _)| object_id == id)
            .map(|(_, object)| object)
    }

    /// Document-space transform of an object, grouped or not
    pub fn absolute_transform(&self, id: &LayerId) -> Option<ObjectTransform> {
        let object = self.object(id)?;
        match (&self.group, self.is_grouped(id)) {
            (Some(group), true) => Some(compose(group, &object.transform)),
            _ => Some(object.transform),
        }
    }

    fn is_grouped(&self, id: &LayerId) -> bool {
        matches!(&self.active, ActiveSelection::Group(ids) if ids.contains(id))
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    pub fn native_size(&self) -> Size {
        self.native
    }

    pub fn display_size(&self) -> Size {
        self.display
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    /// Put grouped members back into document space and drop the group
    fn dissolve_group(&mut self) {
        let Some(group) = self.group.take() else {
            return;
        };
        let members = self.active.ids();
        for (id, object) in &mut self.objects {
            if members.contains(id) {
                object.transform = compose(&group, &object.transform);
            }
        }
    }

    fn select(&mut self, selection: &ActiveSelection) {
        self.dissolve_group();

        let ids: Vec<LayerId> = selection
            .ids()
            .into_iter()
            .filter(|id| self.object(id).is_some())
            .collect();
        self.active = ActiveSelection::for_ids(&ids);

        if let ActiveSelection::Group(members) = &self.active {
            // Group frame starts at the members' top-left-most origin
            let origin = self
                .objects
                .iter()
                .filter(|(id, _)| members.contains(id))
                .map(|(_, object)| object.transform.position)
                .fold(Point::new(f64::INFINITY, f64::INFINITY), |acc, p| {
                    Point::new(acc.x.min(p.x), acc.y.min(p.y))
                });
            let group = ObjectTransform::new(origin, 0.0);
            for (id, object) in &mut self.objects {
                if members.contains(id) {
                    object.transform = to_local(&group, &object.transform);
                }
            }
            self.group = Some(group);
        }
    }

    fn selection_event(&self) -> SceneEvent {
        match self.active.ids() {
            ids if ids.is_empty() => SceneEvent::SelectionCleared,
            ids => SceneEvent::SelectionChanged(ids),
        }
    }

    /// Apply a pointer manipulation to whatever is active.
    ///
    /// Returns whether anything moved.
    fn manipulate(&mut self, change: impl Fn(ObjectTransform) -> ObjectTransform) -> bool {
        let event = match self.active.clone() {
            ActiveSelection::None => return false,
            ActiveSelection::Single(id) => {
                let Some(object) = self.object_mut(&id) else {
                    return false;
                };
                if !object.props.interaction.movable {
                    return false;
                }
                object.transform = change(object.transform);
                SceneEvent::TransformSettled(TransformTarget::Object(id))
            }
            ActiveSelection::Group(_) => {
                let Some(group) = self.group.as_mut() else {
                    return false;
                };
                *group = change(*group);
                SceneEvent::TransformSettled(TransformTarget::Group)
            }
        };
        self.events.push(event);
        true
    }

    /// Click/marquee selection
    pub fn user_select(&mut self, ids: &[LayerId]) {
        self.select(&ActiveSelection::for_ids(ids));
        let event = self.selection_event();
        self.events.push(event);
    }

    pub fn user_drag(&mut self, delta: Vec2) -> bool {
        self.manipulate(|transform| transform.translated(delta))
    }

    pub fn user_scale(&mut self, scale: Vec2) -> bool {
        self.manipulate(|transform| {
            transform.with_scale(Vec2::new(
                transform.scale.x * scale.x,
                transform.scale.y * scale.y,
            ))
        })
    }

    pub fn user_rotate(&mut self, degrees: f64) -> bool {
        self.manipulate(|transform| ObjectTransform {
            rotation: transform.rotation + degrees,
            ..transform
        })
    }

    /// A keystroke during in-place editing; `text` is the whole content
    pub fn user_type(&mut self, id: &LayerId, text: &str) -> bool {
        let Some(object) = self.object_mut(id) else {
            return false;
        };
        if !object.props.interaction.editable {
            return false;
        }
        object.props.content = text.to_string();
        self.events.push(SceneEvent::TextChanged {
            id: id.clone(),
            text: text.to_string(),
        });
        true
    }

    pub fn user_finish_editing(&mut self, id: &LayerId) -> bool {
        let Some(object) = self.object(id) else {
            return false;
        };
        let text = object.props.content.clone();
        self.events.push(SceneEvent::EditingExited {
            id: id.clone(),
            text,
        });
        true
    }

    /// Events queued but not yet taken
    pub fn queued_events(&self) -> &[SceneEvent] {
        &self.events
    }
}

impl Scene for MemoryScene {
    fn set_viewport(&mut self, display: Size, zoom: f64) {
        self.display = display;
        self.zoom = zoom;
    }

    fn set_background(&mut self, reference: Option<&str>, native: Size) {
        self.background = reference.map(str::to_string);
        self.native = native;
    }

    fn object_ids(&self) -> Vec<LayerId> {
        self.objects.iter().map(|(id, _)| id.clone()).collect()
    }

    fn create_text(&mut self, id: &LayerId, props: &TextProps) {
        if self.object(id).is_some() {
            self.update_text(id, props);
            return;
        }
        self.objects.push((
            id.clone(),
            MemoryObject {
                props: props.clone(),
                transform: ObjectTransform::new(props.position, props.rotation),
                size: props.size,
            },
        ));
        self.stats.created += 1;
    }

    fn update_text(&mut self, id: &LayerId, props: &TextProps) {
        let absolute = ObjectTransform::new(props.position, props.rotation);
        let frame = match (&self.group, self.is_grouped(id)) {
            (Some(group), true) => to_local(group, &absolute),
            _ => absolute,
        };
        let Some(object) = self.object_mut(id) else {
            return;
        };
        object.props = props.clone();
        object.transform = frame;
        object.size = props.size;
        self.stats.updated += 1;
    }

    fn remove(&mut self, id: &LayerId) {
        if self.object(id).is_none() {
            return;
        }
        if self.active.ids().contains(id) {
            let remaining: Vec<LayerId> = self
                .active
                .ids()
                .into_iter()
                .filter(|member| member != id)
                .collect();
            self.select(&ActiveSelection::for_ids(&remaining));
        }
        self.objects.retain(|(object_id, _)| object_id != id);
        self.stats.removed += 1;
    }

    fn set_stacking(&mut self, order: &[LayerId]) {
        self.objects.sort_by_key(|(id, _)| {
            order
                .iter()
                .position(|ordered| ordered == id)
                .unwrap_or(usize::MAX)
        });
    }

    fn active_selection(&self) -> ActiveSelection {
        self.active.clone()
    }

    fn set_active_selection(&mut self, selection: &ActiveSelection) {
        self.select(selection);
        self.stats.selection_sets += 1;
        if self.echo {
            let event = self.selection_event();
            self.events.push(event);
        }
    }

    fn transform(&self, id: &LayerId) -> Option<ObjectTransform> {
        self.object(id).map(|object| object.transform)
    }

    fn set_transform(&mut self, id: &LayerId, transform: ObjectTransform) {
        if let Some(object) = self.object_mut(id) {
            object.transform = transform;
        }
    }

    fn size(&self, id: &LayerId) -> Option<Size> {
        self.object(id).map(|object| object.size)
    }

    fn set_size(&mut self, id: &LayerId, size: Size) {
        if let Some(object) = self.object_mut(id) {
            object.size = size;
        }
    }

    fn group_transform(&self) -> Option<ObjectTransform> {
        self.group
    }

    fn set_group_transform(&mut self, transform: ObjectTransform) {
        if let Some(group) = self.group.as_mut() {
            *group = transform;
        }
    }

    fn rasterize(&self, width: u32, height: u32) -> anyhow::Result<RgbaImage> {
        if width == 0 || height == 0 {
            anyhow::bail!("cannot rasterize an empty {width}x{height} surface");
        }
        Ok(RgbaImage::from_pixel(width, height, self.fill))
    }

    fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}
