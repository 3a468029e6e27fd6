// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Two-way synchronization between the document and the scene.
//!
//! Forward: after any document change the scene is brought in line with
//! the document. Stale objects are removed, existing ones updated in place,
//! missing ones created once their font is available, and the visual
//! selection is reset only when it differs.
//!
//! Backward: when the user finishes a drag, resize or rotate, the settled
//! geometry is read back, scale is folded into width/height, and the
//! result is committed through the editor. A group transform commits
//! every member in one history entry.
//!
//! Events the scene raises while a forward sync is running are echoes of
//! the sync itself and are discarded.

use super::fonts::{FontLoader, FontSource, FontStatus};
use super::transform::{self, ObjectTransform, Resolved};
use super::{ActiveSelection, Scene, SceneEvent, TextProps, TransformTarget};
use crate::config::EditorConfig;
use crate::editing::Editor;
use crate::error::FontError;
use crate::model::{EditorDocument, LayerId, LayerPatch, TextLayer, display_scale};
use kurbo::{Size, Vec2};
use std::collections::{HashMap, HashSet, VecDeque};

/// Background state last pushed to the scene
#[derive(Debug, Clone, PartialEq)]
struct AppliedBackground {
    reference: Option<String>,
    width: u32,
    height: u32,
}

impl AppliedBackground {
    fn of(doc: &EditorDocument) -> Self {
        Self {
            reference: doc.background_image.clone(),
            width: doc.image_width,
            height: doc.image_height,
        }
    }
}

/// Keeps a [`Scene`] in step with the editor's live document
#[derive(Debug)]
pub struct SceneReconciler<S, F> {
    scene: S,
    fonts: F,
    default_family: String,
    font_attempts: u32,
    max_display: Size,
    /// Sync passes each layer has waited on its font
    pending_fonts: HashMap<LayerId, u32>,
    /// Families that never arrived; drawn with the default until ready
    timed_out: HashSet<String>,
    background: Option<AppliedBackground>,
    /// User events queued on the scene before a sync started
    inbox: VecDeque<SceneEvent>,
}

impl<S: Scene, F: FontLoader> SceneReconciler<S, F> {
    pub fn new(scene: S, fonts: F, config: &EditorConfig) -> Self {
        Self {
            scene,
            fonts,
            default_family: config.default_font_family.clone(),
            font_attempts: config.font_load_attempts.max(1),
            max_display: Size::new(config.max_display_width, config.max_display_height),
            pending_fonts: HashMap::new(),
            timed_out: HashSet::new(),
            background: None,
            inbox: VecDeque::new(),
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn fonts(&self) -> &F {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut F {
        &mut self.fonts
    }

    /// Layers still waiting on their font
    pub fn has_pending_fonts(&self) -> bool {
        !self.pending_fonts.is_empty()
    }

    /// Fonts still worth polling, including ones drawn with the fallback
    /// after timing out
    pub fn has_waiting_fonts(&self) -> bool {
        self.has_pending_fonts() || !self.timed_out.is_empty()
    }

    // ========================================================================
    // FORWARD SYNC
    // ========================================================================

    /// Bring the scene in line with `doc`
    pub fn sync(&mut self, doc: &EditorDocument) {
        self.inbox.extend(self.scene.take_events());

        self.sync_background(doc);
        self.sync_objects(doc);
        self.sync_selection(doc);

        let echoed = self.scene.take_events();
        if !echoed.is_empty() {
            tracing::debug!("Ignored {} scene events raised during sync", echoed.len());
        }
    }

    /// Start loading every custom font in `doc`
    pub fn preload_fonts(&mut self, doc: &EditorDocument) {
        for font in &doc.custom_fonts {
            let status = self.fonts.request(&font.name, FontSource::Custom { src: &font.src });
            match status {
                FontStatus::Failed(err) => tracing::warn!("{err}"),
                status => tracing::debug!("Custom font {}: {:?}", font.name, status),
            }
        }
    }

    fn sync_background(&mut self, doc: &EditorDocument) {
        let wanted = AppliedBackground::of(doc);
        if self.background.as_ref() == Some(&wanted) {
            return;
        }

        let native = doc.image_size();
        let scale = display_scale(native, self.max_display);
        self.scene.set_background(doc.background_image.as_deref(), native);
        self.scene.set_viewport(native * scale, scale);
        tracing::info!(
            "Scene background {}x{} shown at {:.3}x",
            wanted.width,
            wanted.height,
            scale
        );
        self.background = Some(wanted);
    }

    fn sync_objects(&mut self, doc: &EditorDocument) {
        for id in self.scene.object_ids() {
            if !doc.contains(&id) {
                self.scene.remove(&id);
            }
        }
        // A layer deleted while its font loads never gets created
        self.pending_fonts.retain(|id, _| doc.contains(id));
        self.timed_out
            .retain(|family| doc.text_layers.iter().any(|layer| &layer.font_family == family));

        let existing: HashSet<LayerId> = self.scene.object_ids().into_iter().collect();
        for layer in &doc.text_layers {
            let Some(family) = self.resolve_family(doc, layer) else {
                continue;
            };
            let props = TextProps::from_layer(layer, &family);
            if existing.contains(&layer.id) {
                self.scene.update_text(&layer.id, &props);
            } else {
                self.scene.create_text(&layer.id, &props);
            }
        }

        let on_scene = self.scene.object_ids();
        let order: Vec<LayerId> = doc
            .text_layers
            .iter()
            .map(|layer| layer.id.clone())
            .filter(|id| on_scene.contains(id))
            .collect();
        if on_scene != order {
            self.scene.set_stacking(&order);
        }
    }

    /// Family to draw `layer` with, or `None` while its font is loading
    fn resolve_family(&mut self, doc: &EditorDocument, layer: &TextLayer) -> Option<String> {
        let family = layer.font_family.as_str();
        let source = match doc.custom_font(family) {
            Some(font) => FontSource::Custom { src: &font.src },
            None => FontSource::Named,
        };

        match self.fonts.request(family, source) {
            FontStatus::Ready => {
                self.pending_fonts.remove(&layer.id);
                self.timed_out.remove(family);
                Some(family.to_string())
            }
            FontStatus::Failed(err) => {
                tracing::warn!("{err}; drawing with {}", self.default_family);
                self.pending_fonts.remove(&layer.id);
                Some(self.default_family.clone())
            }
            FontStatus::Pending if self.timed_out.contains(family) => {
                Some(self.default_family.clone())
            }
            FontStatus::Pending => {
                let attempts = self.pending_fonts.entry(layer.id.clone()).or_insert(0);
                *attempts += 1;
                if *attempts < self.font_attempts {
                    tracing::debug!("Waiting on font {family} for {}", layer.id);
                    return None;
                }
                self.pending_fonts.remove(&layer.id);
                self.timed_out.insert(family.to_string());
                tracing::warn!(
                    "{}; drawing with {}",
                    FontError::TimedOut(family.to_string()),
                    self.default_family
                );
                Some(self.default_family.clone())
            }
        }
    }

    fn sync_selection(&mut self, doc: &EditorDocument) {
        let on_scene: HashSet<LayerId> = self.scene.object_ids().into_iter().collect();
        let ids: Vec<LayerId> = doc
            .selected_layer_ids
            .iter()
            .filter(|id| on_scene.contains(*id))
            .cloned()
            .collect();
        let wanted = ActiveSelection::for_ids(&ids);
        if !self.scene.active_selection().matches(&wanted) {
            self.scene.set_active_selection(&wanted);
        }
    }

    // ========================================================================
    // BACKWARD SYNC
    // ========================================================================

    /// Handle every queued scene event. Returns whether the document changed.
    pub fn pump(&mut self, editor: &mut Editor) -> bool {
        let mut changed = false;
        loop {
            let mut batch: Vec<SceneEvent> = self.inbox.drain(..).collect();
            batch.extend(self.scene.take_events());
            if batch.is_empty() {
                return changed;
            }
            for event in batch {
                changed |= self.handle_event(editor, event);
            }
        }
    }

    /// Route one user event into the editor, then sync the result back.
    ///
    /// Returns whether the document changed.
    pub fn handle_event(&mut self, editor: &mut Editor, event: SceneEvent) -> bool {
        let changed = match event {
            SceneEvent::TransformSettled(TransformTarget::Object(id)) => {
                self.settle_object(editor, &id)
            }
            SceneEvent::TransformSettled(TransformTarget::Group) => self.settle_group(editor),
            SceneEvent::SelectionChanged(ids) => editor.select_many(&ids),
            SceneEvent::SelectionCleared => editor.clear_selection(),
            SceneEvent::TextChanged { id, text } => {
                editor.update_immediate(&id, &LayerPatch::content(text))
            }
            SceneEvent::EditingExited { id, text } => {
                editor.update(&id, &LayerPatch::content(text))
            }
        };
        // Also snaps rejected changes back to the document
        self.sync(editor.document());
        changed
    }

    fn settle_object(&mut self, editor: &mut Editor, id: &LayerId) -> bool {
        let (Some(current), Some(size)) = (self.scene.transform(id), self.scene.size(id)) else {
            return false;
        };
        let resolved = transform::resolve(current, size);
        if current.is_scaled() {
            self.scene.set_transform(id, resolved.transform);
            self.scene.set_size(id, resolved.size);
        }
        editor.update(id, &geometry_patch(&resolved))
    }

    fn settle_group(&mut self, editor: &mut Editor) -> bool {
        let Some(group) = self.scene.group_transform() else {
            return false;
        };
        let ActiveSelection::Group(members) = self.scene.active_selection() else {
            return false;
        };

        let mut settled: Vec<(LayerId, Resolved)> = Vec::with_capacity(members.len());
        for id in members {
            let (Some(local), Some(size)) = (self.scene.transform(&id), self.scene.size(&id))
            else {
                continue;
            };
            settled.push((id, transform::resolve_member(&group, &local, size)));
        }

        // Bake scale and rotation into the members so the group frame is
        // a pure translation again
        let frame = ObjectTransform::new(group.position, 0.0);
        self.scene.set_group_transform(frame);
        for (id, resolved) in &settled {
            self.scene
                .set_transform(id, transform::to_local(&frame, &resolved.transform));
            self.scene.set_size(id, resolved.size);
        }

        let patches: Vec<(LayerId, LayerPatch)> = settled
            .iter()
            .map(|(id, resolved)| (id.clone(), geometry_patch(resolved)))
            .collect();
        tracing::debug!("Group transform settled for {} layers", patches.len());
        editor.update_each(&patches)
    }

    /// Arrow-key nudge: move the active object or group on the scene, then
    /// settle it like the end of a drag. One history entry per call.
    pub fn nudge(&mut self, editor: &mut Editor, delta: Vec2) -> bool {
        let target = match self.scene.active_selection() {
            ActiveSelection::None => return false,
            ActiveSelection::Single(id) => {
                let locked = editor
                    .document()
                    .layer(&id)
                    .is_none_or(|layer| layer.is_locked);
                let Some(current) = self.scene.transform(&id).filter(|_| !locked) else {
                    return false;
                };
                self.scene.set_transform(&id, current.translated(delta));
                TransformTarget::Object(id)
            }
            ActiveSelection::Group(_) => {
                let Some(group) = self.scene.group_transform() else {
                    return false;
                };
                self.scene.set_group_transform(group.translated(delta));
                TransformTarget::Group
            }
        };
        self.handle_event(editor, SceneEvent::TransformSettled(target))
    }
}

fn geometry_patch(resolved: &Resolved) -> LayerPatch {
    LayerPatch {
        x: Some(resolved.transform.position.x),
        y: Some(resolved.transform.position.y),
        width: Some(resolved.size.width),
        height: Some(resolved.size.height),
        rotation: Some(resolved.transform.rotation),
        ..LayerPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BackgroundImage, NewTextLayer};
    use crate::scene::{MemoryScene, ReadyFonts, ScriptedFonts};
    use kurbo::Point;

    fn background(width: u32, height: u32) -> BackgroundImage {
        BackgroundImage {
            reference: "data:image/png;base64,iVBORw0KGgo=".to_string(),
            width,
            height,
        }
    }

    fn text_at(x: f64, y: f64) -> NewTextLayer {
        NewTextLayer {
            x,
            y,
            ..NewTextLayer::default()
        }
    }

    fn setup() -> (Editor, SceneReconciler<MemoryScene, ReadyFonts>) {
        let config = EditorConfig::default();
        let mut editor = Editor::new(config.clone());
        editor.set_background_image(&background(800, 600));
        let reconciler = SceneReconciler::new(MemoryScene::new(), ReadyFonts, &config);
        (editor, reconciler)
    }

    #[test]
    fn forward_sync_creates_updates_and_removes() {
        let (mut editor, mut reconciler) = setup();
        let a = editor.add_layer(text_at(10.0, 10.0));
        let b = editor.add_layer(text_at(50.0, 50.0));
        reconciler.sync(editor.document());

        assert_eq!(reconciler.scene().object_ids(), vec![a.clone(), b.clone()]);
        assert_eq!(reconciler.scene().stats().created, 2);

        editor.update(&a, &LayerPatch::content("moved"));
        editor.delete(&b);
        reconciler.sync(editor.document());

        let scene = reconciler.scene();
        assert_eq!(scene.object_ids(), vec![a.clone()]);
        assert_eq!(scene.object(&a).map(|o| o.props.content.as_str()), Some("moved"));
        assert_eq!(scene.stats().created, 2);
        assert_eq!(scene.stats().removed, 1);
    }

    #[test]
    fn background_sets_display_scale() {
        let (editor, mut reconciler) = setup();
        reconciler.sync(editor.document());

        let scene = reconciler.scene();
        assert_eq!(scene.native_size(), Size::new(800.0, 600.0));
        // 650 / 600 > 1, 1200 / 800 > 1: never upscaled
        assert_eq!(scene.zoom(), 1.0);
        assert!(scene.background().is_some());
    }

    #[test]
    fn selection_reset_only_when_different() {
        let (mut editor, mut reconciler) = setup();
        let a = editor.add_layer(text_at(0.0, 0.0));
        reconciler.sync(editor.document());
        assert_eq!(reconciler.scene().active_selection(), ActiveSelection::Single(a));
        let sets = reconciler.scene().stats().selection_sets;

        reconciler.sync(editor.document());
        assert_eq!(reconciler.scene().stats().selection_sets, sets);
    }

    #[test]
    fn echoed_selection_events_are_ignored() {
        let config = EditorConfig::default();
        let mut editor = Editor::new(config.clone());
        editor.set_background_image(&background(800, 600));
        let scene = MemoryScene::new().echo_programmatic(true);
        let mut reconciler = SceneReconciler::new(scene, ReadyFonts, &config);

        let a = editor.add_layer(text_at(0.0, 0.0));
        let b = editor.add_layer(text_at(40.0, 0.0));
        editor.select_many(&[a.clone(), b.clone()]);
        reconciler.sync(editor.document());
        assert_eq!(reconciler.scene().active_selection().ids().len(), 2);

        // Both syncs raised echoes; none of them reach the editor
        editor.select(Some(&a), false);
        let revision = editor.revision();
        reconciler.sync(editor.document());
        assert!(!reconciler.pump(&mut editor));
        assert_eq!(editor.revision(), revision);
        assert_eq!(editor.document().selected_layer_ids, vec![a]);
    }

    #[test]
    fn single_drag_commits_geometry() {
        let (mut editor, mut reconciler) = setup();
        let a = editor.add_layer(text_at(10.0, 20.0));
        reconciler.sync(editor.document());
        let before = editor.history().len();

        reconciler.scene_mut().user_drag(Vec2::new(5.0, 5.0));
        assert!(reconciler.pump(&mut editor));

        let layer = editor.document().layer(&a).unwrap();
        assert_eq!(layer.position(), Point::new(15.0, 25.0));
        assert_eq!(editor.history().len(), before + 1);
    }

    #[test]
    fn single_scale_folds_into_size() {
        let (mut editor, mut reconciler) = setup();
        let a = editor.add_layer(text_at(0.0, 0.0));
        reconciler.sync(editor.document());

        reconciler.scene_mut().user_scale(Vec2::new(2.0, 0.5));
        reconciler.pump(&mut editor);

        let layer = editor.document().layer(&a).unwrap();
        assert_eq!(layer.size(), Size::new(400.0, 25.0));
        let transform = reconciler.scene().transform(&a).unwrap();
        assert!(!transform.is_scaled());
        assert_eq!(reconciler.scene().size(&a), Some(Size::new(400.0, 25.0)));
    }

    #[test]
    fn group_scale_commits_all_members_once() {
        let (mut editor, mut reconciler) = setup();
        let a = editor.add_layer(text_at(100.0, 100.0));
        let b = editor.add_layer(text_at(110.0, 110.0));
        reconciler.sync(editor.document());
        reconciler.scene_mut().user_select(&[a.clone(), b.clone()]);
        reconciler.pump(&mut editor);
        let before = editor.history().len();

        reconciler.scene_mut().user_scale(Vec2::new(2.0, 2.0));
        assert!(reconciler.pump(&mut editor));

        let doc = editor.document();
        let a_layer = doc.layer(&a).unwrap();
        let b_layer = doc.layer(&b).unwrap();
        assert_eq!(a_layer.position(), Point::new(100.0, 100.0));
        assert_eq!(b_layer.position(), Point::new(120.0, 120.0));
        assert_eq!(b_layer.size(), Size::new(400.0, 100.0));
        assert_eq!(editor.history().len(), before + 1);

        let group = reconciler.scene().group_transform().unwrap();
        assert!(!group.is_scaled());
        assert_eq!(
            reconciler.scene().absolute_transform(&b).map(|t| t.position),
            Some(Point::new(120.0, 120.0))
        );
    }

    #[test]
    fn group_rotation_accumulates_on_members() {
        let (mut editor, mut reconciler) = setup();
        let a = editor.add_layer(text_at(0.0, 0.0));
        let b = editor.add_layer(text_at(10.0, 0.0));
        reconciler.sync(editor.document());
        reconciler.scene_mut().user_select(&[a.clone(), b.clone()]);
        reconciler.pump(&mut editor);

        reconciler.scene_mut().user_rotate(90.0);
        reconciler.pump(&mut editor);

        let b_layer = editor.document().layer(&b).unwrap();
        assert!((b_layer.x - 0.0).abs() < 1e-9);
        assert!((b_layer.y - 10.0).abs() < 1e-9);
        assert!((b_layer.rotation - 90.0).abs() < 1e-9);
    }

    #[test]
    fn locked_member_snaps_back() {
        let (mut editor, mut reconciler) = setup();
        let a = editor.add_layer(text_at(0.0, 0.0));
        let b = editor.add_layer(text_at(50.0, 0.0));
        editor.toggle_lock(&b);
        reconciler.sync(editor.document());
        reconciler.scene_mut().user_select(&[a.clone(), b.clone()]);
        reconciler.pump(&mut editor);

        reconciler.scene_mut().user_drag(Vec2::new(10.0, 0.0));
        reconciler.pump(&mut editor);

        let doc = editor.document();
        assert_eq!(doc.layer(&a).map(|l| l.x), Some(10.0));
        assert_eq!(doc.layer(&b).map(|l| l.x), Some(50.0));
        assert_eq!(
            reconciler.scene().absolute_transform(&b).map(|t| t.position.x),
            Some(50.0)
        );
    }

    #[test]
    fn text_events_settle_once() {
        let (mut editor, mut reconciler) = setup();
        let a = editor.add_layer(text_at(0.0, 0.0));
        reconciler.sync(editor.document());
        let before = editor.history().len();

        reconciler.scene_mut().user_type(&a, "H");
        reconciler.scene_mut().user_type(&a, "Hi");
        reconciler.pump(&mut editor);
        assert_eq!(editor.history().len(), before);
        assert_eq!(editor.document().layer(&a).map(|l| l.content.as_str()), Some("Hi"));

        reconciler.scene_mut().user_finish_editing(&a);
        reconciler.pump(&mut editor);
        assert_eq!(editor.history().len(), before + 1);
        assert!(editor.undo());
        assert_eq!(
            editor.document().layer(&a).map(|l| l.content.as_str()),
            Some(crate::settings::layers::new_text::CONTENT)
        );
    }

    #[test]
    fn scene_selection_feeds_the_editor() {
        let (mut editor, mut reconciler) = setup();
        let a = editor.add_layer(text_at(0.0, 0.0));
        let b = editor.add_layer(text_at(10.0, 0.0));
        reconciler.sync(editor.document());

        reconciler.scene_mut().user_select(&[a.clone(), b.clone()]);
        reconciler.pump(&mut editor);
        assert_eq!(editor.document().selected_layer_ids.len(), 2);
        assert_eq!(editor.document().selected_layer_id, None);

        reconciler.scene_mut().user_select(&[]);
        reconciler.pump(&mut editor);
        assert!(editor.document().selected_layer_ids.is_empty());
    }

    #[test]
    fn nudge_locked_single_is_ignored() {
        let (mut editor, mut reconciler) = setup();
        let a = editor.add_layer(text_at(5.0, 5.0));
        editor.toggle_lock(&a);
        reconciler.sync(editor.document());
        let before = editor.history().len();

        assert!(!reconciler.nudge(&mut editor, Vec2::new(1.0, 0.0)));
        assert_eq!(editor.history().len(), before);
    }

    #[test]
    fn nudge_moves_selected_unlocked_layers() {
        let (mut editor, mut reconciler) = setup();
        let a = editor.add_layer(text_at(0.0, 0.0));
        let b = editor.add_layer(text_at(10.0, 0.0));
        editor.toggle_lock(&b);
        editor.select_many(&[a.clone(), b.clone()]);
        reconciler.sync(editor.document());

        assert!(reconciler.nudge(&mut editor, Vec2::new(10.0, -1.0)));
        let doc = editor.document();
        assert_eq!(doc.layer(&a).map(|l| l.position()), Some(Point::new(10.0, -1.0)));
        assert_eq!(doc.layer(&b).map(|l| l.position()), Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn pending_font_defers_creation() {
        let config = EditorConfig::default();
        let mut editor = Editor::new(config.clone());
        editor.set_background_image(&background(800, 600));
        let mut fonts = ScriptedFonts::new();
        fonts.script("Lobster", [FontStatus::Pending, FontStatus::Ready]);
        let mut reconciler = SceneReconciler::new(MemoryScene::new(), fonts, &config);

        let a = editor.add_layer(NewTextLayer {
            font_family: "Lobster".to_string(),
            ..NewTextLayer::default()
        });
        reconciler.sync(editor.document());
        assert!(reconciler.scene().object_ids().is_empty());
        assert!(reconciler.has_pending_fonts());

        reconciler.sync(editor.document());
        assert_eq!(
            reconciler.scene().object(&a).map(|o| o.props.font_family.as_str()),
            Some("Lobster")
        );
        assert!(!reconciler.has_pending_fonts());
    }

    #[test]
    fn deleted_layer_is_not_created_after_font_loads() {
        let config = EditorConfig::default();
        let mut editor = Editor::new(config.clone());
        editor.set_background_image(&background(800, 600));
        let mut fonts = ScriptedFonts::new();
        fonts.script("Lobster", [FontStatus::Pending, FontStatus::Ready]);
        let mut reconciler = SceneReconciler::new(MemoryScene::new(), fonts, &config);

        let a = editor.add_layer(NewTextLayer {
            font_family: "Lobster".to_string(),
            ..NewTextLayer::default()
        });
        reconciler.sync(editor.document());
        editor.delete(&a);
        reconciler.sync(editor.document());

        assert!(reconciler.scene().object_ids().is_empty());
        assert!(!reconciler.has_pending_fonts());
    }

    #[test]
    fn slow_font_falls_back() {
        let config = EditorConfig {
            font_load_attempts: 2,
            ..EditorConfig::default()
        };
        let mut editor = Editor::new(config.clone());
        editor.set_background_image(&background(800, 600));
        let mut fonts = ScriptedFonts::new();
        fonts.script("Slow", [FontStatus::Pending]);
        let mut reconciler = SceneReconciler::new(MemoryScene::new(), fonts, &config);

        let a = editor.add_layer(NewTextLayer {
            font_family: "Slow".to_string(),
            ..NewTextLayer::default()
        });
        reconciler.sync(editor.document());
        reconciler.sync(editor.document());

        assert_eq!(
            reconciler.scene().object(&a).map(|o| o.props.font_family.as_str()),
            Some(config.default_font_family.as_str())
        );
        assert_eq!(editor.document().layer(&a).map(|l| l.font_family.as_str()), Some("Slow"));
    }

    #[test]
    fn timed_out_font_is_applied_once_ready() {
        let config = EditorConfig {
            font_load_attempts: 2,
            ..EditorConfig::default()
        };
        let mut editor = Editor::new(config.clone());
        editor.set_background_image(&background(800, 600));
        let mut fonts = ScriptedFonts::new();
        fonts.script("Slow", [FontStatus::Pending, FontStatus::Pending, FontStatus::Ready]);
        let mut reconciler = SceneReconciler::new(MemoryScene::new(), fonts, &config);

        let a = editor.add_layer(NewTextLayer {
            font_family: "Slow".to_string(),
            ..NewTextLayer::default()
        });
        reconciler.sync(editor.document());
        assert!(reconciler.has_waiting_fonts());
        reconciler.sync(editor.document());
        assert!(!reconciler.has_pending_fonts());
        assert!(reconciler.has_waiting_fonts());

        reconciler.sync(editor.document());
        assert_eq!(
            reconciler.scene().object(&a).map(|o| o.props.font_family.as_str()),
            Some("Slow")
        );
        assert!(!reconciler.has_waiting_fonts());
    }

    #[test]
    fn timed_out_font_stops_waiting_when_unused() {
        let config = EditorConfig {
            font_load_attempts: 1,
            ..EditorConfig::default()
        };
        let mut editor = Editor::new(config.clone());
        editor.set_background_image(&background(800, 600));
        let mut fonts = ScriptedFonts::new();
        fonts.script("Slow", [FontStatus::Pending]);
        let mut reconciler = SceneReconciler::new(MemoryScene::new(), fonts, &config);

        let a = editor.add_layer(NewTextLayer {
            font_family: "Slow".to_string(),
            ..NewTextLayer::default()
        });
        reconciler.sync(editor.document());
        assert!(reconciler.has_waiting_fonts());

        let patch = LayerPatch {
            font_family: Some("Arial".to_string()),
            ..LayerPatch::default()
        };
        editor.update(&a, &patch);
        reconciler.sync(editor.document());
        assert!(!reconciler.has_waiting_fonts());
    }

    #[test]
    fn locking_an_existing_layer_freezes_its_object() {
        let (mut editor, mut reconciler) = setup();
        let a = editor.add_layer(text_at(10.0, 10.0));
        reconciler.sync(editor.document());
        let interaction = reconciler.scene().object(&a).map(|o| o.props.interaction);
        assert_eq!(interaction, Some(crate::scene::Interaction::for_layer(false)));

        editor.toggle_lock(&a);
        reconciler.sync(editor.document());
        let interaction = reconciler.scene().object(&a).map(|o| o.props.interaction);
        assert_eq!(interaction, Some(crate::scene::Interaction::for_layer(true)));
        assert!(!interaction.is_some_and(|i| i.movable || i.resizable || i.rotatable || i.editable));

        editor.toggle_lock(&a);
        reconciler.sync(editor.document());
        assert!(reconciler.scene().object(&a).is_some_and(|o| o.props.interaction.movable));
    }

    #[test]
    fn custom_fonts_load_from_their_source() {
        let config = EditorConfig::default();
        let mut editor = Editor::new(config.clone());
        editor.add_custom_font("Brand.ttf", "data:font/ttf;base64,AAEAAA==");
        let mut reconciler = SceneReconciler::new(MemoryScene::new(), ScriptedFonts::new(), &config);

        reconciler.preload_fonts(editor.document());
        assert_eq!(reconciler.fonts().requests(), &[("Brand".to_string(), true)]);
    }

    #[test]
    fn stacking_follows_reorder() {
        let (mut editor, mut reconciler) = setup();
        let a = editor.add_layer(text_at(0.0, 0.0));
        let b = editor.add_layer(text_at(0.0, 0.0));
        reconciler.sync(editor.document());

        editor.move_up(&a);
        reconciler.sync(editor.document());
        assert_eq!(reconciler.scene().object_ids(), vec![b, a]);
    }
}
