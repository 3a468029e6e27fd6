// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! The editor: live document plus its undo/redo history.
//!
//! Every document change goes through one of two paths:
//!
//! - [`Editor::commit`] applies a transform and records the result as a new
//!   history snapshot (unless nothing changed).
//! - [`Editor::commit_immediate`] applies a transform to the live document
//!   only. Used for high-frequency interim states (typing, live preview).
//!   The next `commit` records the settled state, even if the final
//!   transform itself is a no-op against the live document.
//!
//! Selection changes are live-only as well, but they don't mark the
//! document as carrying interim edits.

use super::debounce::Debouncer;
use super::history::History;
use super::ops::{self, Direction};
use super::selection::{self, Selection};
use crate::config::EditorConfig;
use crate::model::{BackgroundImage, EditorDocument, LayerId, LayerPatch, NewTextLayer};
use std::time::Instant;

/// A pending live edit waiting for its quiet period to end
#[derive(Debug, Clone, PartialEq)]
struct PendingEdit {
    id: LayerId,
    patch: LayerPatch,
}

/// Explicitly constructed document container
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    live: EditorDocument,
    history: History<EditorDocument>,
    /// Live document carries changes not yet recorded in history
    interim: bool,
    /// Live edits waiting to settle into a commit
    edit_stream: Debouncer<PendingEdit>,
    /// Bumped on every live document change
    revision: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Create an editor with an empty document
    pub fn new(config: EditorConfig) -> Self {
        let history = History::new(EditorDocument::new(), config.history_capacity);
        let edit_stream = Debouncer::new(config.content_settle());
        Self {
            config,
            live: EditorDocument::new(),
            history,
            interim: false,
            edit_stream,
            revision: 0,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The live document
    pub fn document(&self) -> &EditorDocument {
        &self.live
    }

    pub fn history(&self) -> &History<EditorDocument> {
        &self.history
    }

    /// Changes every time the live document changes
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Whether a live edit is waiting to settle
    pub fn has_pending_edit(&self) -> bool {
        self.edit_stream.is_pending()
    }

    // ========================================================================
    // HISTORY ENGINE
    // ========================================================================

    /// Apply `producer` and record the result as a new snapshot.
    ///
    /// Returns whether a snapshot was recorded.
    pub fn commit<F>(&mut self, producer: F) -> bool
    where
        F: FnOnce(&EditorDocument) -> EditorDocument,
    {
        let next = producer(&self.live);
        if next == self.live && !self.interim {
            return false;
        }
        if next != self.live {
            self.live = next;
            self.revision += 1;
        }
        self.history.push(self.live.clone());
        self.interim = false;
        tracing::debug!(
            "Commit: {} snapshots, cursor {}",
            self.history.len(),
            self.history.cursor()
        );
        true
    }

    /// Apply `producer` to the live document without recording history.
    ///
    /// Returns whether the live document changed.
    pub fn commit_immediate<F>(&mut self, producer: F) -> bool
    where
        F: FnOnce(&EditorDocument) -> EditorDocument,
    {
        let next = producer(&self.live);
        if next == self.live {
            return false;
        }
        self.live = next;
        self.interim = true;
        self.revision += 1;
        true
    }

    /// Step back one snapshot
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo() else {
            return false;
        };
        let previous = previous.clone();
        self.restore(previous);
        tracing::debug!("Undo: restored snapshot {}", self.history.cursor());
        true
    }

    /// Step forward one snapshot
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo() else {
            return false;
        };
        let next = next.clone();
        self.restore(next);
        tracing::debug!("Redo: restored snapshot {}", self.history.cursor());
        true
    }

    /// Make a snapshot live. Only the single selected id survives
    /// history navigation.
    fn restore(&mut self, snapshot: EditorDocument) {
        if let Some(pending) = self.edit_stream.flush() {
            tracing::debug!("Dropping unsettled edit to {}", pending.id);
        }
        self.live = snapshot;
        let restored = Selection::from_ids(self.live.selected_layer_id.clone());
        selection::set_selection(&mut self.live, restored);
        self.interim = false;
        self.revision += 1;
    }

    /// Replace the document and history with a single loaded snapshot
    pub fn load(&mut self, doc: EditorDocument) {
        self.edit_stream.cancel();
        self.history.reset(doc.clone());
        self.live = doc;
        self.interim = false;
        self.revision += 1;
    }

    /// Back to an empty document with a fresh history
    pub fn reset(&mut self) {
        self.load(EditorDocument::new());
        tracing::info!("Editor reset");
    }

    // ========================================================================
    // SELECTION
    // ========================================================================

    fn select_with<F>(&mut self, change: F) -> bool
    where
        F: FnOnce(&mut EditorDocument) -> bool,
    {
        let changed = change(&mut self.live);
        if changed {
            self.revision += 1;
        }
        changed
    }

    /// Click selection; `additive` toggles membership
    pub fn select(&mut self, id: Option<&LayerId>, additive: bool) -> bool {
        self.select_with(|doc| selection::select_one(doc, id, additive))
    }

    /// Shift-click selection over the stacking order
    pub fn select_range(&mut self, anchor: &LayerId, target: &LayerId) -> bool {
        let order = self.live.layer_ids();
        self.select_with(|doc| selection::select_range(doc, anchor, target, &order))
    }

    pub fn select_many(&mut self, ids: &[LayerId]) -> bool {
        self.select_with(|doc| selection::select_many(doc, ids))
    }

    pub fn select_all(&mut self) -> bool {
        let ids = self.live.layer_ids();
        self.select_many(&ids)
    }

    pub fn clear_selection(&mut self) -> bool {
        self.select_with(selection::clear)
    }

    // ========================================================================
    // LAYER OPERATIONS
    // ========================================================================

    /// Replace the background image; clears all layers
    pub fn set_background_image(&mut self, image: &BackgroundImage) -> bool {
        tracing::info!("Background set: {}x{}", image.width, image.height);
        self.commit(|doc| ops::set_background(doc, image))
    }

    /// Add a layer on top and select it. Returns its id.
    pub fn add_layer(&mut self, new: NewTextLayer) -> LayerId {
        let id = LayerId::next();
        self.commit(|doc| ops::add_layer(doc, new, id.clone()));
        id
    }

    /// Add the default text box centered on the image.
    ///
    /// Does nothing without a background.
    pub fn add_default_layer(&mut self) -> Option<LayerId> {
        self.live.background_image.as_ref()?;
        let new = NewTextLayer::centered_on(self.live.image_width, self.live.image_height);
        Some(self.add_layer(new))
    }

    pub fn update(&mut self, id: &LayerId, patch: &LayerPatch) -> bool {
        self.commit(|doc| ops::update_layer(doc, id, patch))
    }

    pub fn update_immediate(&mut self, id: &LayerId, patch: &LayerPatch) -> bool {
        self.commit_immediate(|doc| ops::update_layer(doc, id, patch))
    }

    pub fn update_many(&mut self, ids: &[LayerId], patch: &LayerPatch) -> bool {
        self.commit(|doc| ops::update_layers(doc, ids, patch))
    }

    pub fn update_many_immediate(&mut self, ids: &[LayerId], patch: &LayerPatch) -> bool {
        self.commit_immediate(|doc| ops::update_layers(doc, ids, patch))
    }

    /// Per-layer patches recorded as one snapshot
    pub fn update_each(&mut self, patches: &[(LayerId, LayerPatch)]) -> bool {
        self.commit(|doc| ops::update_each(doc, patches))
    }

    pub fn delete(&mut self, id: &LayerId) -> bool {
        self.commit(|doc| ops::delete_layer(doc, id))
    }

    pub fn delete_many(&mut self, ids: &[LayerId]) -> bool {
        self.commit(|doc| ops::delete_layers(doc, ids))
    }

    pub fn delete_selected(&mut self) -> bool {
        let ids = self.live.selected_layer_ids.clone();
        if ids.is_empty() {
            return false;
        }
        self.delete_many(&ids)
    }

    pub fn duplicate(&mut self, id: &LayerId) -> bool {
        let offset = self.config.duplicate_offset;
        self.commit(|doc| ops::duplicate_layer(doc, id, offset))
    }

    pub fn duplicate_many(&mut self, ids: &[LayerId]) -> bool {
        let offset = self.config.duplicate_offset;
        self.commit(|doc| ops::duplicate_layers(doc, ids, offset))
    }

    pub fn duplicate_selected(&mut self) -> bool {
        let ids = self.live.selected_layer_ids.clone();
        if ids.is_empty() {
            return false;
        }
        self.duplicate_many(&ids)
    }

    pub fn reorder(&mut self, id: &LayerId, direction: Direction) -> bool {
        self.commit(|doc| ops::reorder_layer(doc, id, direction))
    }

    pub fn move_up(&mut self, id: &LayerId) -> bool {
        self.reorder(id, Direction::Up)
    }

    pub fn move_down(&mut self, id: &LayerId) -> bool {
        self.reorder(id, Direction::Down)
    }

    pub fn toggle_lock(&mut self, id: &LayerId) -> bool {
        self.commit(|doc| ops::toggle_lock(doc, id))
    }

    /// Register a custom font; `name` may still carry its file extension
    pub fn add_custom_font(&mut self, name: &str, src: &str) -> bool {
        self.commit(|doc| ops::add_custom_font(doc, name, src))
    }

    // ========================================================================
    // LIVE EDIT STREAM
    // ========================================================================

    /// Live edit: show `patch` now, commit it once the stream goes quiet.
    ///
    /// A pending edit to a different layer is committed first, so one
    /// stream never mixes layers.
    pub fn edit_live(&mut self, id: &LayerId, patch: LayerPatch, now: Instant) -> bool {
        if self.edit_stream.peek().is_some_and(|pending| &pending.id != id) {
            self.flush_pending();
        }
        let changed = self.update_immediate(id, &patch);

        let merged = match self.edit_stream.flush() {
            Some(mut pending) => {
                pending.patch.merge(patch);
                pending
            }
            None => PendingEdit {
                id: id.clone(),
                patch,
            },
        };
        self.edit_stream.schedule(merged, now);
        changed
    }

    /// Live content edit, the common case of [`Editor::edit_live`]
    pub fn edit_content(&mut self, id: &LayerId, text: &str, now: Instant) -> bool {
        self.edit_live(id, LayerPatch::content(text), now)
    }

    /// Commit the pending live edit if its quiet period has elapsed
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.edit_stream.poll(now) {
            Some(pending) => self.update(&pending.id, &pending.patch),
            None => false,
        }
    }

    /// Commit the pending live edit right away
    pub fn flush_pending(&mut self) -> bool {
        match self.edit_stream.flush() {
            Some(pending) => self.update(&pending.id, &pending.patch),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn background() -> BackgroundImage {
        BackgroundImage {
            reference: "data:image/png;base64,AAAA".into(),
            width: 800,
            height: 600,
        }
    }

    fn editor_with_layer() -> (Editor, LayerId) {
        let mut editor = Editor::default();
        editor.set_background_image(&background());
        let id = editor.add_default_layer().unwrap();
        (editor, id)
    }

    #[test]
    fn first_commit_is_undoable() {
        let mut editor = Editor::default();
        editor.set_background_image(&background());
        assert!(editor.can_undo());
        assert!(editor.undo());
        assert_eq!(editor.document(), &EditorDocument::new());
    }

    #[test]
    fn undo_redo_inverse_law() {
        let (mut editor, id) = editor_with_layer();
        let before = editor.document().clone();
        editor.update(&id, &LayerPatch::position(5.0, 6.0));
        let after = editor.document().clone();

        assert!(editor.undo());
        assert_eq!(editor.document(), &before);
        assert!(editor.redo());
        assert_eq!(editor.document(), &after);
    }

    #[test]
    fn noop_commit_records_nothing() {
        let (mut editor, _) = editor_with_layer();
        let len = editor.history().len();
        assert!(!editor.update(&LayerId::from("missing"), &LayerPatch::content("x")));
        assert_eq!(editor.history().len(), len);
    }

    #[test]
    fn history_is_bounded() {
        let (mut editor, id) = editor_with_layer();
        for step in 0..30 {
            editor.update(&id, &LayerPatch::position(step as f64, 0.0));
        }
        assert_eq!(editor.history().len(), 20);
        assert_eq!(editor.history().cursor(), 19);

        let mut undos = 0;
        while editor.undo() {
            undos += 1;
        }
        assert_eq!(undos, 19);
        // The oldest reachable state still has the layer moved
        assert_eq!(editor.document().layer(&id).unwrap().x, 10.0);
    }

    #[test]
    fn branch_discard() {
        let (mut editor, id) = editor_with_layer();
        editor.update(&id, &LayerPatch::content("one"));
        editor.update(&id, &LayerPatch::content("two"));
        editor.undo();
        editor.undo();
        editor.update(&id, &LayerPatch::content("branch"));
        assert!(!editor.can_redo());
        assert!(!editor.redo());
        assert_eq!(editor.document().layer(&id).unwrap().content, "branch");
    }

    #[test]
    fn undo_keeps_only_single_selection() {
        let (mut editor, first) = editor_with_layer();
        let second = editor.add_default_layer().unwrap();
        editor.select_many(&[first.clone(), second.clone()]);
        editor.update_many(&[first.clone(), second.clone()], &LayerPatch::content("both"));
        // Snapshot holds two selected ids and no single id
        editor.update(&first, &LayerPatch::content("again"));
        editor.undo();
        assert!(editor.document().selected_layer_ids.is_empty());
        assert!(editor.document().text_layers.iter().all(|l| !l.is_selected));

        editor.select(Some(&second), false);
        editor.update(&second, &LayerPatch::content("solo"));
        editor.update(&second, &LayerPatch::content("solo 2"));
        editor.undo();
        assert_eq!(editor.document().selected_layer_ids, vec![second.clone()]);
        assert!(editor.document().layer(&second).unwrap().is_selected);
    }

    #[test]
    fn selection_is_not_recorded() {
        let (mut editor, id) = editor_with_layer();
        let len = editor.history().len();
        editor.clear_selection();
        editor.select(Some(&id), false);
        editor.select_all();
        assert_eq!(editor.history().len(), len);
    }

    #[test]
    fn select_all_twice_is_noop() {
        let (mut editor, _) = editor_with_layer();
        editor.add_default_layer();
        assert!(editor.select_all());
        let revision = editor.revision();
        assert!(!editor.select_all());
        assert_eq!(editor.revision(), revision);
    }

    #[test]
    fn immediate_then_settle_records_once() {
        let (mut editor, id) = editor_with_layer();
        let len = editor.history().len();
        let mut text = String::new();
        for c in "typing!!!!".chars() {
            text.push(c);
            editor.update_immediate(&id, &LayerPatch::content(text.clone()));
        }
        assert_eq!(editor.history().len(), len);
        assert!(editor.update(&id, &LayerPatch::content(text.clone())));
        assert_eq!(editor.history().len(), len + 1);
        assert_eq!(
            editor.history().current().unwrap().layer(&id).unwrap().content,
            "typing!!!!"
        );
    }

    #[test]
    fn debounced_edits_coalesce() {
        let (mut editor, id) = editor_with_layer();
        let len = editor.history().len();
        let start = Instant::now();
        for step in 0..10u64 {
            let now = start + Duration::from_millis(step * 40);
            editor.edit_content(&id, &format!("draft {step}"), now);
            assert!(!editor.tick(now));
        }
        assert_eq!(editor.document().layer(&id).unwrap().content, "draft 9");
        assert_eq!(editor.history().len(), len);

        let settle = start + Duration::from_millis(360 + 500);
        assert!(editor.tick(settle));
        assert_eq!(editor.history().len(), len + 1);
        assert!(!editor.has_pending_edit());

        editor.undo();
        assert_ne!(editor.document().layer(&id).unwrap().content, "draft 9");
    }

    #[test]
    fn edit_on_other_layer_settles_previous() {
        let (mut editor, first) = editor_with_layer();
        let second = editor.add_default_layer().unwrap();
        let len = editor.history().len();
        let now = Instant::now();
        editor.edit_content(&first, "a", now);
        editor.edit_content(&second, "b", now);
        assert_eq!(editor.history().len(), len + 1);
        assert!(editor.flush_pending());
        assert_eq!(editor.history().len(), len + 2);
    }

    #[test]
    fn lock_rejects_pending_settle() {
        let (mut editor, id) = editor_with_layer();
        let original = editor.document().layer(&id).unwrap().content.clone();
        let now = Instant::now();
        editor.edit_content(&id, "typed", now);
        editor.toggle_lock(&id);
        // The lock commit recorded the interim text; the settle is rejected
        let len = editor.history().len();
        editor.edit_content(&id, "more", now);
        assert!(!editor.tick(now + Duration::from_secs(1)));
        assert_eq!(editor.history().len(), len);
        assert_eq!(editor.document().layer(&id).unwrap().content, "typed");
        assert_ne!(original, "typed");
    }

    #[test]
    fn add_default_layer_needs_background() {
        let mut editor = Editor::default();
        assert!(editor.add_default_layer().is_none());
    }

    #[test]
    fn load_resets_history() {
        let (mut editor, _) = editor_with_layer();
        let doc = editor.document().clone();
        editor.load(doc.clone());
        assert_eq!(editor.history().len(), 1);
        assert_eq!(editor.history().cursor(), 0);
        assert!(!editor.can_undo());
        assert_eq!(editor.document(), &doc);
    }

    #[test]
    fn reset_clears_everything() {
        let (mut editor, _) = editor_with_layer();
        editor.reset();
        assert_eq!(editor.document(), &EditorDocument::new());
        assert!(!editor.can_undo());
    }
}
