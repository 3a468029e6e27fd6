// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Input handling for AppState: keyboard, scene events and timers

use super::AppState;
use crate::keyboard::{self, KeyCommand, KeyInput};
use crate::persistence::KeyValueStore;
use crate::scene::{ActiveSelection, FontLoader, Scene};
use chrono::Local;
use std::time::Instant;

impl<S: Scene, F: FontLoader, K: KeyValueStore> AppState<S, F, K> {
    /// Handle a key press. Returns whether it meant anything.
    pub fn handle_key(&mut self, input: &KeyInput, now: Instant) -> bool {
        let Some(command) = keyboard::command_for(input, self.config()) else {
            return false;
        };
        tracing::debug!("Key command: {command:?}");

        match command {
            KeyCommand::Undo => {
                self.apply(now, |editor| editor.undo());
            }
            KeyCommand::Redo => {
                self.apply(now, |editor| editor.redo());
            }
            KeyCommand::SelectAll => {
                self.apply(now, |editor| editor.select_all());
            }
            KeyCommand::Duplicate => {
                self.apply(now, |editor| editor.duplicate_selected());
            }
            KeyCommand::Delete => {
                self.apply(now, |editor| editor.delete_selected());
            }
            KeyCommand::Nudge(delta) => {
                self.reconciler.nudge(&mut self.editor, delta);
                self.refresh(now);
            }
            KeyCommand::ClearSelection => {
                self.reconciler
                    .scene_mut()
                    .set_active_selection(&ActiveSelection::None);
                self.apply(now, |editor| editor.clear_selection());
            }
        }
        true
    }

    /// Route queued scene events into the editor. Returns whether the
    /// document changed.
    pub fn handle_scene_events(&mut self, now: Instant) -> bool {
        let changed = self.reconciler.pump(&mut self.editor);
        if changed {
            self.refresh(now);
        }
        changed
    }

    /// Advance timers: settle quiet content edits, retry pending fonts and
    /// autosave
    pub fn tick(&mut self, now: Instant) {
        if self.editor.tick(now) || self.reconciler.has_waiting_fonts() {
            self.refresh(now);
        }

        match self.persistence.tick(self.editor.document(), now) {
            Ok(true) => {
                self.last_saved = Some(Local::now().format("%I:%M %p").to_string());
            }
            Ok(false) => {}
            Err(e) => tracing::error!("Autosave failed: {e}"),
        }
    }
}
