// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Central application state (`AppState`).
//!
//! `AppState` wires the editor, the scene reconciler and the persistence
//! bridge together. Nothing here is global: the host constructs one with
//! its scene, font loader and store, and tests build as many independent
//! instances as they like. Sub-modules split the methods by domain: file
//! I/O (import, export, load, reset) and editing (keys, scene events,
//! timers).

mod editor;
mod file_io;

use crate::config::EditorConfig;
use crate::editing::Editor;
use crate::model::EditorDocument;
use crate::persistence::{KeyValueStore, PersistenceBridge};
use crate::scene::{FontLoader, Scene, SceneReconciler};
use std::time::Instant;

/// Main application state
pub struct AppState<S, F, K> {
    /// Live document and its history
    pub editor: Editor,

    /// Keeps the visual scene in step with the document
    pub reconciler: SceneReconciler<S, F>,

    /// Debounced autosave
    pub persistence: PersistenceBridge<K>,

    /// Error message to display, if any
    pub error_message: Option<String>,

    /// When the document was last written to storage (formatted for UI)
    pub last_saved: Option<String>,
}

impl<S: Scene, F: FontLoader, K: KeyValueStore> AppState<S, F, K> {
    pub fn new(config: EditorConfig, scene: S, fonts: F, store: K) -> Self {
        let reconciler = SceneReconciler::new(scene, fonts, &config);
        let persistence = PersistenceBridge::new(store, &config);
        Self {
            editor: Editor::new(config),
            reconciler,
            persistence,
            error_message: None,
            last_saved: None,
        }
    }

    pub fn document(&self) -> &EditorDocument {
        self.editor.document()
    }

    pub fn config(&self) -> &EditorConfig {
        self.editor.config()
    }

    /// Run an editor operation, then propagate the result to the scene and
    /// the autosave timer
    pub fn apply<R>(&mut self, now: Instant, op: impl FnOnce(&mut Editor) -> R) -> R {
        let result = op(&mut self.editor);
        self.refresh(now);
        result
    }

    /// Forward-sync the scene and note the document for autosave
    pub fn refresh(&mut self, now: Instant) {
        self.reconciler.sync(self.editor.document());
        self.persistence.observe(self.editor.document(), now);
    }
}
