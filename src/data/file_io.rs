// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! File I/O operations for AppState (import, export, load, save, reset)

use super::AppState;
use crate::error::ExportError;
use crate::export;
use crate::import;
use crate::persistence::KeyValueStore;
use crate::scene::{FontLoader, Scene};
use chrono::Local;
use std::time::Instant;

impl<S: Scene, F: FontLoader, K: KeyValueStore> AppState<S, F, K> {
    /// Restore the persisted document, if there is one.
    ///
    /// A missing or unreadable snapshot leaves the empty document in place.
    pub fn load_persisted(&mut self, now: Instant) -> bool {
        let loaded = match self.persistence.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!("Failed to load saved state: {e}");
                return false;
            }
        };
        let Some(doc) = loaded else {
            tracing::debug!("No saved state");
            return false;
        };

        self.reconciler.preload_fonts(&doc);
        self.editor.load(doc);
        self.refresh(now);
        true
    }

    /// Replace the background with an uploaded image
    pub fn import_background(&mut self, name: &str, bytes: &[u8], now: Instant) -> bool {
        match import::import_image(name, bytes) {
            Ok(image) => {
                self.error_message = None;
                self.apply(now, |editor| editor.set_background_image(&image))
            }
            Err(e) => {
                let error = format!("Failed to import image: {e}");
                tracing::warn!("{error}");
                self.error_message = Some(error);
                false
            }
        }
    }

    /// Register an uploaded font with the document and the font loader
    pub fn import_font(&mut self, file_name: &str, bytes: &[u8], now: Instant) -> bool {
        match import::import_font(file_name, bytes) {
            Ok(font) => {
                self.error_message = None;
                let added = self.apply(now, |editor| editor.add_custom_font(&font.name, &font.src));
                if added {
                    self.reconciler.preload_fonts(self.editor.document());
                }
                added
            }
            Err(e) => {
                let error = format!("Failed to import font: {e}");
                tracing::warn!("{error}");
                self.error_message = Some(error);
                false
            }
        }
    }

    /// Flattened PNG of the composition at native resolution
    pub fn export_png(&mut self) -> Result<Vec<u8>, ExportError> {
        // Unsettled live edits are already visible; make them part of the
        // exported document too
        if self.editor.flush_pending() {
            self.reconciler.sync(self.editor.document());
        }
        export::export_png(self.reconciler.scene(), self.editor.document()).inspect_err(|e| {
            tracing::error!("Export failed: {e}");
        })
    }

    /// Write the document now, bypassing the autosave delay
    pub fn save_now(&mut self) -> bool {
        match self.persistence.save(self.editor.document()) {
            Ok(saved) => {
                if saved {
                    self.last_saved = Some(Local::now().format("%I:%M %p").to_string());
                }
                saved
            }
            Err(e) => {
                let error = format!("Failed to save: {e}");
                tracing::error!("{error}");
                self.error_message = Some(error);
                false
            }
        }
    }

    /// Full reset: empty document, fresh history, no scene objects and no
    /// persisted snapshot. Also the recovery path after a rendering failure.
    pub fn reset_all(&mut self, now: Instant) {
        self.editor.reset();
        if let Err(e) = self.persistence.clear() {
            tracing::error!("Failed to clear saved state: {e}");
        }
        self.reconciler.sync(self.editor.document());
        self.persistence.observe(self.editor.document(), now);
        self.error_message = None;
        self.last_saved = None;
        tracing::info!("Reset to a blank editor");
    }
}
