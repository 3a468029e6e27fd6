// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Persistence bridge: debounced autosave to a key-value store and restore
//! on startup.
//!
//! Only one snapshot is ever persisted. History does not survive a reload;
//! a restored document becomes the sole history entry.

use crate::config::EditorConfig;
use crate::editing::selection::{self, Selection};
use crate::editing::Debouncer;
use crate::error::StorageError;
use crate::model::{CustomFont, EditorDocument, LayerId, TextLayer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Blob storage addressed by string keys
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Store kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store with one JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` for storage, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // Write then rename so a crash never leaves a half-written snapshot
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, value).map_err(|source| StorageError::Io {
            path: temp.clone(),
            source,
        })?;
        std::fs::rename(&temp, &path).map_err(|source| StorageError::Io { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

/// The persisted slice of a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub image_width: u32,
    #[serde(default)]
    pub image_height: u32,
    #[serde(default)]
    pub text_layers: Vec<TextLayer>,
    #[serde(default)]
    pub selected_layer_id: Option<LayerId>,
    /// Absent in older snapshots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_layer_ids: Option<Vec<LayerId>>,
    #[serde(default)]
    pub custom_fonts: Vec<CustomFont>,
}

impl From<&EditorDocument> for PersistedState {
    fn from(doc: &EditorDocument) -> Self {
        Self {
            background_image: doc.background_image.clone(),
            image_width: doc.image_width,
            image_height: doc.image_height,
            text_layers: doc.text_layers.clone(),
            selected_layer_id: doc.selected_layer_id.clone(),
            selected_layer_ids: Some(doc.selected_layer_ids.clone()),
            custom_fonts: doc.custom_fonts.clone(),
        }
    }
}

impl PersistedState {
    /// Rebuild a document. Selection falls back from the id list to the
    /// single id to nothing.
    pub fn into_document(self) -> EditorDocument {
        let selected_layer_ids = match (self.selected_layer_ids, &self.selected_layer_id) {
            (Some(ids), _) => ids,
            (None, Some(id)) => vec![id.clone()],
            (None, None) => Vec::new(),
        };
        let mut doc = EditorDocument {
            background_image: self.background_image,
            image_width: self.image_width,
            image_height: self.image_height,
            text_layers: self.text_layers,
            custom_fonts: self.custom_fonts,
            ..EditorDocument::default()
        };
        // Stored ids may name deleted layers or disagree with the single id
        selection::set_selection(&mut doc, Selection::from_ids(selected_layer_ids));
        doc
    }
}

/// Fields whose change schedules an autosave
fn same_watched_slice(a: &EditorDocument, b: &EditorDocument) -> bool {
    a.background_image == b.background_image
        && a.image_width == b.image_width
        && a.image_height == b.image_height
        && a.text_layers == b.text_layers
        && a.selected_layer_ids == b.selected_layer_ids
}

/// Debounced writer between the live document and a [`KeyValueStore`]
#[derive(Debug)]
pub struct PersistenceBridge<K> {
    store: K,
    key: String,
    autosave: Debouncer<()>,
    /// Last document observed, for change detection
    observed: Option<EditorDocument>,
}

impl<K: KeyValueStore> PersistenceBridge<K> {
    pub fn new(store: K, config: &EditorConfig) -> Self {
        Self {
            store,
            key: config.storage_key.clone(),
            autosave: Debouncer::new(config.autosave()),
            observed: None,
        }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn has_pending_save(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Note the live document. A change to the watched slice restarts the
    /// quiet period.
    pub fn observe(&mut self, doc: &EditorDocument, now: Instant) -> bool {
        if self
            .observed
            .as_ref()
            .is_some_and(|previous| same_watched_slice(previous, doc))
        {
            return false;
        }
        self.observed = Some(doc.clone());
        self.autosave.schedule((), now);
        true
    }

    /// Write `doc` if the quiet period has ended. Returns whether it was
    /// written.
    pub fn tick(&mut self, doc: &EditorDocument, now: Instant) -> Result<bool, StorageError> {
        if self.autosave.poll(now).is_none() {
            return Ok(false);
        }
        self.save(doc)
    }

    /// Write `doc` now if a save is pending
    pub fn flush(&mut self, doc: &EditorDocument) -> Result<bool, StorageError> {
        if self.autosave.flush().is_none() {
            return Ok(false);
        }
        self.save(doc)
    }

    /// Write `doc` unless it's empty
    pub fn save(&mut self, doc: &EditorDocument) -> Result<bool, StorageError> {
        if !doc.has_content() {
            tracing::debug!("Autosave skipped: nothing to persist");
            return Ok(false);
        }
        let json = serde_json::to_string(&PersistedState::from(doc))?;
        self.store.set(&self.key, &json)?;
        tracing::debug!("Saved {} layers ({} bytes)", doc.text_layers.len(), json.len());
        Ok(true)
    }

    /// Read the persisted document, if any
    pub fn load(&mut self) -> Result<Option<EditorDocument>, StorageError> {
        let Some(json) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        let state: PersistedState = serde_json::from_str(&json)?;
        let doc = state.into_document();
        // Restoring is not a change worth saving back
        self.observed = Some(doc.clone());
        self.autosave.cancel();
        tracing::info!(
            "Restored {} layers and {} custom fonts",
            doc.text_layers.len(),
            doc.custom_fonts.len()
        );
        Ok(Some(doc))
    }

    /// Drop the persisted snapshot and any pending save
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.autosave.cancel();
        self.observed = None;
        self.store.remove(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTextLayer;
    use std::time::Duration;

    fn doc_with_layer() -> EditorDocument {
        let id = LayerId::from("layer-1");
        let mut layer = NewTextLayer::default().into_layer(id.clone(), 0);
        layer.is_selected = true;
        EditorDocument {
            background_image: Some("data:image/png;base64,AAAA".to_string()),
            image_width: 640,
            image_height: 480,
            text_layers: vec![layer],
            selected_layer_id: Some(id.clone()),
            selected_layer_ids: vec![id],
            custom_fonts: vec![CustomFont {
                name: "Brand".to_string(),
                src: "data:font/ttf;base64,AAEAAA==".to_string(),
            }],
        }
    }

    fn bridge() -> PersistenceBridge<MemoryStore> {
        PersistenceBridge::new(MemoryStore::new(), &EditorConfig::default())
    }

    #[test]
    fn round_trip_reproduces_document() {
        let doc = doc_with_layer();
        let mut bridge = bridge();
        assert!(bridge.save(&doc).unwrap());
        assert_eq!(bridge.load().unwrap(), Some(doc));
    }

    #[test]
    fn autosave_waits_for_quiet_period() {
        let doc = doc_with_layer();
        let mut bridge = bridge();
        let start = Instant::now();

        assert!(bridge.observe(&doc, start));
        assert!(!bridge.tick(&doc, start + Duration::from_millis(999)).unwrap());
        assert!(bridge.store().is_empty());

        assert!(bridge.tick(&doc, start + Duration::from_millis(1000)).unwrap());
        assert_eq!(bridge.store().len(), 1);
    }

    #[test]
    fn changes_reschedule_rather_than_stack() {
        let mut doc = doc_with_layer();
        let mut bridge = bridge();
        let start = Instant::now();
        bridge.observe(&doc, start);

        doc.text_layers[0].x = 99.0;
        let later = start + Duration::from_millis(600);
        assert!(bridge.observe(&doc, later));
        assert!(!bridge.tick(&doc, start + Duration::from_millis(1000)).unwrap());
        assert!(bridge.tick(&doc, later + Duration::from_millis(1000)).unwrap());

        let saved = bridge.load().unwrap().unwrap();
        assert_eq!(saved.text_layers[0].x, 99.0);
    }

    #[test]
    fn unwatched_changes_do_not_schedule() {
        let mut doc = doc_with_layer();
        let mut bridge = bridge();
        let now = Instant::now();
        bridge.observe(&doc, now);
        bridge.tick(&doc, now + Duration::from_secs(2)).unwrap();

        doc.custom_fonts.clear();
        assert!(!bridge.observe(&doc, now + Duration::from_secs(3)));
        assert!(!bridge.has_pending_save());
    }

    #[test]
    fn empty_document_is_not_written() {
        let mut bridge = bridge();
        let doc = EditorDocument::new();
        let now = Instant::now();
        bridge.observe(&EditorDocument::default(), now);
        assert!(!bridge.tick(&doc, now + Duration::from_secs(1)).unwrap());
        assert!(bridge.store().is_empty());
    }

    #[test]
    fn selection_falls_back_to_single_id() {
        let id = LayerId::from("layer-7");
        let state = PersistedState {
            text_layers: vec![NewTextLayer::default().into_layer(id.clone(), 0)],
            selected_layer_id: Some(id.clone()),
            selected_layer_ids: None,
            ..PersistedState::default()
        };
        let doc = state.into_document();
        assert_eq!(doc.selected_layer_ids, vec![id.clone()]);
        assert_eq!(doc.selected_layer_id, Some(id));
        assert!(doc.text_layers[0].is_selected);

        let bare: PersistedState = serde_json::from_str("{}").unwrap();
        assert!(bare.into_document().selected_layer_ids.is_empty());
    }

    #[test]
    fn restored_selection_drops_missing_ids_and_recomputes_single() {
        let b = LayerId::from("b");
        let mut layer = NewTextLayer::default().into_layer(b.clone(), 0);
        layer.is_selected = false;
        let state = PersistedState {
            text_layers: vec![layer],
            selected_layer_id: None,
            selected_layer_ids: Some(vec![b.clone(), LayerId::from("gone")]),
            ..PersistedState::default()
        };

        let doc = state.into_document();
        assert_eq!(doc.selected_layer_ids, vec![b.clone()]);
        assert_eq!(doc.selected_layer_id, Some(b));
        assert!(doc.text_layers[0].is_selected);
    }

    #[test]
    fn single_id_of_a_deleted_layer_is_not_restored() {
        let json = r#"{"textLayers": [], "selectedLayerId": "layer-7"}"#;
        let state: PersistedState = serde_json::from_str(json).unwrap();
        let doc = state.into_document();
        assert!(doc.selected_layer_ids.is_empty());
        assert_eq!(doc.selected_layer_id, None);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let mut store = MemoryStore::new();
        store.set(crate::settings::storage::KEY, "{not json").unwrap();
        let mut bridge = PersistenceBridge::new(store, &EditorConfig::default());
        assert!(matches!(bridge.load(), Err(StorageError::Malformed(_))));
    }

    #[test]
    fn clear_removes_snapshot() {
        let doc = doc_with_layer();
        let mut bridge = bridge();
        bridge.save(&doc).unwrap();
        bridge.clear().unwrap();
        assert_eq!(bridge.load().unwrap(), None);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!(
            "image-text-composer-test-{}-{}",
            std::process::id(),
            LayerId::next()
        ));
        let mut store = FileStore::open(&dir).unwrap();

        assert_eq!(store.get("state").unwrap(), None);
        store.set("state", "{\"a\":1}").unwrap();
        assert_eq!(store.get("state").unwrap().as_deref(), Some("{\"a\":1}"));
        store.remove("state").unwrap();
        store.remove("state").unwrap();
        assert_eq!(store.get("state").unwrap(), None);
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
