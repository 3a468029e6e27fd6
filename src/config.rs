// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Runtime configuration loaded from TOML.
//!
//! Every field is optional in the file; missing fields take the defaults
//! from `settings.rs`.

use crate::error::ConfigError;
use crate::settings;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Tunables for the editor core
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum snapshots in the undo/redo timeline (clamped to at least 1)
    pub history_capacity: usize,
    /// Quiet period before live content edits are committed
    pub content_settle_ms: u64,
    /// Quiet period before the document is written to storage
    pub autosave_ms: u64,
    pub nudge_step: f64,
    pub nudge_step_large: f64,
    pub duplicate_offset: f64,
    pub default_font_family: String,
    /// Sync passes a font may stay pending before falling back
    pub font_load_attempts: u32,
    pub max_display_width: f64,
    pub max_display_height: f64,
    pub storage_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: settings::history::CAPACITY,
            content_settle_ms: settings::debounce::CONTENT_SETTLE_MS,
            autosave_ms: settings::debounce::AUTOSAVE_MS,
            nudge_step: settings::nudge::BASE,
            nudge_step_large: settings::nudge::SHIFT,
            duplicate_offset: settings::layers::DUPLICATE_OFFSET,
            default_font_family: settings::fonts::DEFAULT_FAMILY.to_string(),
            font_load_attempts: settings::fonts::LOAD_ATTEMPTS,
            max_display_width: settings::display::MAX_WIDTH,
            max_display_height: settings::display::MAX_HEIGHT,
            storage_key: settings::storage::KEY.to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn content_settle(&self) -> Duration {
        Duration::from_millis(self.content_settle_ms)
    }

    pub fn autosave(&self) -> Duration {
        Duration::from_millis(self.autosave_ms)
    }

    fn sanitized(mut self) -> Self {
        if self.history_capacity == 0 {
            tracing::warn!("history_capacity of 0 is not usable, using 1");
            self.history_capacity = 1;
        }
        if self.font_load_attempts == 0 {
            self.font_load_attempts = 1;
        }
        if self.max_display_width.is_nan() || self.max_display_width <= 0.0 {
            self.max_display_width = settings::display::MAX_WIDTH;
        }
        if self.max_display_height.is_nan() || self.max_display_height <= 0.0 {
            self.max_display_height = settings::display::MAX_HEIGHT;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.history_capacity, 20);
        assert_eq!(config.content_settle(), Duration::from_millis(500));
        assert_eq!(config.autosave(), Duration::from_millis(1000));
    }

    #[test]
    fn partial_override() {
        let config = EditorConfig::from_toml_str(
            "history_capacity = 5\ndefault_font_family = \"Georgia\"\n",
        )
        .unwrap();
        assert_eq!(config.history_capacity, 5);
        assert_eq!(config.default_font_family, "Georgia");
        assert_eq!(config.nudge_step_large, 10.0);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let config = EditorConfig::from_toml_str("history_capacity = 0").unwrap();
        assert_eq!(config.history_capacity, 1);
    }

    #[test]
    fn bad_toml_is_an_error() {
        let result = EditorConfig::from_toml_str("history_capacity = \"many\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
