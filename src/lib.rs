// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Image Text Composer: the editor core for layering styled text over a
//! background image.
//!
//! The document model, undo/redo history, selection and layer operations
//! are plain data and pure functions. The rendering surface, font loading
//! and storage are collaborators behind traits ([`scene::Scene`],
//! [`scene::FontLoader`], [`persistence::KeyValueStore`]), wired together
//! by [`AppState`].

pub mod config;
pub mod data;
pub mod editing;
pub mod error;
pub mod export;
pub mod import;
pub mod keyboard;
pub mod model;
pub mod persistence;
pub mod scene;
pub mod settings;

pub use config::EditorConfig;
pub use data::AppState;
pub use editing::Editor;
pub use error::{ConfigError, ExportError, FontError, ImportError, StorageError};
pub use model::{EditorDocument, LayerId, LayerPatch, TextLayer};

use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset or invalid
const DEFAULT_LOG_FILTER: &str = "image_text_composer=info";

/// Install the global tracing subscriber (controlled via `RUST_LOG`)
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing subscriber already installed");
    }
}
