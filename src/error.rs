// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the fallible edges of the editor.
//!
//! Document operations never fail: a missing id or a locked layer resolves
//! to an unchanged document. Errors only come from collaborators (storage,
//! decoders, the scene's rasterizer, the config file).

use std::path::PathBuf;
use thiserror::Error;

/// Failure reading or writing persisted state
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("malformed persisted state: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Rejected import, raised before any document mutation
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported font file {0:?} (expected .ttf or .otf)")]
    UnsupportedFont(String),

    #[error("font file {0:?} is not a TrueType/OpenType font")]
    MalformedFont(String),

    #[error("unsupported image file {0:?} (expected PNG or JPEG)")]
    UnsupportedImage(String),

    #[error("failed to decode image {name:?}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("image {0:?} has zero width or height")]
    EmptyImage(String),
}

/// Failure producing the flattened raster
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: no background image")]
    NoBackground,

    #[error("scene failed to rasterize: {0}")]
    Surface(String),

    #[error("scene produced {actual_width}x{actual_height}, expected {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Failure making a font family available to the scene
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FontError {
    #[error("font {family:?} failed to load: {reason}")]
    Load { family: String, reason: String },

    #[error("font {0:?} did not become available in time")]
    TimedOut(String),
}

/// Failure loading the TOML configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
