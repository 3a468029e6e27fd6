// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Importing background images and custom fonts.
//!
//! Both checks run before the document is touched: a rejected file never
//! produces a history entry.

use crate::error::ImportError;
use crate::model::{BackgroundImage, CustomFont};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// Font file extensions accepted for upload
const FONT_EXTENSIONS: [&str; 2] = ["ttf", "otf"];

/// Leading tags of TrueType and OpenType (CFF) font files
const SFNT_SIGNATURES: [[u8; 4]; 3] = [[0x00, 0x01, 0x00, 0x00], *b"OTTO", *b"true"];

/// Encode bytes as a base64 data URL
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Decode an uploaded background image.
///
/// PNG and JPEG are accepted. The returned reference is a data URL of the
/// original bytes; width and height are the natural pixel size.
pub fn import_image(name: &str, bytes: &[u8]) -> Result<BackgroundImage, ImportError> {
    let format = image::guess_format(bytes)
        .map_err(|_| ImportError::UnsupportedImage(name.to_string()))?;
    let mime = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        _ => return Err(ImportError::UnsupportedImage(name.to_string())),
    };

    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|source| ImportError::Decode {
            name: name.to_string(),
            source,
        })?;
    if width == 0 || height == 0 {
        return Err(ImportError::EmptyImage(name.to_string()));
    }

    tracing::info!("Imported image {name}: {width}x{height} {mime}");
    Ok(BackgroundImage {
        reference: data_url(mime, bytes),
        width,
        height,
    })
}

/// Validate an uploaded font and register it under its display name
pub fn import_font(file_name: &str, bytes: &[u8]) -> Result<CustomFont, ImportError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| FONT_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| ImportError::UnsupportedFont(file_name.to_string()))?;

    let signature = bytes.get(..4).and_then(|head| <[u8; 4]>::try_from(head).ok());
    if !signature.is_some_and(|tag| SFNT_SIGNATURES.contains(&tag)) {
        return Err(ImportError::MalformedFont(file_name.to_string()));
    }

    let font = CustomFont {
        name: CustomFont::display_name(file_name),
        src: data_url(&format!("font/{extension}"), bytes),
    };
    tracing::info!("Imported font {} ({} bytes)", font.name, bytes.len());
    Ok(font)
}
