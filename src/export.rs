// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Flattened PNG export at the image's native resolution.

use crate::error::ExportError;
use crate::import::data_url;
use crate::model::EditorDocument;
use crate::scene::Scene;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

pub use crate::settings::export::FILE_NAME;

/// Rasterize the scene at the document's native size and encode it as PNG.
///
/// Display zoom plays no part: the output is always
/// `image_width` x `image_height`.
pub fn export_png<S: Scene>(scene: &S, doc: &EditorDocument) -> Result<Vec<u8>, ExportError> {
    if doc.background_image.is_none() {
        return Err(ExportError::NoBackground);
    }
    let (width, height) = (doc.image_width, doc.image_height);

    let raster = scene
        .rasterize(width, height)
        .map_err(|err| ExportError::Surface(format!("{err:#}")))?;
    let (actual_width, actual_height) = raster.dimensions();
    if (actual_width, actual_height) != (width, height) {
        return Err(ExportError::SizeMismatch {
            width,
            height,
            actual_width,
            actual_height,
        });
    }

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(raster).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    tracing::info!("Exported {width}x{height} PNG ({} bytes)", png.len());
    Ok(png)
}

/// PNG bytes as a `data:image/png;base64,...` URL
pub fn png_data_url(png: &[u8]) -> String {
    data_url("image/png", png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;

    fn doc(width: u32, height: u32) -> EditorDocument {
        EditorDocument {
            background_image: Some("data:image/png;base64,AAAA".to_string()),
            image_width: width,
            image_height: height,
            ..EditorDocument::default()
        }
    }

    #[test]
    fn exports_at_native_size() {
        let png = export_png(&MemoryScene::new(), &doc(1600, 900)).unwrap();
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1600, 900));
    }

    #[test]
    fn needs_a_background() {
        let result = export_png(&MemoryScene::new(), &EditorDocument::new());
        assert!(matches!(result, Err(ExportError::NoBackground)));
    }

    #[test]
    fn surface_failures_are_reported() {
        let result = export_png(&MemoryScene::new(), &doc(0, 10));
        assert!(matches!(result, Err(ExportError::Surface(_))));
    }

    #[test]
    fn data_url_and_file_name() {
        assert!(png_data_url(&[1, 2, 3]).starts_with("data:image/png;base64,"));
        assert_eq!(FILE_NAME, "image-composition.png");
    }
}
