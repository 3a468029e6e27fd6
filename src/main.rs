// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Image Text Composer: inspect or clear a saved composition

use anyhow::{Context, Result, bail};
use image_text_composer::persistence::FileStore;
use image_text_composer::scene::{MemoryScene, ReadyFonts};
use image_text_composer::{AppState, EditorConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;

const USAGE: &str = "Usage: image-text-composer <storage-dir> [--reset]";

/// Optional config file inside the storage directory
const CONFIG_FILE: &str = "config.toml";

fn main() -> Result<()> {
    image_text_composer::init_tracing();

    let mut storage_dir: Option<PathBuf> = None;
    let mut reset = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--reset" => reset = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            path if storage_dir.is_none() => storage_dir = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument {extra}\n{USAGE}"),
        }
    }
    let Some(storage_dir) = storage_dir else {
        bail!(USAGE);
    };

    let config = load_config(&storage_dir)?;
    let store = FileStore::open(&storage_dir)
        .with_context(|| format!("failed to open storage at {}", storage_dir.display()))?;
    let mut state = AppState::new(config, MemoryScene::new(), ReadyFonts, store);
    let now = Instant::now();

    if reset {
        state.reset_all(now);
        println!("Cleared saved composition in {}", storage_dir.display());
        return Ok(());
    }

    if !state.load_persisted(now) {
        println!("No saved composition in {}", storage_dir.display());
        return Ok(());
    }
    print_summary(&state);
    Ok(())
}

fn load_config(storage_dir: &Path) -> Result<EditorConfig> {
    let path = storage_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(EditorConfig::default());
    }
    EditorConfig::load(&path).with_context(|| format!("failed to load {}", path.display()))
}

fn print_summary(state: &AppState<MemoryScene, ReadyFonts, FileStore>) {
    let doc = state.document();
    match &doc.background_image {
        Some(_) => println!("Background: {}x{}", doc.image_width, doc.image_height),
        None => println!("Background: none"),
    }

    println!("Layers: {}", doc.text_layers.len());
    for layer in doc.text_layers.iter().rev() {
        let mut flags = String::new();
        if layer.is_selected {
            flags.push_str(" [selected]");
        }
        if layer.is_locked {
            flags.push_str(" [locked]");
        }
        println!(
            "  z={:<3} {:?} at ({:.0}, {:.0}) {:.0}x{:.0} {}° {} {}px{}",
            layer.z_index,
            layer.content,
            layer.x,
            layer.y,
            layer.width,
            layer.height,
            layer.rotation,
            layer.font_family,
            layer.font_size,
            flags
        );
    }

    if !doc.custom_fonts.is_empty() {
        let names: Vec<&str> = doc.custom_fonts.iter().map(|font| font.name.as_str()).collect();
        println!("Custom fonts: {}", names.join(", "));
    }
}
