// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Application settings and default constants.
//!
//! These are the compiled-in defaults. Runtime overrides live in
//! `config.rs`, which falls back to the values here for any field the
//! config file leaves out.

// ============================================================================
// HISTORY SETTINGS
// ============================================================================
/// Maximum number of snapshots kept in the undo/redo timeline
const HISTORY_CAPACITY: usize = 20;

// ============================================================================
// DEBOUNCE SETTINGS
// ============================================================================
/// Quiet period before live content edits are settled into history
const CONTENT_SETTLE_MS: u64 = 500;

/// Quiet period before the document is written to storage
const AUTOSAVE_MS: u64 = 1000;

// ============================================================================
// NUDGE SETTINGS
// ============================================================================
/// Arrow key nudge in image pixels
const NUDGE_BASE: f64 = 1.0;

/// Shift-arrow nudge in image pixels
const NUDGE_SHIFT: f64 = 10.0;

// ============================================================================
// LAYER SETTINGS
// ============================================================================
/// Offset applied to duplicated layers so they don't stack exactly
const DUPLICATE_OFFSET: f64 = 20.0;

/// Line height used when a new layer doesn't specify one
const DEFAULT_LINE_HEIGHT: f64 = 1.16;

/// Letter spacing used when a new layer doesn't specify one
const DEFAULT_LETTER_SPACING: f64 = 0.0;

// ============================================================================
// DISPLAY SETTINGS
// ============================================================================
// The on-screen surface is fit into this box and never upscaled.
// Export always happens at the image's native size.

/// Maximum on-screen width of the composition
const MAX_DISPLAY_WIDTH: f64 = 1200.0;

/// Maximum on-screen height of the composition
const MAX_DISPLAY_HEIGHT: f64 = 650.0;

// ============================================================================
// STORAGE SETTINGS
// ============================================================================
/// Key the persisted document is stored under
const STORAGE_KEY: &str = "image-text-composer-state";

// ============================================================================
// EXPORT SETTINGS
// ============================================================================
/// Suggested file name for the flattened PNG
const EXPORT_FILE_NAME: &str = "image-composition.png";

// ============================================================================
// FONT SETTINGS
// ============================================================================
/// Family used when a requested font fails to load
const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Number of sync passes a font may stay pending before falling back
const FONT_LOAD_ATTEMPTS: u32 = 10;

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Undo/redo history settings
pub mod history {
    /// Maximum number of snapshots kept
    pub const CAPACITY: usize = super::HISTORY_CAPACITY;
}

/// Debounce windows for coalesced commits
pub mod debounce {
    /// Content edits → history (milliseconds)
    pub const CONTENT_SETTLE_MS: u64 = super::CONTENT_SETTLE_MS;

    /// Document → storage (milliseconds)
    pub const AUTOSAVE_MS: u64 = super::AUTOSAVE_MS;
}

/// Nudge amounts for arrow key movement
pub mod nudge {
    /// Base nudge (arrow key alone)
    pub const BASE: f64 = super::NUDGE_BASE;

    /// Shift-arrow nudge
    pub const SHIFT: f64 = super::NUDGE_SHIFT;
}

/// Text layer defaults
pub mod layers {
    pub const DUPLICATE_OFFSET: f64 = super::DUPLICATE_OFFSET;
    pub const DEFAULT_LINE_HEIGHT: f64 = super::DEFAULT_LINE_HEIGHT;
    pub const DEFAULT_LETTER_SPACING: f64 = super::DEFAULT_LETTER_SPACING;

    /// Values used by the "add text" command
    pub mod new_text {
        pub const CONTENT: &str = "Double click to edit";
        pub const WIDTH: f64 = 200.0;
        pub const HEIGHT: f64 = 50.0;
        pub const FONT_SIZE: f64 = 24.0;
        pub const FONT_WEIGHT: &str = "400";
        pub const COLOR: &str = "#000000";
    }
}

/// On-screen display bounds
pub mod display {
    pub const MAX_WIDTH: f64 = super::MAX_DISPLAY_WIDTH;
    pub const MAX_HEIGHT: f64 = super::MAX_DISPLAY_HEIGHT;
}

/// Persistence settings
pub mod storage {
    /// Key the persisted document is stored under
    pub const KEY: &str = super::STORAGE_KEY;
}

/// Export settings
pub mod export {
    pub const FILE_NAME: &str = super::EXPORT_FILE_NAME;
}

/// Font loading settings
pub mod fonts {
    /// Fallback family for fonts that fail to load
    pub const DEFAULT_FAMILY: &str = super::DEFAULT_FONT_FAMILY;

    /// Bounded retry window for pending font loads (sync passes)
    pub const LOAD_ATTEMPTS: u32 = super::FONT_LOAD_ATTEMPTS;

    /// CSS font weights offered for text layers (value, label)
    pub const WEIGHTS: [(&str, &str); 9] = [
        ("100", "Thin (100)"),
        ("200", "Extra Light (200)"),
        ("300", "Light (300)"),
        ("400", "Regular (400)"),
        ("500", "Medium (500)"),
        ("600", "Semi Bold (600)"),
        ("700", "Bold (700)"),
        ("800", "Extra Bold (800)"),
        ("900", "Black (900)"),
    ];

    /// Web font families offered in the font picker (sorted by name)
    pub const WEB_FAMILIES: [&str; 30] = [
        "Arial",
        "Comic Sans MS",
        "Cormorant Garamond",
        "Crimson Text",
        "EB Garamond",
        "Fira Sans",
        "Georgia",
        "Helvetica",
        "Impact",
        "Lato",
        "Libre Baskerville",
        "Lora",
        "Merriweather",
        "Montserrat",
        "Nunito",
        "Open Sans",
        "Oswald",
        "Playfair Display",
        "Poppins",
        "PT Sans",
        "PT Serif",
        "Raleway",
        "Roboto",
        "Source Sans Pro",
        "Source Serif Pro",
        "Times New Roman",
        "Trebuchet MS",
        "Ubuntu",
        "Verdana",
        "Work Sans",
    ];
}
