// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Keyboard shortcuts.
//!
//! Maps a key press to an editor command. Execution happens in
//! `AppState::handle_key`; this module only decides what a key means.

use crate::config::EditorConfig;
use kurbo::Vec2;

/// Keys the editor cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A printable key, lowercase or not
    Character(String),
    Delete,
    Backspace,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        meta: false,
        alt: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const COMMAND: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Cmd on macOS, Ctrl elsewhere
    pub fn command(&self) -> bool {
        self.meta || self.ctrl
    }
}

/// One key-down event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Focus is inside a text input, where keys belong to the input
    pub in_text_field: bool,
}

impl KeyInput {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            in_text_field: false,
        }
    }

    pub fn character(c: &str, modifiers: Modifiers) -> Self {
        Self::new(Key::Character(c.to_string()), modifiers)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyCommand {
    Undo,
    Redo,
    SelectAll,
    Duplicate,
    /// Delete the selection, skipping locked layers
    Delete,
    /// Move the active selection by this many image pixels
    Nudge(Vec2),
    /// Drop the active visual selection
    ClearSelection,
}

/// What `input` asks the editor to do, if anything
pub fn command_for(input: &KeyInput, config: &EditorConfig) -> Option<KeyCommand> {
    if input.in_text_field {
        return None;
    }
    let mods = input.modifiers;
    let step = if mods.shift {
        config.nudge_step_large
    } else {
        config.nudge_step
    };

    match &input.key {
        Key::Character(c) if mods.command() => match c.to_ascii_lowercase().as_str() {
            "z" if mods.shift => Some(KeyCommand::Redo),
            "z" => Some(KeyCommand::Undo),
            "y" => Some(KeyCommand::Redo),
            "a" => Some(KeyCommand::SelectAll),
            "d" => Some(KeyCommand::Duplicate),
            _ => None,
        },
        Key::Delete | Key::Backspace => Some(KeyCommand::Delete),
        Key::Escape => Some(KeyCommand::ClearSelection),
        Key::ArrowUp => Some(KeyCommand::Nudge(Vec2::new(0.0, -step))),
        Key::ArrowDown => Some(KeyCommand::Nudge(Vec2::new(0.0, step))),
        Key::ArrowLeft => Some(KeyCommand::Nudge(Vec2::new(-step, 0.0))),
        Key::ArrowRight => Some(KeyCommand::Nudge(Vec2::new(step, 0.0))),
        _ => None,
    }
}
