// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Editing model: history, selection and layer operations

pub mod debounce;
pub mod editor;
pub mod history;
pub mod ops;
pub mod selection;

pub use debounce::Debouncer;
pub use editor::Editor;
pub use history::History;
pub use ops::Direction;
pub use selection::Selection;
