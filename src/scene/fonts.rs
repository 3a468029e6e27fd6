// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Font availability.
//!
//! A layer's font family has to be loaded before the scene draws it, or
//! the text is measured against the wrong metrics. Loading is asynchronous
//! on a real surface, so the loader answers with a status and the
//! reconciler asks again on its next pass.

use crate::error::FontError;
use std::collections::{HashMap, VecDeque};

/// Where a family comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSource<'a> {
    /// A system or web font, looked up by name
    Named,
    /// A user-uploaded font embedded in the document as a data URL
    Custom { src: &'a str },
}

/// Answer to a load request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontStatus {
    Ready,
    /// Still loading; ask again later
    Pending,
    Failed(FontError),
}

/// Makes font families available to the scene
pub trait FontLoader {
    /// Request a family. Repeated requests for the same family are cheap
    /// and return its current status.
    fn request(&mut self, family: &str, source: FontSource<'_>) -> FontStatus;
}

/// Loader for surfaces that resolve every family synchronously
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadyFonts;

impl FontLoader for ReadyFonts {
    fn request(&mut self, _family: &str, _source: FontSource<'_>) -> FontStatus {
        FontStatus::Ready
    }
}

/// Loader with scripted answers per family.
///
/// Each request pops the next scripted status for the family. Once a
/// family's script runs out its last answer repeats; unscripted families
/// are ready.
#[derive(Debug, Default)]
pub struct ScriptedFonts {
    scripts: HashMap<String, VecDeque<FontStatus>>,
    last: HashMap<String, FontStatus>,
    requests: Vec<(String, bool)>,
}

impl ScriptedFonts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue answers for a family
    pub fn script(&mut self, family: &str, answers: impl IntoIterator<Item = FontStatus>) {
        self.scripts
            .entry(family.to_string())
            .or_default()
            .extend(answers);
    }

    /// Families requested so far, with whether each came from a custom source
    pub fn requests(&self) -> &[(String, bool)] {
        &self.requests
    }

    pub fn request_count(&self, family: &str) -> usize {
        self.requests.iter().filter(|(name, _)| name == family).count()
    }
}

impl FontLoader for ScriptedFonts {
    fn request(&mut self, family: &str, source: FontSource<'_>) -> FontStatus {
        let custom = matches!(source, FontSource::Custom { .. });
        self.requests.push((family.to_string(), custom));

        let next = self
            .scripts
            .get_mut(family)
            .and_then(|queue| queue.pop_front());
        match next {
            Some(status) => {
                self.last.insert(family.to_string(), status.clone());
                status
            }
            None => self.last.get(family).cloned().unwrap_or(FontStatus::Ready),
        }
    }
}
