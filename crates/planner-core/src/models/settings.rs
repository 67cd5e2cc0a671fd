// ABOUTME: User settings record (system prompt and background image)
// ABOUTME: Missing or blank persisted values fall back to the built-in defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};

use crate::constants::defaults::{DEFAULT_BACKGROUND_IMAGE, DEFAULT_SYSTEM_PROMPT};

/// Process-wide user preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Instruction preamble for free-text recipe generation
    pub system_prompt: String,
    /// URL of the page background
    pub background_image: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
            background_image: DEFAULT_BACKGROUND_IMAGE.to_owned(),
        }
    }
}

impl Settings {
    /// Replace blank fields with their defaults
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.system_prompt.trim().is_empty() {
            DEFAULT_SYSTEM_PROMPT.clone_into(&mut self.system_prompt);
        }
        if self.background_image.trim().is_empty() {
            DEFAULT_BACKGROUND_IMAGE.clone_into(&mut self.background_image);
        }
        self
    }

    /// True when the default background is in use
    #[must_use]
    pub fn has_default_background(&self) -> bool {
        self.background_image == DEFAULT_BACKGROUND_IMAGE
    }
}
