// ABOUTME: Settings store for the recipe-generation system prompt and the background image
// ABOUTME: Blank values fall back to defaults and every change re-persists the full record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # User Settings
//!
//! A single process-wide record. Both fields are always written together,
//! so the last writer wins over both.

use std::sync::Arc;

use url::Url;

use crate::constants::{defaults, storage};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use crate::models::Settings;
use crate::storage::{LoadOutcome, PersistedState, SnapshotPayload, SnapshotStore};

impl SnapshotPayload for Settings {
    const KEY: &'static str = storage::SETTINGS_KEY;
    const SCHEMA_VERSION: u32 = storage::SETTINGS_SCHEMA_VERSION;

    fn normalize(self) -> Self {
        self.normalized()
    }
}

/// Persisted user settings
#[derive(Debug)]
pub struct SettingsStore {
    state: PersistedState<Settings>,
}

impl SettingsStore {
    /// Create a store in the Loading phase
    #[must_use]
    pub fn new(backend: Arc<dyn SnapshotStore>) -> Self {
        Self {
            state: PersistedState::new(backend),
        }
    }

    /// Create a store and load it
    ///
    /// # Errors
    ///
    /// Returns an internal error if the state lock is poisoned.
    pub async fn open(backend: Arc<dyn SnapshotStore>) -> AppResult<Self> {
        let store = Self::new(backend);
        store.load().await?;
        Ok(store)
    }

    /// Load the persisted settings
    ///
    /// # Errors
    ///
    /// Returns an internal error if the state lock is poisoned.
    pub async fn load(&self) -> AppResult<LoadOutcome> {
        self.state.load().await
    }

    /// True once loaded
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Current settings
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub fn settings(&self) -> AppResult<Settings> {
        self.state.snapshot()
    }

    /// Current system prompt
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub fn system_prompt(&self) -> AppResult<String> {
        self.state.read(|settings| settings.system_prompt.clone())
    }

    /// Replace the system prompt
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a blank prompt, or `RESOURCE_UNAVAILABLE`
    /// while loading.
    pub async fn set_system_prompt(&self, prompt: &str) -> AppResult<Settings> {
        if prompt.trim().is_empty() {
            return Err(AppError::invalid_input("System prompt must not be empty"));
        }
        let prompt = prompt.to_owned();
        let settings = self
            .state
            .update(|settings| {
                settings.system_prompt = prompt;
                settings.clone()
            })
            .await?;
        AppLogger::log_store_mutation("settings", "set_system_prompt", "systemPrompt");
        Ok(settings)
    }

    /// Restore the default system prompt
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub async fn reset_system_prompt(&self) -> AppResult<Settings> {
        let settings = self
            .state
            .update(|settings| {
                defaults::DEFAULT_SYSTEM_PROMPT.clone_into(&mut settings.system_prompt);
                settings.clone()
            })
            .await?;
        AppLogger::log_store_mutation("settings", "reset_system_prompt", "systemPrompt");
        Ok(settings)
    }

    /// Replace the background image
    ///
    /// Accepts an absolute `http(s)` URL or a site-relative path (`/images/x.jpg`).
    ///
    /// # Errors
    ///
    /// Returns `INVALID_FORMAT` for anything else, or `RESOURCE_UNAVAILABLE`
    /// while loading.
    pub async fn set_background_image(&self, image: &str) -> AppResult<Settings> {
        let image = validate_image_location(image)?;
        let settings = self
            .state
            .update(|settings| {
                settings.background_image = image;
                settings.clone()
            })
            .await?;
        AppLogger::log_store_mutation("settings", "set_background_image", "backgroundImage");
        Ok(settings)
    }

    /// Restore the default background image
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub async fn reset_background_image(&self) -> AppResult<Settings> {
        let settings = self
            .state
            .update(|settings| {
                defaults::DEFAULT_BACKGROUND_IMAGE.clone_into(&mut settings.background_image);
                settings.clone()
            })
            .await?;
        AppLogger::log_store_mutation("settings", "reset_background_image", "backgroundImage");
        Ok(settings)
    }

    /// Revert to the default background if `image` is the current one
    ///
    /// Called when an uploaded image is deleted. Returns whether the current
    /// background changed.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub async fn forget_background_image(&self, image: &str) -> AppResult<bool> {
        if self.state.read(|settings| settings.background_image != image)? {
            return Ok(false);
        }
        let reverted = self
            .state
            .update(|settings| {
                if settings.background_image == image {
                    defaults::DEFAULT_BACKGROUND_IMAGE.clone_into(&mut settings.background_image);
                    true
                } else {
                    false
                }
            })
            .await?;
        if reverted {
            AppLogger::log_store_mutation("settings", "forget_background_image", image);
        }
        Ok(reverted)
    }
}

fn validate_image_location(image: &str) -> AppResult<String> {
    let trimmed = image.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("Background image must not be empty"));
    }
    if trimmed.starts_with('/') && !trimmed.starts_with("//") {
        return Ok(trimmed.to_owned());
    }
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(url.to_string())
        }
        _ => Err(AppError::new(
            ErrorCode::InvalidFormat,
            format!("Background image must be an http(s) URL or an absolute path: {trimmed}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySnapshotStore;

    #[test]
    fn test_image_location_validation() {
        assert_eq!(
            validate_image_location("/images/kitchen.jpg").unwrap(),
            "/images/kitchen.jpg"
        );
        assert!(validate_image_location("https://cdn.example.com/bg.png").is_ok());
        assert!(validate_image_location("//evil.example.com/x.png").is_err());
        assert!(validate_image_location("ftp://example.com/x.png").is_err());
        assert!(validate_image_location("kitchen.jpg").is_err());
    }

    #[tokio::test]
    async fn test_forget_only_reverts_current_image() {
        let store = SettingsStore::open(Arc::new(MemorySnapshotStore::new()))
            .await
            .unwrap();
        store
            .set_background_image("https://cdn.example.com/a.png")
            .await
            .unwrap();

        assert!(!store
            .forget_background_image("https://cdn.example.com/b.png")
            .await
            .unwrap());
        assert!(store
            .forget_background_image("https://cdn.example.com/a.png")
            .await
            .unwrap());
        assert!(store.settings().unwrap().has_default_background());
    }

    #[tokio::test]
    async fn test_blank_prompt_is_rejected() {
        let store = SettingsStore::open(Arc::new(MemorySnapshotStore::new()))
            .await
            .unwrap();
        assert!(store.set_system_prompt("  ").await.is_err());
        assert_eq!(
            store.system_prompt().unwrap(),
            defaults::DEFAULT_SYSTEM_PROMPT
        );
    }
}
