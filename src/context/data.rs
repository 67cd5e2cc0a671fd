// ABOUTME: Data context for dependency injection of the persisted stores
// ABOUTME: Groups the planning, recipe, and settings stores behind shared handles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use tracing::info;

use crate::errors::AppResult;
use crate::planning::PlanningStore;
use crate::recipes::RecipeStore;
use crate::settings::SettingsStore;
use crate::storage::SnapshotStore;

/// Data context containing the persisted stores
///
/// # Dependencies
/// - `planning`: planned meals and events
/// - `recipes`: the recipe collection referenced by the planning
/// - `settings`: the system prompt and background image
#[derive(Clone)]
pub struct DataContext {
    planning: Arc<PlanningStore>,
    recipes: Arc<RecipeStore>,
    settings: Arc<SettingsStore>,
}

impl DataContext {
    /// Create new data context
    #[must_use]
    pub const fn new(
        planning: Arc<PlanningStore>,
        recipes: Arc<RecipeStore>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            planning,
            recipes,
            settings,
        }
    }

    /// Create every store over one backend, still in the Loading phase
    #[must_use]
    pub fn unloaded(backend: &Arc<dyn SnapshotStore>) -> Self {
        Self::new(
            Arc::new(PlanningStore::new(Arc::clone(backend))),
            Arc::new(RecipeStore::new(Arc::clone(backend))),
            Arc::new(SettingsStore::new(Arc::clone(backend))),
        )
    }

    /// Load every store from `backend`
    ///
    /// # Errors
    ///
    /// Returns an internal error if a store lock is poisoned.
    pub async fn open(backend: &Arc<dyn SnapshotStore>) -> AppResult<Self> {
        let context = Self::unloaded(backend);
        context.load().await?;
        Ok(context)
    }

    /// Load every store; stores already loaded are left untouched
    ///
    /// # Errors
    ///
    /// Returns an internal error if a store lock is poisoned.
    pub async fn load(&self) -> AppResult<()> {
        let (planning, recipes, settings) = tokio::try_join!(
            self.planning.load(),
            self.recipes.load(),
            self.settings.load()
        )?;
        info!(
            planning = ?planning,
            recipes = ?recipes,
            settings = ?settings,
            "Stores loaded"
        );
        Ok(())
    }

    /// True once every store is Ready
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.planning.is_ready() && self.recipes.is_ready() && self.settings.is_ready()
    }

    /// Get the planning store
    #[must_use]
    pub const fn planning(&self) -> &Arc<PlanningStore> {
        &self.planning
    }

    /// Get the recipe store
    #[must_use]
    pub const fn recipes(&self) -> &Arc<RecipeStore> {
        &self.recipes
    }

    /// Get the settings store
    #[must_use]
    pub const fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }
}
