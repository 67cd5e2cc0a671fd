// ABOUTME: Recipe collection store with validation and snapshot persistence
// ABOUTME: Creates recipes under UUID ids, replaces and deletes them, resolves id lists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Recipe Collection
//!
//! Recipes are referenced by id from the planning store. Deleting a recipe
//! leaves those references in place; every consumer skips ids that no longer
//! resolve.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::constants::storage;
use crate::errors::AppResult;
use crate::logging::AppLogger;
use crate::models::{Recipe, RecipeBook, RecipeInput};
use crate::storage::{LoadOutcome, PersistedState, SnapshotPayload, SnapshotStore};

impl SnapshotPayload for RecipeBook {
    const KEY: &'static str = storage::RECIPES_KEY;
    const SCHEMA_VERSION: u32 = storage::RECIPES_SCHEMA_VERSION;

    /// Keep the first recipe of any duplicated id
    fn normalize(mut self) -> Self {
        let mut seen = HashSet::new();
        self.recipes.retain(|recipe| seen.insert(recipe.id.clone()));
        self
    }
}

/// Persisted recipe collection
#[derive(Debug)]
pub struct RecipeStore {
    state: PersistedState<RecipeBook>,
}

impl RecipeStore {
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

    /// Load the persisted collection
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

    /// Every recipe in creation order
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub fn list(&self) -> AppResult<Vec<Recipe>> {
        self.state.read(|book| book.recipes.clone())
    }

    /// Find a recipe by id
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub fn get(&self, id: &str) -> AppResult<Option<Recipe>> {
        self.state.read(|book| book.get(id).cloned())
    }

    /// Resolve ids in the given order, skipping unknown ones
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub fn get_many<S: AsRef<str>>(&self, ids: &[S]) -> AppResult<Vec<Recipe>> {
        self.state.read(|book| {
            ids.iter()
                .filter_map(|id| book.get(id.as_ref()).cloned())
                .collect()
        })
    }

    /// Run a read-only query against the collection
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub fn with_book<R>(&self, f: impl FnOnce(&RecipeBook) -> R) -> AppResult<R> {
        self.state.read(f)
    }

    /// Validate and store a new recipe under a fresh id
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid payload, or
    /// `RESOURCE_UNAVAILABLE` while loading.
    pub async fn create(&self, input: RecipeInput) -> AppResult<Recipe> {
        input.validate()?;
        let recipe = input.into_recipe(Uuid::new_v4().to_string());

        let created = self
            .state
            .update(|book| {
                book.recipes.push(recipe.clone());
                recipe
            })
            .await?;

        AppLogger::log_store_mutation("recipes", "create", &created.id);
        Ok(created)
    }

    /// Replace every field of an existing recipe, keeping its id
    ///
    /// Returns `None` when no recipe has that id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid payload, or
    /// `RESOURCE_UNAVAILABLE` while loading.
    pub async fn replace(&self, id: &str, input: RecipeInput) -> AppResult<Option<Recipe>> {
        input.validate()?;
        let replacement = input.into_recipe(id);

        let replaced = self
            .state
            .update(|book| {
                let slot = book.recipes.iter_mut().find(|recipe| recipe.id == id)?;
                *slot = replacement;
                Some(slot.clone())
            })
            .await?;

        if replaced.is_some() {
            AppLogger::log_store_mutation("recipes", "replace", id);
        }
        Ok(replaced)
    }

    /// Delete a recipe, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let removed = self
            .state
            .update(|book| {
                let before = book.recipes.len();
                book.recipes.retain(|recipe| recipe.id != id);
                book.recipes.len() != before
            })
            .await?;

        if removed {
            AppLogger::log_store_mutation("recipes", "delete", id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::models::{Ingredient, RecipeCategory};
    use crate::storage::MemorySnapshotStore;

    fn tarte() -> RecipeInput {
        RecipeInput {
            title: "Tarte aux pommes".to_owned(),
            description: "Classique".to_owned(),
            category: RecipeCategory::Dessert,
            prep_time: 20,
            cook_time: 40,
            servings: 6,
            ingredients: vec![
                Ingredient::new("Pommes", "4"),
                Ingredient::new("Pâte brisée", "1"),
            ],
            steps: vec!["Éplucher".to_owned(), "Cuire".to_owned()],
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_replace_delete() {
        let store = RecipeStore::open(Arc::new(MemorySnapshotStore::new()))
            .await
            .unwrap();

        let created = store.create(tarte()).await.unwrap();
        assert!(Uuid::parse_str(&created.id).is_ok());

        let mut edit = tarte();
        edit.servings = 8;
        let replaced = store.replace(&created.id, edit).await.unwrap().unwrap();
        assert_eq!(replaced.id, created.id);
        assert_eq!(replaced.servings, 8);

        assert!(store.replace("missing", tarte()).await.unwrap().is_none());
        assert!(store.delete(&created.id).await.unwrap());
        assert!(!store.delete(&created.id).await.unwrap());
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_recipe_is_not_stored() {
        let store = RecipeStore::open(Arc::new(MemorySnapshotStore::new()))
            .await
            .unwrap();
        let mut input = tarte();
        input.servings = 0;

        let err = store.create(input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_many_skips_unknown_ids() {
        let store = RecipeStore::open(Arc::new(MemorySnapshotStore::new()))
            .await
            .unwrap();
        let created = store.create(tarte()).await.unwrap();

        let found = store.get_many(&["ghost", created.id.as_str()]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, created.id);
    }
}
