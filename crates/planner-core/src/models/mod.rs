// ABOUTME: Domain models for recipes, meal planning, events, and user settings
// ABOUTME: Serde shapes match the persisted JSON snapshots and the HTTP API (camelCase)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Domain models
//!
//! Recipes are owned by the recipe collection. Planned meals and planned
//! events are owned by the planning store and reference recipes by id only.

/// Planned meals, meal slots, planned events, and calendar-day helpers
pub mod planning;
/// Recipes, ingredients, categories, and partial recipe drafts
pub mod recipe;
/// User preferences record
pub mod settings;

pub use planning::{
    day_key, parse_day, EventUpdate, MealSlot, MealType, PlannedEvent, PlannedMeal, PlannedRecipe,
    PlanningData,
};
pub use recipe::{Ingredient, Recipe, RecipeBook, RecipeCategory, RecipeDraft, RecipeInput};
pub use settings::Settings;
