// ABOUTME: Pure query functions over the recipe collection and the planning
// ABOUTME: Recipe filter, quick search, calendar views, and shopping lists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Filter and Query Layer
//!
//! Stateless functions. Stores hand out read-only views and these functions
//! derive what the routes return. Planned recipe ids that no longer resolve
//! are skipped, never reported as errors.

/// Monday-start weeks, date ranges, day plans, and the week overview
pub mod calendar;
/// Recipe filter and quick search
pub mod filter;
/// Ingredient aggregation
pub mod shopping;

pub use calendar::{
    date_range, day_plan, events_on, meals_in_range, week_days, week_overview, week_recipes,
    week_start, DayOverview, DayPlan, PlannedDish, SlotOverview, WeekOverview,
};
pub use filter::{
    parse_ingredient_list, quick_search, CategoryFilter, RecipeFilter, RecipeFilterQuery,
};
pub use shopping::{IngredientSource, ShoppingItem, ShoppingList};
