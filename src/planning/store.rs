// ABOUTME: Planning store holding planned meals and events with snapshot persistence
// ABOUTME: Idempotent slot assignment, empty-slot pruning, and date-range event lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use super::event_ids::EventIdGenerator;
use crate::constants::{limits, storage};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use crate::models::{
    day_key, EventUpdate, MealSlot, MealType, PlannedEvent, PlannedMeal, PlannedRecipe,
    PlanningData,
};
use crate::storage::{LoadOutcome, PersistedState, SnapshotPayload, SnapshotStore};

impl SnapshotPayload for PlanningData {
    const KEY: &'static str = storage::PLANNING_KEY;
    const SCHEMA_VERSION: u32 = storage::PLANNING_SCHEMA_VERSION;

    /// Merge duplicate (date, slot) records, drop repeated pairs and empty
    /// records, and clamp zero-day events to one day
    fn normalize(self) -> Self {
        let mut meals: Vec<PlannedMeal> = Vec::with_capacity(self.meals.len());
        for meal in self.meals {
            let target = match meals.iter().position(|m| m.is_at(meal.date, meal.meal)) {
                Some(index) => index,
                None => {
                    meals.push(PlannedMeal {
                        date: meal.date,
                        meal: meal.meal,
                        recipes: Vec::new(),
                    });
                    meals.len() - 1
                }
            };
            for recipe in meal.recipes {
                if !meals[target].recipes.contains(&recipe) {
                    meals[target].recipes.push(recipe);
                }
            }
        }
        meals.retain(|meal| !meal.recipes.is_empty());

        let events = self
            .events
            .into_iter()
            .map(|mut event| {
                event.duration = event.duration.max(1);
                event
            })
            .collect();

        Self { meals, events }
    }
}

/// Authoritative in-memory planning state
///
/// Every mutation runs to completion under the state lock and is then
/// persisted as a full snapshot. Recipe ids are weak references and are
/// never checked against the recipe collection.
#[derive(Debug)]
pub struct PlanningStore {
    state: PersistedState<PlanningData>,
    event_ids: EventIdGenerator,
}

impl PlanningStore {
    /// Create a store in the Loading phase
    #[must_use]
    pub fn new(backend: Arc<dyn SnapshotStore>) -> Self {
        Self {
            state: PersistedState::new(backend),
            event_ids: EventIdGenerator::new(),
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

    /// Load the persisted planning and enter the Ready phase
    ///
    /// # Errors
    ///
    /// Returns an internal error if the state lock is poisoned.
    pub async fn load(&self) -> AppResult<LoadOutcome> {
        let outcome = self.state.load().await?;
        let newest = self.state.read(|data| {
            data.events
                .iter()
                .filter_map(|event| EventIdGenerator::parse_millis(&event.id))
                .max()
        })?;
        if let Some(millis) = newest {
            self.event_ids.observe(millis);
        }
        Ok(outcome)
    }

    /// True once loaded
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Assign a recipe to a (date, slot) pair
    ///
    /// Creates the slot record when missing. Adding a pair that is already
    /// present changes nothing. Returns the resulting slot record.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading, `INVALID_INPUT` for a
    /// blank recipe id.
    pub async fn add_recipe_to_plan(
        &self,
        date: NaiveDate,
        slot: MealSlot,
        recipe_id: &str,
        meal_type: MealType,
    ) -> AppResult<PlannedMeal> {
        let recipe_id = recipe_id.trim();
        if recipe_id.is_empty() {
            return Err(AppError::invalid_input("recipeId must not be empty"));
        }
        let entry = PlannedRecipe::new(recipe_id, meal_type);

        let meal = self
            .state
            .update(|data| {
                if let Some(meal) = data.meals.iter_mut().find(|m| m.is_at(date, slot)) {
                    if !meal.recipes.contains(&entry) {
                        meal.recipes.push(entry);
                    }
                    meal.clone()
                } else {
                    let meal = PlannedMeal {
                        date,
                        meal: slot,
                        recipes: vec![entry],
                    };
                    data.meals.push(meal.clone());
                    meal
                }
            })
            .await?;

        AppLogger::log_store_mutation(
            "planning",
            "add_recipe",
            &format!("{}/{}", day_key(date), slot.as_str()),
        );
        Ok(meal)
    }

    /// Remove a recipe from a (date, slot) pair, pruning the slot if empty
    ///
    /// Returns whether a pair was removed.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub async fn remove_recipe_from_plan(
        &self,
        date: NaiveDate,
        slot: MealSlot,
        recipe_id: &str,
        meal_type: MealType,
    ) -> AppResult<bool> {
        let recipe_id = recipe_id.trim();
        let removed = self
            .state
            .update(|data| {
                let Some(index) = data.meals.iter().position(|m| m.is_at(date, slot)) else {
                    return false;
                };
                let meal = &mut data.meals[index];
                let before = meal.recipes.len();
                meal.recipes
                    .retain(|r| !(r.recipe_id == recipe_id && r.meal_type == meal_type));
                let removed = meal.recipes.len() != before;
                if meal.recipes.is_empty() {
                    data.meals.remove(index);
                }
                removed
            })
            .await?;

        if removed {
            AppLogger::log_store_mutation(
                "planning",
                "remove_recipe",
                &format!("{}/{}", day_key(date), slot.as_str()),
            );
        }
        Ok(removed)
    }

    /// Every slot record of a day, in slot order
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub fn get_plan_for_date(&self, date: NaiveDate) -> AppResult<Vec<PlannedMeal>> {
        self.state.read(|data| {
            let mut meals: Vec<PlannedMeal> = data
                .meals
                .iter()
                .filter(|meal| meal.date == date)
                .cloned()
                .collect();
            meals.sort_by_key(|meal| meal.meal);
            meals
        })
    }

    /// Add a single-day event
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_event`].
    pub async fn add_event_to_plan(&self, date: NaiveDate, name: &str) -> AppResult<PlannedEvent> {
        self.add_event(name, date, 1).await
    }

    /// Add an event covering `duration` days from `start_date`
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading, `MISSING_REQUIRED_FIELD`
    /// for a blank name and `VALUE_OUT_OF_RANGE` for a duration outside
    /// `1..=366`.
    pub async fn add_event(
        &self,
        name: &str,
        start_date: NaiveDate,
        duration: u32,
    ) -> AppResult<PlannedEvent> {
        let name = validate_event_name(name)?;
        validate_event_duration(duration)?;

        let event = self
            .state
            .update(|data| {
                let mut id = self.event_ids.next_id();
                while data.events.iter().any(|event| event.id == id) {
                    id = self.event_ids.next_id();
                }
                let event = PlannedEvent {
                    id,
                    name,
                    start_date,
                    duration,
                };
                data.events.push(event.clone());
                event
            })
            .await?;

        AppLogger::log_store_mutation("planning", "add_event", &event.id);
        Ok(event)
    }

    /// Remove an event by id
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub async fn remove_event_from_plan(&self, event_id: &str) -> AppResult<bool> {
        self.remove_event(event_id).await
    }

    /// Remove an event by id, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub async fn remove_event(&self, event_id: &str) -> AppResult<bool> {
        let removed = self
            .state
            .update(|data| {
                let before = data.events.len();
                data.events.retain(|event| event.id != event_id);
                data.events.len() != before
            })
            .await?;

        if removed {
            AppLogger::log_store_mutation("planning", "remove_event", event_id);
        } else {
            debug!(event_id, "Event to remove was not found");
        }
        Ok(removed)
    }

    /// Replace the provided fields of an event
    ///
    /// Returns the updated event, or `None` when no event has that id.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading, or a validation error
    /// for a blank name or an out-of-range duration.
    pub async fn update_event(&self, update: EventUpdate) -> AppResult<Option<PlannedEvent>> {
        let name = update.name.as_deref().map(validate_event_name).transpose()?;
        if let Some(duration) = update.duration {
            validate_event_duration(duration)?;
        }

        let updated = self
            .state
            .update(|data| {
                let event = data.events.iter_mut().find(|event| event.id == update.id)?;
                if let Some(name) = name {
                    event.name = name;
                }
                if let Some(start_date) = update.start_date {
                    event.start_date = start_date;
                }
                if let Some(duration) = update.duration {
                    event.duration = duration;
                }
                Some(event.clone())
            })
            .await?;

        match &updated {
            Some(event) => AppLogger::log_store_mutation("planning", "update_event", &event.id),
            None => debug!(event_id = %update.id, "Event to update was not found"),
        }
        Ok(updated)
    }

    /// Events covering a day
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub fn get_events_for_date(&self, date: NaiveDate) -> AppResult<Vec<PlannedEvent>> {
        self.state.read(|data| {
            data.events
                .iter()
                .filter(|event| event.covers(date))
                .cloned()
                .collect()
        })
    }

    /// Every planned meal
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub fn planned_meals(&self) -> AppResult<Vec<PlannedMeal>> {
        self.state.read(|data| data.meals.clone())
    }

    /// Every planned event
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub fn planned_events(&self) -> AppResult<Vec<PlannedEvent>> {
        self.state.read(|data| data.events.clone())
    }

    /// Full planning payload
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub fn data(&self) -> AppResult<PlanningData> {
        self.state.snapshot()
    }

    /// Run a read-only query against the planning payload
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub fn with_data<R>(&self, f: impl FnOnce(&PlanningData) -> R) -> AppResult<R> {
        self.state.read(f)
    }
}

fn validate_event_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::new(
            ErrorCode::MissingRequiredField,
            "Event name must not be empty",
        ));
    }
    Ok(trimmed.to_owned())
}

fn validate_event_duration(duration: u32) -> AppResult<()> {
    if duration == 0 || duration > limits::MAX_EVENT_DAYS {
        return Err(AppError::new(
            ErrorCode::ValueOutOfRange,
            format!(
                "Event duration must be between 1 and {} days",
                limits::MAX_EVENT_DAYS
            ),
        ));
    }
    Ok(())
}
