// ABOUTME: Planning domain model: meal slots, planned meals, planned events, calendar days
// ABOUTME: Accepts the legacy slot names and single-day event shape on input
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{DateTime, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult, ErrorCode};

/// Format of a calendar-day key
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Normalize a date input to its calendar day
///
/// Accepts a bare `yyyy-MM-dd` date or an RFC 3339 timestamp, in which case
/// the date part as written (in its own offset) is kept.
///
/// # Errors
///
/// Returns `INVALID_FORMAT` when the input is neither.
pub fn parse_day(input: &str) -> AppResult<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DAY_KEY_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
        .map_err(|_| {
            AppError::new(
                ErrorCode::InvalidFormat,
                format!("Invalid date '{trimmed}', expected yyyy-MM-dd"),
            )
        })
}

/// Canonical string key of a calendar day
#[must_use]
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Named period of a day that can hold recipes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    /// Morning meal
    #[serde(alias = "petit-dejeuner")]
    Breakfast,
    /// Midday meal
    #[serde(alias = "Midi", alias = "midi", alias = "dejeuner")]
    Lunch,
    /// Evening meal
    #[serde(alias = "Soir", alias = "soir", alias = "diner")]
    Dinner,
}

impl MealSlot {
    /// Every slot in day order
    pub const ALL: [Self; 3] = [Self::Breakfast, Self::Lunch, Self::Dinner];

    /// Canonical wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }
}

/// Course role of a dish within a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealType {
    /// Starter
    #[serde(rename = "Entrée", alias = "Entree")]
    Entree,
    /// Main course
    #[serde(rename = "Plat Principal")]
    MainCourse,
    /// Dessert
    #[serde(rename = "Dessert")]
    Dessert,
}

impl MealType {
    /// Label used on the wire and in prompts
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Entree => "Entrée",
            Self::MainCourse => "Plat Principal",
            Self::Dessert => "Dessert",
        }
    }
}

/// One recipe assignment inside a slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedRecipe {
    /// Weak reference to a recipe of the collection
    pub recipe_id: String,
    /// Course role of the recipe in this slot
    pub meal_type: MealType,
}

impl PlannedRecipe {
    /// Create an assignment
    #[must_use]
    pub fn new(recipe_id: impl Into<String>, meal_type: MealType) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            meal_type,
        }
    }
}

/// Recipes assigned to one (date, slot) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMeal {
    /// Calendar day
    pub date: NaiveDate,
    /// Slot of the day
    pub meal: MealSlot,
    /// Ordered, never empty once stored
    pub recipes: Vec<PlannedRecipe>,
}

impl PlannedMeal {
    /// True when this record addresses the given day and slot
    #[must_use]
    pub fn is_at(&self, date: NaiveDate, slot: MealSlot) -> bool {
        self.date == date && self.meal == slot
    }
}

const fn default_event_duration() -> u32 {
    1
}

/// Named occasion overlaid on one or more calendar days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedEvent {
    /// Time-based identifier (`event-<millis>`)
    pub id: String,
    /// Display name
    pub name: String,
    /// First day of the event
    #[serde(alias = "date")]
    pub start_date: NaiveDate,
    /// Number of days covered, at least 1
    #[serde(default = "default_event_duration")]
    pub duration: u32,
}

impl PlannedEvent {
    /// First day after the event
    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(u64::from(self.duration)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// True when `start_date <= date < start_date + duration`
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date < self.end_date()
    }
}

/// Field replacement for an existing event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    /// Identifier of the event to update
    pub id: String,
    /// New display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New first day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// New length in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

/// Persisted planning payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningData {
    /// Planned meals, at most one per (date, slot)
    #[serde(default)]
    pub meals: Vec<PlannedMeal>,
    /// Planned events
    #[serde(default)]
    pub events: Vec<PlannedEvent>,
}
