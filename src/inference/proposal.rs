// ABOUTME: Turns a generated meal plan into dated slot assignments for the client to review
// ABOUTME: Proposals reference existing recipes or carry new drafts and are never applied here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::GeneratedPlanning;
use crate::models::{MealSlot, MealType, RecipeDraft};

/// Event that would wrap the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedEvent {
    /// Event name chosen by the planner
    pub name: String,
    /// First day of the plan
    pub start_date: NaiveDate,
    /// Number of days covered
    pub duration: u32,
}

/// Recipe of a proposed assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProposedRecipe {
    /// A recipe already in the collection
    #[serde(rename_all = "camelCase")]
    Existing {
        /// Id of the referenced recipe
        recipe_id: String,
    },
    /// A recipe the client has to create first
    New {
        /// Recipe body suggested by the planner
        draft: RecipeDraft,
    },
}

/// One dish placed on a day and slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedAssignment {
    /// Calendar day
    pub date: NaiveDate,
    /// Slot of the day
    pub meal: MealSlot,
    /// Course of the dish
    pub meal_type: MealType,
    /// Dish to place
    pub recipe: ProposedRecipe,
}

/// Generated plan laid out on the calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningProposal {
    /// Event covering the plan
    pub event: ProposedEvent,
    /// Assignments ordered by date then slot
    pub assignments: Vec<ProposedAssignment>,
}

/// Lay a generated plan out from `start_date`, day 1 being `start_date`
#[must_use]
pub fn materialize(planning: &GeneratedPlanning, start_date: NaiveDate) -> PlanningProposal {
    let mut assignments: Vec<ProposedAssignment> = planning
        .meals
        .iter()
        .filter_map(|meal| {
            let date = start_date.checked_add_days(Days::new(u64::from(meal.day.checked_sub(1)?)))?;
            let recipe = if meal.is_new {
                ProposedRecipe::New {
                    draft: meal.new_recipe_details.clone()?,
                }
            } else {
                ProposedRecipe::Existing {
                    recipe_id: meal.recipe_id.clone()?,
                }
            };
            Some(ProposedAssignment {
                date,
                meal: meal.meal,
                meal_type: meal.meal_type,
                recipe,
            })
        })
        .collect();
    assignments.sort_by_key(|a| (a.date, a.meal));

    let last_day = planning.meals.iter().map(|m| m.day).max().unwrap_or(1);
    PlanningProposal {
        event: ProposedEvent {
            name: planning.event_name.clone(),
            start_date,
            duration: planning.duration.max(last_day).max(1),
        },
        assignments,
    }
}
