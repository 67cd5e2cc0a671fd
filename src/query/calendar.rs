// ABOUTME: Calendar views over the planning: day plans, date ranges, and the Monday-start week
// ABOUTME: Resolves planned recipe ids against the collection, skipping ids that no longer exist
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::limits::DAYS_PER_WEEK;
use crate::models::{
    MealSlot, MealType, PlannedEvent, PlannedMeal, PlanningData, Recipe, RecipeBook,
};

/// Monday of the week containing `date`
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// `days` consecutive days starting at `start`
#[must_use]
pub fn date_range(start: NaiveDate, days: u32) -> Vec<NaiveDate> {
    start.iter_days().take(days as usize).collect()
}

/// The seven days (Monday to Sunday) of the week containing `date`
#[must_use]
pub fn week_days(date: NaiveDate) -> Vec<NaiveDate> {
    date_range(week_start(date), DAYS_PER_WEEK)
}

/// Planned meals of `days` days from `start`, ordered by date then slot
#[must_use]
pub fn meals_in_range(planning: &PlanningData, start: NaiveDate, days: u32) -> Vec<PlannedMeal> {
    let end = start.checked_add_days(Days::new(u64::from(days)));
    let mut meals: Vec<PlannedMeal> = planning
        .meals
        .iter()
        .filter(|meal| meal.date >= start && end.is_none_or(|end| meal.date < end))
        .cloned()
        .collect();
    meals.sort_by_key(|meal| (meal.date, meal.meal));
    meals
}

/// Events covering a day
#[must_use]
pub fn events_on(planning: &PlanningData, date: NaiveDate) -> Vec<PlannedEvent> {
    planning
        .events
        .iter()
        .filter(|event| event.covers(date))
        .cloned()
        .collect()
}

/// Plans and events of one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Calendar day
    pub date: NaiveDate,
    /// Slot records of the day, in slot order
    pub meals: Vec<PlannedMeal>,
    /// Events covering the day
    pub events: Vec<PlannedEvent>,
}

/// Build the plan of one day
#[must_use]
pub fn day_plan(planning: &PlanningData, date: NaiveDate) -> DayPlan {
    DayPlan {
        date,
        meals: meals_in_range(planning, date, 1),
        events: events_on(planning, date),
    }
}

/// A planned recipe resolved against the collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedDish {
    /// Course role in the slot
    pub meal_type: MealType,
    /// Resolved recipe
    pub recipe: Recipe,
}

/// One slot of a day in the week view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOverview {
    /// Slot
    pub meal: MealSlot,
    /// Dishes whose recipe still exists
    pub dishes: Vec<PlannedDish>,
}

/// One day of the week view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOverview {
    /// Calendar day
    pub date: NaiveDate,
    /// Slots that hold at least one stored assignment
    pub slots: Vec<SlotOverview>,
    /// Events covering the day
    pub events: Vec<PlannedEvent>,
}

/// Monday-start week view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekOverview {
    /// Monday of the week
    pub week_start: NaiveDate,
    /// Sunday of the week
    pub week_end: NaiveDate,
    /// Seven days, Monday first
    pub days: Vec<DayOverview>,
    /// Number of (date, slot) pairs holding at least one assignment
    pub filled_slots: usize,
    /// Number of (date, slot) pairs in the week
    pub total_slots: usize,
}

/// Build the week view of the week containing `date`
#[must_use]
pub fn week_overview(planning: &PlanningData, book: &RecipeBook, date: NaiveDate) -> WeekOverview {
    let days = week_days(date);
    let start = week_start(date);
    let meals = meals_in_range(planning, start, DAYS_PER_WEEK);

    let overviews: Vec<DayOverview> = days
        .iter()
        .map(|&day| DayOverview {
            date: day,
            slots: meals
                .iter()
                .filter(|meal| meal.date == day)
                .map(|meal| SlotOverview {
                    meal: meal.meal,
                    dishes: resolve_dishes(meal, book),
                })
                .collect(),
            events: events_on(planning, day),
        })
        .collect();

    WeekOverview {
        week_start: start,
        week_end: days.last().copied().unwrap_or(start),
        days: overviews,
        filled_slots: meals.iter().filter(|meal| !meal.recipes.is_empty()).count(),
        total_slots: DAYS_PER_WEEK as usize * MealSlot::ALL.len(),
    }
}

/// Recipes planned in the week containing `date`, one entry per assignment
#[must_use]
pub fn week_recipes(planning: &PlanningData, book: &RecipeBook, date: NaiveDate) -> Vec<Recipe> {
    meals_in_range(planning, week_start(date), DAYS_PER_WEEK)
        .iter()
        .flat_map(|meal| resolve_dishes(meal, book))
        .map(|dish| dish.recipe)
        .collect()
}

fn resolve_dishes(meal: &PlannedMeal, book: &RecipeBook) -> Vec<PlannedDish> {
    meal.recipes
        .iter()
        .filter_map(|planned| {
            book.get(&planned.recipe_id).map(|recipe| PlannedDish {
                meal_type: planned.meal_type,
                recipe: recipe.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_day, PlannedRecipe, RecipeCategory};

    fn day(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    fn recipe(id: &str) -> Recipe {
        Recipe {
            id: id.to_owned(),
            title: format!("Recette {id}"),
            description: String::new(),
            category: RecipeCategory::MainCourse,
            prep_time: 10,
            cook_time: 20,
            servings: 2,
            ingredients: vec![],
            steps: vec![],
            image_url: None,
        }
    }

    #[test]
    fn test_week_starts_on_monday() {
        // 2024-06-13 is a Thursday
        assert_eq!(week_start(day("2024-06-13")), day("2024-06-10"));
        assert_eq!(week_start(day("2024-06-10")), day("2024-06-10"));
        assert_eq!(week_start(day("2024-06-16")), day("2024-06-10"));

        let days = week_days(day("2024-06-13"));
        assert_eq!(days.len(), 7);
        assert_eq!(days[6], day("2024-06-16"));
    }

    #[test]
    fn test_week_overview_skips_deleted_recipes() {
        let planning = PlanningData {
            meals: vec![
                PlannedMeal {
                    date: day("2024-06-11"),
                    meal: MealSlot::Dinner,
                    recipes: vec![
                        PlannedRecipe::new("R1", MealType::MainCourse),
                        PlannedRecipe::new("deleted", MealType::Dessert),
                    ],
                },
                PlannedMeal {
                    date: day("2024-06-17"),
                    meal: MealSlot::Lunch,
                    recipes: vec![PlannedRecipe::new("R1", MealType::MainCourse)],
                },
            ],
            events: vec![PlannedEvent {
                id: "event-1".to_owned(),
                name: "Vacances".to_owned(),
                start_date: day("2024-06-15"),
                duration: 3,
            }],
        };
        let book = RecipeBook {
            recipes: vec![recipe("R1")],
        };

        let week = week_overview(&planning, &book, day("2024-06-12"));
        assert_eq!(week.week_start, day("2024-06-10"));
        assert_eq!(week.week_end, day("2024-06-16"));
        assert_eq!(week.filled_slots, 1);
        assert_eq!(week.total_slots, 21);

        let tuesday = &week.days[1];
        assert_eq!(tuesday.slots.len(), 1);
        assert_eq!(tuesday.slots[0].dishes.len(), 1);
        assert_eq!(week.days[5].events.len(), 1);
        assert_eq!(week.days[6].events.len(), 1);
        assert!(week.days[4].events.is_empty());

        assert_eq!(week_recipes(&planning, &book, day("2024-06-12")).len(), 1);
    }

    #[test]
    fn test_meals_in_range_is_half_open() {
        let planning = PlanningData {
            meals: vec![PlannedMeal {
                date: day("2024-06-12"),
                meal: MealSlot::Lunch,
                recipes: vec![PlannedRecipe::new("R1", MealType::MainCourse)],
            }],
            events: vec![],
        };
        assert_eq!(meals_in_range(&planning, day("2024-06-10"), 3).len(), 1);
        assert!(meals_in_range(&planning, day("2024-06-10"), 2).is_empty());
        assert_eq!(day_plan(&planning, day("2024-06-12")).meals.len(), 1);
    }
}
