// ABOUTME: Lenient decoding of model output into recipe drafts and meal plans
// ABOUTME: Empty drafts fall back to `{}`, an empty plan is an error, invalid meals are dropped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::warn;

use super::{GeneratedMeal, GeneratedPlanning, PlanningRequest};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Ingredient, MealSlot, MealType, RecipeCategory, RecipeDraft};

/// Error message returned when the planner produced nothing
pub const EMPTY_PLANNING_MESSAGE: &str = "L'IA a retourné un résultat de planning vide.";

/// Event name used when the planner forgot one
const FALLBACK_EVENT_NAME: &str = "Planning";

/// Drop a surrounding markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse model output as JSON; `None` for empty output or a literal `null`
fn parse_output(text: &str) -> AppResult<Option<Map<String, Value>>> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(body).map_err(|e| {
        AppError::new(
            ErrorCode::ExternalServiceError,
            format!("Model returned malformed JSON: {e}"),
        )
    })?;
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        // Some models wrap the single answer in an array
        Value::Array(items) => match items.into_iter().next() {
            Some(Value::Object(map)) => Ok(Some(map)),
            None | Some(Value::Null) => Ok(None),
            Some(_) => Err(unexpected_shape()),
        },
        _ => Err(unexpected_shape()),
    }
}

fn unexpected_shape() -> AppError {
    AppError::new(
        ErrorCode::ExternalServiceError,
        "Model output is not a JSON object",
    )
}

fn lenient_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| {
                        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                        let rounded = f.round() as u64;
                        rounded
                    })
            })
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text
            .split_whitespace()
            .next()
            .and_then(|token| token.parse().ok()),
        _ => None,
    }
}

fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_owned()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn lenient_ingredient(value: &Value) -> Option<Ingredient> {
    let (name, quantity) = match value {
        Value::String(text) => (text.trim().to_owned(), String::new()),
        Value::Object(map) => (
            map.get("name").and_then(lenient_string)?,
            map.get("quantity")
                .and_then(lenient_string)
                .unwrap_or_default(),
        ),
        _ => return None,
    };
    (!name.is_empty()).then(|| Ingredient::new(name, quantity))
}

fn lenient_steps(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(lenient_string)
                .filter(|step| !step.is_empty())
                .collect(),
        ),
        Value::String(text) => Some(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
        ),
        _ => None,
    }
}

/// Build a draft from whatever fields the model got right
fn draft_from_map(map: &Map<String, Value>) -> RecipeDraft {
    RecipeDraft {
        title: map
            .get("title")
            .and_then(lenient_string)
            .filter(|t| !t.is_empty()),
        description: map.get("description").and_then(lenient_string),
        category: map
            .get("category")
            .and_then(Value::as_str)
            .and_then(RecipeCategory::from_label),
        prep_time: map.get("prepTime").and_then(lenient_u32),
        cook_time: map.get("cookTime").and_then(lenient_u32),
        servings: map
            .get("servings")
            .and_then(lenient_u32)
            .filter(|s| *s >= 1),
        ingredients: map.get("ingredients").and_then(|value| {
            value
                .as_array()
                .map(|items| items.iter().filter_map(lenient_ingredient).collect())
        }),
        steps: map.get("steps").and_then(lenient_steps),
    }
}

/// Decode the answer of a recipe-producing flow
///
/// # Errors
///
/// Returns `EXTERNAL_SERVICE_ERROR` when the output is not JSON. Empty or
/// `null` output yields the empty draft.
pub fn parse_draft(text: &str) -> AppResult<RecipeDraft> {
    Ok(parse_output(text)?
        .map(|map| draft_from_map(&map))
        .unwrap_or_default())
}

fn meal_from_value(value: &Value) -> Option<GeneratedMeal> {
    let map = value.as_object()?;
    let meal: MealSlot = serde_json::from_value(map.get("meal")?.clone()).ok()?;
    let meal_type: MealType = serde_json::from_value(map.get("mealType")?.clone()).ok()?;
    let is_new = map.get("isNew").and_then(Value::as_bool).unwrap_or(false);
    Some(GeneratedMeal {
        recipe_id: map
            .get("recipeId")
            .and_then(lenient_string)
            .filter(|id| !id.is_empty()),
        is_new,
        new_recipe_details: map
            .get("newRecipeDetails")
            .and_then(Value::as_object)
            .map(draft_from_map),
        day: map.get("day").and_then(lenient_u32)?,
        meal,
        meal_type,
    })
}

fn meal_is_usable(meal: &GeneratedMeal, duration: u32, known_ids: &HashSet<&str>) -> bool {
    if meal.day < 1 || meal.day > duration {
        return false;
    }
    if meal.is_new {
        meal.new_recipe_details
            .as_ref()
            .is_some_and(|draft| draft.title.is_some())
    } else {
        meal.recipe_id
            .as_deref()
            .is_some_and(|id| known_ids.contains(id))
    }
}

/// Decode the planner answer and drop the meals that cannot be placed
///
/// # Errors
///
/// Returns `EXTERNAL_SERVICE_ERROR` with [`EMPTY_PLANNING_MESSAGE`] when the
/// model produced nothing, or when the output is not JSON.
pub fn parse_planning(text: &str, request: &PlanningRequest) -> AppResult<GeneratedPlanning> {
    let Some(map) = parse_output(text)? else {
        return Err(AppError::new(
            ErrorCode::ExternalServiceError,
            EMPTY_PLANNING_MESSAGE,
        ));
    };

    let known_ids: HashSet<&str> = request.recipes.iter().map(|r| r.id.as_str()).collect();
    let raw_meals = map
        .get("meals")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice);

    let mut meals = Vec::with_capacity(raw_meals.len());
    for raw in raw_meals {
        match meal_from_value(raw) {
            Some(meal) if meal_is_usable(&meal, request.duration, &known_ids) => meals.push(meal),
            _ => warn!(meal = %raw, "Dropping unusable planned meal from model output"),
        }
    }

    let event_name = map
        .get("eventName")
        .and_then(lenient_string)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_EVENT_NAME.to_owned());

    Ok(GeneratedPlanning {
        event_name,
        duration: request.duration,
        meals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::PlanningRecipeSummary;

    fn request() -> PlanningRequest {
        PlanningRequest {
            recipes: vec![PlanningRecipeSummary {
                id: "r1".to_owned(),
                title: "Ratatouille".to_owned(),
                category: RecipeCategory::MainCourse,
                description: String::new(),
            }],
            duration: 2,
            constraints: String::new(),
        }
    }

    #[test]
    fn test_empty_output_is_empty_draft() {
        assert!(parse_draft("").unwrap().is_empty());
        assert!(parse_draft("  null ").unwrap().is_empty());
        assert!(parse_draft("{}").unwrap().is_empty());
    }

    #[test]
    fn test_draft_is_lenient() {
        let draft = parse_draft(
            "```json\n{\"title\":\"Tarte\",\"category\":\"plat principal\",\"prepTime\":\"20 min\",\"servings\":4.0,\"ingredients\":[\"sel\",{\"name\":\"farine\",\"quantity\":200}],\"steps\":\"Mélanger\\nCuire\"}\n```",
        )
        .unwrap();

        assert_eq!(draft.title.as_deref(), Some("Tarte"));
        assert_eq!(draft.category, Some(RecipeCategory::MainCourse));
        assert_eq!(draft.prep_time, Some(20));
        assert_eq!(draft.servings, Some(4));
        let ingredients = draft.ingredients.unwrap();
        assert_eq!(ingredients[1], Ingredient::new("farine", "200"));
        assert_eq!(draft.steps.unwrap(), vec!["Mélanger", "Cuire"]);
    }

    #[test]
    fn test_malformed_draft_is_error() {
        let error = parse_draft("{title").unwrap_err();
        assert_eq!(error.code, ErrorCode::ExternalServiceError);
    }

    #[test]
    fn test_empty_planning_is_error() {
        let error = parse_planning("", &request()).unwrap_err();
        assert_eq!(error.message, EMPTY_PLANNING_MESSAGE);
        assert!(parse_planning("null", &request()).is_err());
    }

    #[test]
    fn test_planning_drops_unusable_meals() {
        let output = r#"{"eventName":"Week-end","meals":[
            {"recipeId":"r1","isNew":false,"day":1,"meal":"Midi","mealType":"Plat Principal"},
            {"recipeId":"ghost","isNew":false,"day":1,"meal":"Soir","mealType":"Plat Principal"},
            {"isNew":true,"newRecipeDetails":{"title":"Soupe"},"day":2,"meal":"Soir","mealType":"Entrée"},
            {"recipeId":"r1","isNew":false,"day":5,"meal":"Midi","mealType":"Dessert"}
        ]}"#;
        let planning = parse_planning(output, &request()).unwrap();

        assert_eq!(planning.event_name, "Week-end");
        assert_eq!(planning.duration, 2);
        assert_eq!(planning.meals.len(), 2);
        assert_eq!(planning.meals[0].meal, MealSlot::Lunch);
        assert!(planning.meals[1].is_new);
    }
}
