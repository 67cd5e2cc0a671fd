// ABOUTME: Recipe inference contract: free-text generation, URL and photo import, meal planning
// ABOUTME: Declares the request/response types and the RecipeInferenceService trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Recipe Inference
//!
//! Four flows turn loosely structured input into recipe-shaped records:
//!
//! | Flow | Input | Output | Empty model output |
//! |------|-------|--------|--------------------|
//! | generate | free text + instruction preamble | [`RecipeDraft`] | `{}` |
//! | import from URL | absolute http(s) URL | [`RecipeDraft`] | `{}` |
//! | import from photo | `data:<mime>;base64,...` | [`RecipeDraft`] | `{}` |
//! | planning | recipe summaries, day count, constraints | [`GeneratedPlanning`] | error |
//!
//! Results are handed back to the caller. Nothing here writes to the
//! planning store; [`materialize`] only builds a proposal the client may
//! apply.

mod llm_service;
mod parsing;
mod prompts;
mod proposal;
mod sources;
mod tracker;

pub use llm_service::LlmRecipeInference;
pub use parsing::{parse_draft, parse_planning, EMPTY_PLANNING_MESSAGE};
pub use proposal::{materialize, PlanningProposal, ProposedAssignment, ProposedEvent, ProposedRecipe};
pub use sources::{extract_page_text, PhotoPayload};
pub use tracker::{InferenceOutcome, InferenceTracker};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;
use crate::models::{MealSlot, MealType, Recipe, RecipeCategory, RecipeDraft};

/// Free-text recipe generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRecipeRequest {
    /// What the user asked for ("a simple chicken pasta")
    pub user_input: String,
    /// Instruction preamble; the persisted settings prompt when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

/// Recipe import from a web page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlImportRequest {
    /// Absolute http(s) address of the recipe page
    pub url: String,
}

/// Recipe import from a photo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoImportRequest {
    /// `data:<mime>;base64,<payload>`
    pub photo_data_uri: String,
}

/// What the planner is told about one available recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningRecipeSummary {
    /// Recipe id the model may reference
    pub id: String,
    /// Recipe title
    pub title: String,
    /// Recipe category
    pub category: RecipeCategory,
    /// Short description
    #[serde(default)]
    pub description: String,
}

impl From<&Recipe> for PlanningRecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.clone(),
            title: recipe.title.clone(),
            category: recipe.category,
            description: recipe.description.clone(),
        }
    }
}

/// Meal plan generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningRequest {
    /// Recipes the model may pick from
    #[serde(default)]
    pub recipes: Vec<PlanningRecipeSummary>,
    /// Number of days to plan
    pub duration: u32,
    /// Free-text preferences ("vegetarian", "quick meals")
    #[serde(default)]
    pub constraints: String,
}

/// One meal chosen by the planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMeal {
    /// Id of an existing recipe, when `is_new` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    /// The model invented a recipe
    #[serde(default)]
    pub is_new: bool,
    /// Body of the invented recipe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_recipe_details: Option<RecipeDraft>,
    /// Day number, starting at 1
    pub day: u32,
    /// Slot of the day
    pub meal: MealSlot,
    /// Course of the meal
    pub meal_type: MealType,
}

/// Planner output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlanning {
    /// Name of the event wrapping the plan
    pub event_name: String,
    /// Number of days requested
    #[serde(default)]
    pub duration: u32,
    /// Chosen meals, in model order
    #[serde(default)]
    pub meals: Vec<GeneratedMeal>,
}

/// Contract of the recipe inference backend
#[async_trait]
pub trait RecipeInferenceService: Send + Sync {
    /// Generate a recipe from free text
    async fn generate_recipe(&self, request: &GenerateRecipeRequest) -> AppResult<RecipeDraft>;

    /// Extract a recipe from a web page
    async fn import_recipe_from_url(&self, request: &UrlImportRequest) -> AppResult<RecipeDraft>;

    /// Transcribe a recipe from a photo
    async fn import_recipe_from_photo(
        &self,
        request: &PhotoImportRequest,
    ) -> AppResult<RecipeDraft>;

    /// Build a meal plan over several days
    async fn generate_planning(&self, request: &PlanningRequest) -> AppResult<GeneratedPlanning>;
}
