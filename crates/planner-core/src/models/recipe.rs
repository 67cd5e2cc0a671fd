// ABOUTME: Recipe domain model with categories, ingredients, validation, and drafts
// ABOUTME: RecipeDraft is the all-optional shape produced by LLM generation and import
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult, ErrorCode};

/// Course category of a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipeCategory {
    /// Starter
    #[serde(rename = "Entrée")]
    Entree,
    /// Main course
    #[serde(rename = "Plat Principal")]
    MainCourse,
    /// Dessert
    #[serde(rename = "Dessert")]
    Dessert,
    /// Drink
    #[serde(rename = "Boisson")]
    Drink,
    /// Pre-dinner snack or drink
    #[serde(rename = "Apéritif")]
    Aperitif,
    /// Anything else
    #[serde(rename = "Autre")]
    Other,
}

impl RecipeCategory {
    /// Every category in display order
    pub const ALL: [Self; 6] = [
        Self::Entree,
        Self::MainCourse,
        Self::Dessert,
        Self::Drink,
        Self::Aperitif,
        Self::Other,
    ];

    /// Label used on the wire and in prompts
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Entree => "Entrée",
            Self::MainCourse => "Plat Principal",
            Self::Dessert => "Dessert",
            Self::Drink => "Boisson",
            Self::Aperitif => "Apéritif",
            Self::Other => "Autre",
        }
    }

    /// Parse a label leniently: case-insensitive, with or without accents
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = fold_accents(label.trim());
        Self::ALL
            .into_iter()
            .find(|category| fold_accents(category.label()) == wanted)
    }
}

impl fmt::Display for RecipeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecipeCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
            .ok_or_else(|| AppError::invalid_input(format!("Unknown recipe category: {s}")))
    }
}

fn fold_accents(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' | 'É' | 'È' | 'Ê' => 'e',
            'à' | 'â' | 'À' | 'Â' => 'a',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name ("farine")
    pub name: String,
    /// Free-text quantity ("200 g")
    #[serde(default)]
    pub quantity: String,
}

impl Ingredient {
    /// Create an ingredient line
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
        }
    }
}

/// A recipe of the collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Unique, immutable identifier
    pub id: String,
    /// Dish name
    pub title: String,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// Course category
    pub category: RecipeCategory,
    /// Preparation time in minutes
    #[serde(default)]
    pub prep_time: u32,
    /// Cooking time in minutes
    #[serde(default)]
    pub cook_time: u32,
    /// Number of servings
    pub servings: u32,
    /// Ordered ingredient lines
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Ordered preparation steps
    #[serde(default)]
    pub steps: Vec<String>,
    /// Optional illustration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Recipe {
    /// Preparation plus cooking time in minutes
    #[must_use]
    pub const fn total_time(&self) -> u32 {
        self.prep_time.saturating_add(self.cook_time)
    }
}

/// Payload used to create or replace a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    /// Dish name
    pub title: String,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// Course category
    pub category: RecipeCategory,
    /// Preparation time in minutes
    #[serde(default)]
    pub prep_time: u32,
    /// Cooking time in minutes
    #[serde(default)]
    pub cook_time: u32,
    /// Number of servings
    pub servings: u32,
    /// Ordered ingredient lines
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Ordered preparation steps
    #[serde(default)]
    pub steps: Vec<String>,
    /// Optional illustration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl RecipeInput {
    /// Validate the payload
    ///
    /// # Errors
    ///
    /// Returns `MISSING_REQUIRED_FIELD` for a blank title, `VALUE_OUT_OF_RANGE`
    /// for zero servings and `INVALID_INPUT` for a blank ingredient name.
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::new(
                ErrorCode::MissingRequiredField,
                "Recipe title must not be empty",
            ));
        }
        if self.servings == 0 {
            return Err(AppError::new(
                ErrorCode::ValueOutOfRange,
                "Recipe servings must be at least 1",
            ));
        }
        if let Some(position) = self
            .ingredients
            .iter()
            .position(|ingredient| ingredient.name.trim().is_empty())
        {
            return Err(AppError::invalid_input(format!(
                "Ingredient #{} has an empty name",
                position + 1
            )));
        }
        Ok(())
    }

    /// Build the stored recipe under the given id
    #[must_use]
    pub fn into_recipe(self, id: impl Into<String>) -> Recipe {
        Recipe {
            id: id.into(),
            title: self.title.trim().to_owned(),
            description: self.description,
            category: self.category,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            servings: self.servings,
            ingredients: self.ingredients,
            steps: self.steps,
            image_url: self.image_url,
        }
    }
}

/// Partial recipe produced by generation or import
///
/// Every field is optional: the model may only recover part of a recipe.
/// The empty draft serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    /// Dish name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Course category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<RecipeCategory>,
    /// Preparation time in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
    /// Cooking time in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<u32>,
    /// Number of servings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    /// Ordered ingredient lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<Ingredient>>,
    /// Ordered preparation steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
}

impl RecipeDraft {
    /// True when no field was recovered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl From<&Recipe> for RecipeDraft {
    fn from(recipe: &Recipe) -> Self {
        Self {
            title: Some(recipe.title.clone()),
            description: Some(recipe.description.clone()),
            category: Some(recipe.category),
            prep_time: Some(recipe.prep_time),
            cook_time: Some(recipe.cook_time),
            servings: Some(recipe.servings),
            ingredients: Some(recipe.ingredients.clone()),
            steps: Some(recipe.steps.clone()),
        }
    }
}

/// Persisted recipe collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeBook {
    /// Recipes in creation order
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

impl RecipeBook {
    /// Find a recipe by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }
}
