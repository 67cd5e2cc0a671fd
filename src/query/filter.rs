// ABOUTME: Recipe filter for the collection browser and the quick-add search
// ABOUTME: All criteria AND together and an absent criterion always passes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};

use crate::constants::limits;
use crate::errors::AppResult;
use crate::models::{Recipe, RecipeCategory};

/// Category criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every category passes
    #[default]
    All,
    /// Only this category passes
    Only(RecipeCategory),
}

impl CategoryFilter {
    /// Parse `all` (or blank) or a category label
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for an unknown label.
    pub fn parse(value: &str) -> AppResult<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Ok(Self::Only(trimmed.parse()?))
    }

    fn matches(self, category: RecipeCategory) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

/// Split a comma-separated ingredient list into trimmed, lowercased names
#[must_use]
pub fn parse_ingredient_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Criteria of the collection browser
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Lowercased substring searched in the title and ingredient names
    pub search: Option<String>,
    /// Category criterion
    pub category: CategoryFilter,
    /// Ceiling on prep + cook time, in minutes
    pub max_total_time: Option<u32>,
    /// Floor on servings
    pub min_servings: Option<u32>,
    /// Every listed name must appear in some ingredient
    pub include_ingredients: Vec<String>,
    /// No listed name may appear in any ingredient
    pub exclude_ingredients: Vec<String>,
}

impl RecipeFilter {
    /// Filter that lets every recipe through
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search text, matched as typed; empty text clears it
    #[must_use]
    pub fn with_search(mut self, text: &str) -> Self {
        let text = text.to_lowercase();
        self.search = (!text.is_empty()).then_some(text);
        self
    }

    /// Set the category criterion
    #[must_use]
    pub const fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    /// Set the total time ceiling
    #[must_use]
    pub const fn with_max_total_time(mut self, minutes: u32) -> Self {
        self.max_total_time = Some(minutes);
        self
    }

    /// Set the servings floor
    #[must_use]
    pub const fn with_min_servings(mut self, servings: u32) -> Self {
        self.min_servings = Some(servings);
        self
    }

    /// Set the inclusion list from comma-separated input
    #[must_use]
    pub fn with_included(mut self, list: &str) -> Self {
        self.include_ingredients = parse_ingredient_list(list);
        self
    }

    /// Set the exclusion list from comma-separated input
    #[must_use]
    pub fn with_excluded(mut self, list: &str) -> Self {
        self.exclude_ingredients = parse_ingredient_list(list);
        self
    }

    /// True when the recipe satisfies every criterion
    #[must_use]
    pub fn matches(&self, recipe: &Recipe) -> bool {
        let ingredient_names: Vec<String> = recipe
            .ingredients
            .iter()
            .map(|ingredient| ingredient.name.to_lowercase())
            .collect();
        let any_ingredient = |needle: &str| ingredient_names.iter().any(|name| name.contains(needle));

        let search_ok = self.search.as_deref().is_none_or(|needle| {
            recipe.title.to_lowercase().contains(needle) || any_ingredient(needle)
        });

        search_ok
            && self.category.matches(recipe.category)
            && self
                .max_total_time
                .is_none_or(|max| recipe.total_time() <= max)
            && self.min_servings.is_none_or(|min| recipe.servings >= min)
            && self
                .include_ingredients
                .iter()
                .all(|wanted| any_ingredient(wanted))
            && !self
                .exclude_ingredients
                .iter()
                .any(|banned| any_ingredient(banned))
    }

    /// Recipes that satisfy every criterion, in input order
    #[must_use]
    pub fn apply<'a>(&self, recipes: &'a [Recipe]) -> Vec<&'a Recipe> {
        recipes.iter().filter(|recipe| self.matches(recipe)).collect()
    }
}

/// Query-string form of [`RecipeFilter`]
///
/// The time, servings and ingredient criteria belong to the advanced panel
/// and only apply when `advanced=true`; the time ceiling then defaults to
/// the slider maximum.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFilterQuery {
    /// Search text
    #[serde(default)]
    pub q: Option<String>,
    /// `all` or a category label
    #[serde(default)]
    pub category: Option<String>,
    /// Whether the advanced criteria apply
    #[serde(default)]
    pub advanced: bool,
    /// Ceiling on prep + cook time
    #[serde(default)]
    pub max_total_time: Option<u32>,
    /// Floor on servings
    #[serde(default)]
    pub min_servings: Option<u32>,
    /// Comma-separated ingredients that must appear
    #[serde(default)]
    pub include: Option<String>,
    /// Comma-separated ingredients that must not appear
    #[serde(default)]
    pub exclude: Option<String>,
}

impl RecipeFilterQuery {
    /// Build the filter
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for an unknown category label.
    pub fn into_filter(self) -> AppResult<RecipeFilter> {
        let mut filter = RecipeFilter::new()
            .with_search(self.q.as_deref().unwrap_or_default())
            .with_category(CategoryFilter::parse(
                self.category.as_deref().unwrap_or_default(),
            )?);

        if self.advanced {
            filter = filter.with_max_total_time(
                self.max_total_time
                    .unwrap_or(limits::MAX_TOTAL_TIME_MINUTES)
                    .clamp(limits::MIN_TOTAL_TIME_MINUTES, limits::MAX_TOTAL_TIME_MINUTES),
            );
            if let Some(min) = self.min_servings {
                filter = filter.with_min_servings(min);
            }
            filter = filter
                .with_included(self.include.as_deref().unwrap_or_default())
                .with_excluded(self.exclude.as_deref().unwrap_or_default());
        }
        Ok(filter)
    }
}

/// Quick-add search: case-insensitive substring on title or category label
///
/// Blank input returns every recipe.
#[must_use]
pub fn quick_search<'a>(recipes: &'a [Recipe], query: &str) -> Vec<&'a Recipe> {
    let needle = query.trim().to_lowercase();
    recipes
        .iter()
        .filter(|recipe| {
            needle.is_empty()
                || recipe.title.to_lowercase().contains(&needle)
                || recipe.category.label().to_lowercase().contains(&needle)
        })
        .collect()
}
