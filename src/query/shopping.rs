// ABOUTME: Shopping list aggregation over a set of recipes
// ABOUTME: Groups ingredient lines by normalized name and keeps each source quantity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Recipe;

/// One ingredient line contributed by a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientSource {
    /// Contributing recipe
    pub recipe_id: String,
    /// Title of the contributing recipe
    pub recipe_title: String,
    /// Quantity as written in the recipe
    pub quantity: String,
}

/// All lines of one ingredient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    /// Name as first written
    pub name: String,
    /// Every contributing line
    pub sources: Vec<IngredientSource>,
}

/// Ingredients grouped by name, sorted by normalized name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    /// Grouped ingredients
    pub items: Vec<ShoppingItem>,
    /// Number of recipe occurrences aggregated
    pub recipe_count: usize,
}

impl ShoppingList {
    /// Aggregate the ingredients of `recipes`
    ///
    /// A recipe given twice contributes its lines twice.
    #[must_use]
    pub fn from_recipes<'a>(recipes: impl IntoIterator<Item = &'a Recipe>) -> Self {
        let mut grouped: BTreeMap<String, ShoppingItem> = BTreeMap::new();
        let mut recipe_count = 0;

        for recipe in recipes {
            recipe_count += 1;
            for ingredient in &recipe.ingredients {
                let key = normalize_name(&ingredient.name);
                if key.is_empty() {
                    continue;
                }
                grouped
                    .entry(key)
                    .or_insert_with(|| ShoppingItem {
                        name: ingredient.name.trim().to_owned(),
                        sources: Vec::new(),
                    })
                    .sources
                    .push(IngredientSource {
                        recipe_id: recipe.id.clone(),
                        recipe_title: recipe.title.clone(),
                        quantity: ingredient.quantity.trim().to_owned(),
                    });
            }
        }

        Self {
            items: grouped.into_values().collect(),
            recipe_count,
        }
    }

    /// True when no ingredient was collected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
