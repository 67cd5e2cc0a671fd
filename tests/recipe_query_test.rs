// ABOUTME: Integration tests for the recipe filter, quick search, week view, and shopping list
// ABOUTME: Checks filter monotonicity and that dangling recipe references are skipped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use recipe_planner::models::{Ingredient, MealSlot, MealType, Recipe, RecipeCategory};
use recipe_planner::query::{
    quick_search, week_overview, week_recipes, CategoryFilter, RecipeFilter, RecipeFilterQuery,
    ShoppingList,
};

use common::{day, loaded_data, recipe_input};

fn recipe(
    id: &str,
    title: &str,
    category: RecipeCategory,
    minutes: (u32, u32),
    servings: u32,
    ingredients: &[&str],
) -> Recipe {
    Recipe {
        id: id.to_owned(),
        title: title.to_owned(),
        description: String::new(),
        category,
        prep_time: minutes.0,
        cook_time: minutes.1,
        servings,
        ingredients: ingredients
            .iter()
            .map(|name| Ingredient::new(*name, "1"))
            .collect(),
        steps: vec![],
        image_url: None,
    }
}

fn collection() -> Vec<Recipe> {
    vec![
        recipe("1", "Ratatouille", RecipeCategory::MainCourse, (20, 60), 4, &["Courgette", "Aubergine", "Tomate"]),
        recipe("2", "Salade niçoise", RecipeCategory::Entree, (15, 0), 2, &["Thon", "Tomate", "Oeuf"]),
        recipe("3", "Tarte Tatin", RecipeCategory::Dessert, (30, 45), 6, &["Pommes", "Beurre", "Sucre"]),
        recipe("4", "Mojito", RecipeCategory::Drink, (5, 0), 1, &["Menthe", "Citron vert"]),
        recipe("5", "Gratin dauphinois", RecipeCategory::MainCourse, (20, 90), 6, &["Pommes de terre", "Crème", "Ail"]),
        recipe("6", "Pissaladière", RecipeCategory::Aperitif, (30, 30), 8, &["Oignons", "Anchois", "Olives"]),
    ]
}

fn ids(matches: &[&Recipe]) -> Vec<String> {
    matches.iter().map(|recipe| recipe.id.clone()).collect()
}

#[test]
fn test_open_filter_returns_everything() {
    let recipes = collection();
    assert_eq!(RecipeFilter::new().apply(&recipes).len(), recipes.len());
}

#[test]
fn test_search_matches_title_or_ingredient() {
    let recipes = collection();

    let by_title = RecipeFilter::new().with_search("tarte").apply(&recipes);
    assert_eq!(ids(&by_title), vec!["3"]);

    let by_ingredient = RecipeFilter::new().with_search("TOMATE").apply(&recipes);
    assert_eq!(ids(&by_ingredient), vec!["1", "2"]);
}

#[test]
fn test_criteria_combine_with_and() {
    let recipes = collection();
    let filter = RecipeFilter::new()
        .with_category(CategoryFilter::Only(RecipeCategory::MainCourse))
        .with_max_total_time(100)
        .with_included("tomate")
        .with_excluded("thon, ");

    assert_eq!(ids(&filter.apply(&recipes)), vec!["1"]);
}

#[test]
fn test_inclusion_needs_every_listed_ingredient() {
    let recipes = collection();
    let filter = RecipeFilter::new().with_included(" pommes , beurre ");
    assert_eq!(ids(&filter.apply(&recipes)), vec!["3"]);

    let filter = RecipeFilter::new().with_excluded("pommes");
    assert_eq!(ids(&filter.apply(&recipes)), vec!["1", "2", "4", "6"]);
}

#[test]
fn test_tightening_a_criterion_never_grows_the_result() {
    let recipes = collection();

    let mut previous = usize::MAX;
    for max in (0..=240).rev().step_by(5) {
        let count = RecipeFilter::new().with_max_total_time(max).apply(&recipes).len();
        assert!(count <= previous, "max total time {max} grew the result");
        previous = count;
    }

    let mut previous = usize::MAX;
    for min in 1..=10 {
        let count = RecipeFilter::new().with_min_servings(min).apply(&recipes).len();
        assert!(count <= previous, "min servings {min} grew the result");
        previous = count;
    }

    let base = RecipeFilter::new().with_search("o");
    let loose = base.apply(&recipes).len();
    let narrower = base.clone().with_included("tomate").apply(&recipes).len();
    let narrowest = base
        .clone()
        .with_included("tomate, courgette")
        .apply(&recipes)
        .len();
    assert!(narrower <= loose);
    assert!(narrowest <= narrower);

    let unrestricted = base.apply(&recipes).len();
    let restricted = base
        .with_category(CategoryFilter::Only(RecipeCategory::Dessert))
        .apply(&recipes)
        .len();
    assert!(restricted <= unrestricted);
}

#[test]
fn test_query_defaults_apply_only_in_advanced_mode() {
    let recipes = collection();

    let simple = RecipeFilterQuery {
        min_servings: Some(100),
        ..RecipeFilterQuery::default()
    }
    .into_filter()
    .unwrap();
    assert_eq!(simple.apply(&recipes).len(), recipes.len());

    let advanced = RecipeFilterQuery {
        advanced: true,
        ..RecipeFilterQuery::default()
    }
    .into_filter()
    .unwrap();
    assert_eq!(advanced.max_total_time, Some(240));

    let error = RecipeFilterQuery {
        category: Some("Soupe".to_owned()),
        ..RecipeFilterQuery::default()
    }
    .into_filter()
    .unwrap_err();
    assert_eq!(error.code, recipe_planner::errors::ErrorCode::InvalidInput);
}

#[test]
fn test_quick_search_matches_title_or_category_label() {
    let recipes = collection();
    assert_eq!(ids(&quick_search(&recipes, "plat")), vec!["1", "5"]);
    assert_eq!(ids(&quick_search(&recipes, "mojito")), vec!["4"]);
    assert_eq!(quick_search(&recipes, "  ").len(), recipes.len());
}

#[tokio::test]
async fn test_week_view_skips_deleted_recipes() {
    let data = loaded_data().await;
    let kept = data
        .recipes()
        .create(recipe_input("Ratatouille", RecipeCategory::MainCourse))
        .await
        .unwrap();
    let deleted = data
        .recipes()
        .create(recipe_input("Soupe", RecipeCategory::Entree))
        .await
        .unwrap();

    let monday = day("2024-06-10");
    let planning = data.planning();
    planning
        .add_recipe_to_plan(monday, MealSlot::Lunch, &kept.id, MealType::MainCourse)
        .await
        .unwrap();
    planning
        .add_recipe_to_plan(day("2024-06-12"), MealSlot::Dinner, &deleted.id, MealType::Entree)
        .await
        .unwrap();
    planning
        .add_recipe_to_plan(day("2024-06-17"), MealSlot::Lunch, &kept.id, MealType::MainCourse)
        .await
        .unwrap();
    planning.add_event("Vacances", day("2024-06-14"), 3).await.unwrap();
    assert!(data.recipes().delete(&deleted.id).await.unwrap());

    let planning_data = planning.data().unwrap();
    let overview = data
        .recipes()
        .with_book(|book| week_overview(&planning_data, book, day("2024-06-13")))
        .unwrap();

    assert_eq!(overview.week_start, monday);
    assert_eq!(overview.week_end, day("2024-06-16"));
    assert_eq!(overview.days.len(), 7);
    assert_eq!(overview.filled_slots, 2);
    assert_eq!(overview.total_slots, 21);
    assert_eq!(overview.days[0].slots[0].dishes[0].recipe.id, kept.id);
    // The dangling reference keeps its slot but resolves to no dish
    assert!(overview.days[2].slots[0].dishes.is_empty());
    assert!(overview.days[3].events.is_empty());
    assert_eq!(overview.days[4].events.len(), 1);
    assert_eq!(overview.days[6].events.len(), 1);

    let planned = data
        .recipes()
        .with_book(|book| week_recipes(&planning_data, book, monday))
        .unwrap();
    assert_eq!(planned.len(), 1);
}

#[test]
fn test_shopping_list_groups_ingredients_by_name() {
    let recipes = collection();
    let list = ShoppingList::from_recipes([&recipes[0], &recipes[1], &recipes[0]]);

    assert_eq!(list.recipe_count, 3);
    let tomato = list
        .items
        .iter()
        .find(|item| item.name == "Tomate")
        .unwrap();
    assert_eq!(tomato.sources.len(), 3);
    assert_eq!(tomato.sources[1].recipe_title, "Salade niçoise");
    assert!(ShoppingList::from_recipes(std::iter::empty::<&Recipe>()).is_empty());
}
