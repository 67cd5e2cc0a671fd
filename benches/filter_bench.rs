// ABOUTME: Criterion benchmarks for the recipe filter, quick search, week view, and shopping list
// ABOUTME: Runs the derived views over generated collections of increasing size
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Criterion benchmarks for the recipe query layer.
//!
//! The filter and week view are recomputed on every request, so they are
//! measured against collections from a household size to a large import.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use recipe_planner::models::{
    Ingredient, MealSlot, MealType, PlannedMeal, PlannedRecipe, PlanningData, Recipe, RecipeBook,
    RecipeCategory,
};
use recipe_planner::query::{
    quick_search, week_overview, week_recipes, CategoryFilter, RecipeFilter, ShoppingList,
};

const COLLECTION_SIZES: [usize; 3] = [50, 500, 5_000];

const PANTRY: [&str; 12] = [
    "Tomate",
    "Oignon",
    "Ail",
    "Courgette",
    "Pommes de terre",
    "Crème",
    "Beurre",
    "Farine",
    "Oeuf",
    "Lait",
    "Poulet",
    "Citron",
];

#[allow(clippy::cast_possible_truncation)]
fn generate_recipes(count: usize) -> Vec<Recipe> {
    (0..count)
        .map(|index| Recipe {
            id: format!("bench-{index}"),
            title: format!("Recette {index}"),
            description: String::new(),
            category: RecipeCategory::ALL[index % RecipeCategory::ALL.len()],
            prep_time: 5 + (index % 40) as u32,
            cook_time: (index * 7 % 120) as u32,
            servings: 1 + (index % 8) as u32,
            ingredients: (0..4)
                .map(|offset| Ingredient::new(PANTRY[(index + offset * 3) % PANTRY.len()], "1"))
                .collect(),
            steps: vec!["Préparer".to_owned(), "Cuire".to_owned()],
            image_url: None,
        })
        .collect()
}

fn generate_planning(recipes: &[Recipe], start: NaiveDate) -> PlanningData {
    let mut meals = Vec::new();
    for offset in 0..28_i64 {
        let date = start + Duration::days(offset);
        for (slot_index, slot) in MealSlot::ALL.into_iter().enumerate() {
            let pick = (offset as usize * 3 + slot_index) % recipes.len();
            meals.push(PlannedMeal {
                date,
                meal: slot,
                recipes: vec![PlannedRecipe::new(
                    recipes[pick].id.clone(),
                    MealType::MainCourse,
                )],
            });
        }
    }
    PlanningData {
        meals,
        events: Vec::new(),
    }
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("recipe_filter");

    for size in COLLECTION_SIZES {
        let recipes = generate_recipes(size);
        group.throughput(Throughput::Elements(size as u64));

        let search = RecipeFilter::new().with_search("tomate");
        group.bench_with_input(BenchmarkId::new("search", size), &recipes, |b, recipes| {
            b.iter(|| black_box(search.apply(black_box(recipes)).len()));
        });

        let advanced = RecipeFilter::new()
            .with_category(CategoryFilter::Only(RecipeCategory::MainCourse))
            .with_max_total_time(90)
            .with_min_servings(2)
            .with_included("ail, oignon")
            .with_excluded("poulet");
        group.bench_with_input(BenchmarkId::new("advanced", size), &recipes, |b, recipes| {
            b.iter(|| black_box(advanced.apply(black_box(recipes)).len()));
        });

        group.bench_with_input(BenchmarkId::new("quick_search", size), &recipes, |b, recipes| {
            b.iter(|| black_box(quick_search(black_box(recipes), "plat").len()));
        });
    }

    group.finish();
}

fn bench_week_views(c: &mut Criterion) {
    let mut group = c.benchmark_group("week_views");
    let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

    for size in COLLECTION_SIZES {
        let book = RecipeBook {
            recipes: generate_recipes(size),
        };
        let planning = generate_planning(&book.recipes, start);
        let date = start + Duration::days(10);

        group.bench_with_input(BenchmarkId::new("overview", size), &book, |b, book| {
            b.iter(|| black_box(week_overview(&planning, book, black_box(date))));
        });

        group.bench_with_input(BenchmarkId::new("shopping_list", size), &book, |b, book| {
            b.iter(|| {
                let recipes = week_recipes(&planning, book, black_box(date));
                black_box(ShoppingList::from_recipes(&recipes))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filter, bench_week_views);
criterion_main!(benches);
