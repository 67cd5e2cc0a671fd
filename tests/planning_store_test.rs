// ABOUTME: Integration tests for the planning store lifecycle, mutations, and persistence
// ABOUTME: Covers idempotent slot assignment, pruning, event ranges, reload, and storage failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::sync::Arc;

use recipe_planner::errors::ErrorCode;
use recipe_planner::models::{EventUpdate, MealSlot, MealType, PlannedRecipe};
use recipe_planner::planning::PlanningStore;
use recipe_planner::storage::{LoadOutcome, MemorySnapshotStore, SnapshotStore};
use serde_json::json;

use common::{day, memory_backend, FailingSnapshotStore};

async fn ready_store() -> PlanningStore {
    PlanningStore::open(memory_backend()).await.unwrap()
}

#[tokio::test]
async fn test_added_recipe_is_the_only_entry_of_its_slot() {
    let store = ready_store().await;
    let date = day("2024-06-10");

    store
        .add_recipe_to_plan(date, MealSlot::Lunch, "R1", MealType::MainCourse)
        .await
        .unwrap();

    let plan = store.get_plan_for_date(date).unwrap();
    assert_eq!(
        serde_json::to_value(&plan).unwrap(),
        json!([{
            "date": "2024-06-10",
            "meal": "lunch",
            "recipes": [{"recipeId": "R1", "mealType": "Plat Principal"}]
        }])
    );
}

#[tokio::test]
async fn test_repeated_adds_keep_one_entry() {
    let store = ready_store().await;
    let date = day("2024-06-11");

    for _ in 0..5 {
        store
            .add_recipe_to_plan(date, MealSlot::Dinner, "R1", MealType::Dessert)
            .await
            .unwrap();
    }

    let plan = store.get_plan_for_date(date).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].recipes, vec![PlannedRecipe::new("R1", MealType::Dessert)]);
}

#[tokio::test]
async fn test_removing_last_entry_prunes_the_slot() {
    let store = ready_store().await;
    let date = day("2024-06-10");

    store
        .add_recipe_to_plan(date, MealSlot::Lunch, "R1", MealType::MainCourse)
        .await
        .unwrap();
    store
        .add_recipe_to_plan(date, MealSlot::Dinner, "R2", MealType::Entree)
        .await
        .unwrap();

    let removed = store
        .remove_recipe_from_plan(date, MealSlot::Lunch, "R1", MealType::MainCourse)
        .await
        .unwrap();
    assert!(removed);

    let plan = store.get_plan_for_date(date).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].meal, MealSlot::Dinner);
    assert!(store
        .planned_meals()
        .unwrap()
        .iter()
        .all(|meal| !meal.recipes.is_empty()));
}

#[tokio::test]
async fn test_removing_unknown_pair_is_a_no_op() {
    let store = ready_store().await;
    let date = day("2024-06-10");
    store
        .add_recipe_to_plan(date, MealSlot::Lunch, "R1", MealType::MainCourse)
        .await
        .unwrap();

    let removed = store
        .remove_recipe_from_plan(date, MealSlot::Lunch, "R1", MealType::Dessert)
        .await
        .unwrap();
    assert!(!removed);
    let removed = store
        .remove_recipe_from_plan(day("2024-07-01"), MealSlot::Breakfast, "R9", MealType::Entree)
        .await
        .unwrap();
    assert!(!removed);

    assert_eq!(store.get_plan_for_date(date).unwrap()[0].recipes.len(), 1);
}

#[tokio::test]
async fn test_plan_for_date_is_ordered_by_slot() {
    let store = ready_store().await;
    let date = day("2024-06-10");
    for slot in [MealSlot::Dinner, MealSlot::Breakfast, MealSlot::Lunch] {
        store
            .add_recipe_to_plan(date, slot, "R1", MealType::MainCourse)
            .await
            .unwrap();
    }

    let slots: Vec<MealSlot> = store
        .get_plan_for_date(date)
        .unwrap()
        .into_iter()
        .map(|meal| meal.meal)
        .collect();
    assert_eq!(slots, MealSlot::ALL.to_vec());
}

#[tokio::test]
async fn test_event_added_then_removed_leaves_the_day_empty() {
    let store = ready_store().await;
    let date = day("2024-06-10");

    let event = store.add_event_to_plan(date, "Anniversaire").await.unwrap();
    assert_eq!(event.duration, 1);
    assert!(event.id.starts_with("event-"));
    assert_eq!(store.get_events_for_date(date).unwrap().len(), 1);

    assert!(store.remove_event_from_plan(&event.id).await.unwrap());
    assert!(store.get_events_for_date(date).unwrap().is_empty());
    assert!(!store.remove_event(&event.id).await.unwrap());
}

#[tokio::test]
async fn test_multi_day_event_covers_its_range() {
    let store = ready_store().await;
    let event = store
        .add_event("Vacances", day("2024-06-10"), 3)
        .await
        .unwrap();

    assert!(store.get_events_for_date(day("2024-06-09")).unwrap().is_empty());
    for date in ["2024-06-10", "2024-06-11", "2024-06-12"] {
        let events = store.get_events_for_date(day(date)).unwrap();
        assert_eq!(events, vec![event.clone()], "event should cover {date}");
    }
    assert!(store.get_events_for_date(day("2024-06-13")).unwrap().is_empty());
}

#[tokio::test]
async fn test_event_ids_are_unique() {
    let store = ready_store().await;
    let date = day("2024-06-10");

    let mut ids = Vec::new();
    for index in 0..20 {
        ids.push(
            store
                .add_event_to_plan(date, &format!("Fête {index}"))
                .await
                .unwrap()
                .id,
        );
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn test_update_event_replaces_given_fields() {
    let store = ready_store().await;
    let event = store
        .add_event("Vacances", day("2024-06-10"), 2)
        .await
        .unwrap();

    let updated = store
        .update_event(EventUpdate {
            id: event.id.clone(),
            name: Some("  Vacances d'été ".to_owned()),
            start_date: None,
            duration: Some(5),
        })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "Vacances d'été");
    assert_eq!(updated.start_date, day("2024-06-10"));
    assert_eq!(updated.duration, 5);
    assert_eq!(store.get_events_for_date(day("2024-06-14")).unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_of_unknown_event_changes_nothing() {
    let store = ready_store().await;
    store
        .add_event_to_plan(day("2024-06-10"), "Anniversaire")
        .await
        .unwrap();
    let before = store.data().unwrap();

    let updated = store
        .update_event(EventUpdate {
            id: "event-0".to_owned(),
            name: Some("Autre".to_owned()),
            start_date: None,
            duration: None,
        })
        .await
        .unwrap();

    assert!(updated.is_none());
    assert_eq!(store.data().unwrap(), before);
}

#[tokio::test]
async fn test_state_survives_a_reload() {
    let backend = memory_backend();
    let store = PlanningStore::open(Arc::clone(&backend)).await.unwrap();
    let date = day("2024-06-10");

    store
        .add_recipe_to_plan(date, MealSlot::Lunch, "R1", MealType::MainCourse)
        .await
        .unwrap();
    store
        .add_recipe_to_plan(date, MealSlot::Lunch, "R2", MealType::Dessert)
        .await
        .unwrap();
    store.add_event("Vacances", date, 4).await.unwrap();
    let before = store.data().unwrap();

    let reloaded = PlanningStore::new(backend);
    let outcome = reloaded.load().await.unwrap();
    assert!(matches!(outcome, LoadOutcome::Restored { .. }));
    assert_eq!(reloaded.data().unwrap(), before);

    // Ids issued after a reload never collide with stored ones
    let next = reloaded.add_event_to_plan(date, "Fête").await.unwrap();
    assert!(before.events.iter().all(|event| event.id != next.id));
}

#[tokio::test]
async fn test_operations_are_rejected_while_loading() {
    let store = PlanningStore::new(memory_backend());
    let date = day("2024-06-10");

    assert!(!store.is_ready());
    let error = store.get_plan_for_date(date).unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceUnavailable);
    let error = store
        .add_recipe_to_plan(date, MealSlot::Lunch, "R1", MealType::MainCourse)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceUnavailable);
    assert!(store.add_event_to_plan(date, "Fête").await.is_err());

    store.load().await.unwrap();
    assert!(store.is_ready());
    assert_eq!(store.load().await.unwrap(), LoadOutcome::AlreadyLoaded);
    assert!(store.get_plan_for_date(date).unwrap().is_empty());
}

#[tokio::test]
async fn test_storage_failures_fall_back_and_keep_memory() {
    common::init_test_logging();
    let backend: Arc<dyn SnapshotStore> = Arc::new(FailingSnapshotStore::new());
    let store = PlanningStore::new(backend);

    assert_eq!(store.load().await.unwrap(), LoadOutcome::Defaulted);

    let date = day("2024-06-10");
    store
        .add_recipe_to_plan(date, MealSlot::Lunch, "R1", MealType::MainCourse)
        .await
        .unwrap();
    assert_eq!(store.get_plan_for_date(date).unwrap().len(), 1);
}

#[tokio::test]
async fn test_legacy_snapshot_is_normalized_on_load() {
    let backend = Arc::new(MemorySnapshotStore::new());
    let legacy = recipe_planner::storage::Snapshot::capture(
        1,
        3,
        &json!({
            "meals": [
                {"date": "2024-06-10", "meal": "Midi", "recipes": [{"recipeId": "R1", "mealType": "Plat Principal"}]},
                {"date": "2024-06-10", "meal": "lunch", "recipes": [{"recipeId": "R1", "mealType": "Plat Principal"}]},
                {"date": "2024-06-10", "meal": "Soir", "recipes": []}
            ],
            "events": [{"id": "event-1", "date": "2024-06-10", "name": "Anniversaire"}]
        }),
    )
    .unwrap();
    backend.write("mon_planning_v2", &legacy).await.unwrap();

    let store = PlanningStore::open(backend).await.unwrap();
    let plan = store.get_plan_for_date(day("2024-06-10")).unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].meal, MealSlot::Lunch);
    assert_eq!(plan[0].recipes.len(), 1);
    let events = store.get_events_for_date(day("2024-06-10")).unwrap();
    assert_eq!(events[0].name, "Anniversaire");
    assert_eq!(events[0].duration, 1);
}
