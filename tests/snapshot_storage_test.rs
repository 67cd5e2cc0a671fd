// ABOUTME: Integration tests for the snapshot backends and the revision rule
// ABOUTME: Out-of-order writes converge to the last-issued snapshot on SQLite and in memory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::sync::Arc;

use recipe_planner::config::DatabaseUrl;
use recipe_planner::constants::defaults::{DEFAULT_BACKGROUND_IMAGE, DEFAULT_SYSTEM_PROMPT};
use recipe_planner::models::{MealSlot, MealType, Settings};
use recipe_planner::planning::PlanningStore;
use recipe_planner::settings::SettingsStore;
use recipe_planner::storage::{
    open_snapshot_store, LoadOutcome, MemorySnapshotStore, Snapshot, SnapshotStore,
    SqliteSnapshotStore, WriteOutcome,
};
use serde_json::json;
use tempfile::TempDir;

use common::{day, init_test_logging};

async fn assert_out_of_order_writes_converge(backend: &dyn SnapshotStore) {
    let first = Snapshot::capture(1, 10, &json!({"value": "first"})).unwrap();
    let second = Snapshot::capture(1, 11, &json!({"value": "second"})).unwrap();

    // The later snapshot lands first, the earlier one arrives late
    assert_eq!(
        backend.write("doc", &second).await.unwrap(),
        WriteOutcome::Applied
    );
    assert_eq!(
        backend.write("doc", &first).await.unwrap(),
        WriteOutcome::Superseded
    );

    let stored = backend.read("doc").await.unwrap().unwrap();
    assert_eq!(stored.revision, 11);
    assert_eq!(stored.data, json!({"value": "second"}));

    // Replaying the same revision is not applied twice
    assert_eq!(
        backend.write("doc", &second).await.unwrap(),
        WriteOutcome::Superseded
    );
}

#[tokio::test]
async fn test_memory_backend_converges_to_last_issued_write() {
    init_test_logging();
    let backend = MemorySnapshotStore::new();
    assert_out_of_order_writes_converge(&backend).await;
    assert_eq!(backend.len(), 1);
}

#[tokio::test]
async fn test_sqlite_memory_backend_converges_to_last_issued_write() {
    init_test_logging();
    let backend = SqliteSnapshotStore::connect("sqlite::memory:").await.unwrap();
    assert_out_of_order_writes_converge(&backend).await;
}

#[tokio::test]
async fn test_sqlite_file_backend_survives_reopen() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("nested/planner.db").display());

    {
        let backend = SqliteSnapshotStore::connect(&url).await.unwrap();
        assert_out_of_order_writes_converge(&backend).await;
        backend.pool().close().await;
    }

    let reopened = SqliteSnapshotStore::connect(&url).await.unwrap();
    let stored = reopened.read("doc").await.unwrap().unwrap();
    assert_eq!(stored.revision, 11);
    assert!(reopened.read("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_store_writes_converge_to_final_state() {
    init_test_logging();
    let backend: Arc<dyn SnapshotStore> =
        Arc::new(SqliteSnapshotStore::connect("sqlite::memory:").await.unwrap());
    let store = Arc::new(PlanningStore::open(Arc::clone(&backend)).await.unwrap());
    let date = day("2024-06-10");

    let mut handles = Vec::new();
    for index in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .add_recipe_to_plan(date, MealSlot::Dinner, &format!("R{index}"), MealType::MainCourse)
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let in_memory = store.data().unwrap();
    assert_eq!(in_memory.meals[0].recipes.len(), 16);

    let reloaded = PlanningStore::open(backend).await.unwrap();
    assert_eq!(reloaded.data().unwrap(), in_memory);
}

#[tokio::test]
async fn test_open_snapshot_store_selects_backend() {
    init_test_logging();
    let memory = open_snapshot_store(&DatabaseUrl::Memory).await.unwrap();
    assert_eq!(memory.backend_name(), "memory");

    let dir = TempDir::new().unwrap();
    let url = DatabaseUrl::SQLite {
        path: dir.path().join("planner.db"),
    };
    let sqlite = open_snapshot_store(&url).await.unwrap();
    assert_eq!(sqlite.backend_name(), "sqlite");
}

#[tokio::test]
async fn test_newer_schema_snapshot_is_ignored() {
    init_test_logging();
    let backend = Arc::new(MemorySnapshotStore::new());
    let future = Snapshot::capture(
        99,
        5,
        &json!({"systemPrompt": "from the future", "backgroundImage": "/x.jpg"}),
    )
    .unwrap();
    backend.write("app_settings_v1", &future).await.unwrap();

    let store = SettingsStore::new(Arc::clone(&backend) as Arc<dyn SnapshotStore>);
    assert_eq!(store.load().await.unwrap(), LoadOutcome::Defaulted);
    assert_eq!(store.settings().unwrap(), Settings::default());

    // Changes stay in memory, the newer document is left untouched
    let updated = store.set_background_image("/images/jardin.jpg").await.unwrap();
    assert_eq!(updated.background_image, "/images/jardin.jpg");
    let stored = backend.read("app_settings_v1").await.unwrap().unwrap();
    assert_eq!(stored.schema_version, 99);
    assert_eq!(stored.revision, 5);
    assert_eq!(stored.data["systemPrompt"], "from the future");
}

#[tokio::test]
async fn test_settings_persist_both_fields_and_survive_reload() {
    init_test_logging();
    let backend: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
    let store = SettingsStore::open(Arc::clone(&backend)).await.unwrap();
    store
        .set_background_image("/images/cuisine.jpg")
        .await
        .unwrap();

    let stored = backend.read("app_settings_v1").await.unwrap().unwrap();
    assert_eq!(stored.data["backgroundImage"], "/images/cuisine.jpg");
    assert_eq!(stored.data["systemPrompt"], DEFAULT_SYSTEM_PROMPT);

    store
        .set_system_prompt("Tu es un chef lyonnais.")
        .await
        .unwrap();
    let reopened = SettingsStore::open(backend).await.unwrap();
    let settings = reopened.settings().unwrap();
    assert_eq!(settings.background_image, "/images/cuisine.jpg");
    assert_eq!(settings.system_prompt, "Tu es un chef lyonnais.");
}

#[tokio::test]
async fn test_blank_stored_system_prompt_uses_default() {
    init_test_logging();
    let backend = Arc::new(MemorySnapshotStore::new());
    let stored = Snapshot::capture(1, 3, &json!({"systemPrompt": ""})).unwrap();
    backend.write("app_settings_v1", &stored).await.unwrap();

    let store = SettingsStore::open(backend).await.unwrap();
    let settings = store.settings().unwrap();
    assert_eq!(settings.system_prompt, DEFAULT_SYSTEM_PROMPT);
    assert_eq!(settings.background_image, DEFAULT_BACKGROUND_IMAGE);
}

#[tokio::test]
async fn test_unreadable_snapshot_falls_back_to_defaults() {
    init_test_logging();
    let backend = Arc::new(MemorySnapshotStore::new());
    let broken = Snapshot::capture(2, 5, &json!({"meals": "not a list"})).unwrap();
    backend.write("mon_planning_v2", &broken).await.unwrap();

    let store = PlanningStore::new(Arc::clone(&backend) as Arc<dyn SnapshotStore>);
    assert_eq!(store.load().await.unwrap(), LoadOutcome::Defaulted);
    assert!(store.planned_meals().unwrap().is_empty());

    // The first mutation overwrites the broken document
    store
        .add_event_to_plan(day("2024-06-10"), "Anniversaire")
        .await
        .unwrap();
    let stored = backend.read("mon_planning_v2").await.unwrap().unwrap();
    assert!(stored.revision > 5);
    assert_eq!(stored.data["events"][0]["name"], "Anniversaire");
}
