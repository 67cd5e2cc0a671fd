// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides logging setup, store and context builders, and scripted test doubles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `recipe_planner`

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use recipe_planner::{
    config::ServerConfig,
    context::{DataContext, InferenceContext, ServerContext},
    errors::{AppError, AppResult},
    inference::{InferenceTracker, LlmRecipeInference, RecipeInferenceService},
    llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider},
    models::{Ingredient, RecipeCategory, RecipeInput},
    storage::{MemorySnapshotStore, Snapshot, SnapshotStore, WriteOutcome},
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Parse a `yyyy-MM-dd` literal
pub fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

/// Fresh in-memory snapshot backend
pub fn memory_backend() -> Arc<dyn SnapshotStore> {
    init_test_logging();
    Arc::new(MemorySnapshotStore::new())
}

/// Valid recipe payload
pub fn recipe_input(title: &str, category: RecipeCategory) -> RecipeInput {
    RecipeInput {
        title: title.to_owned(),
        description: format!("{title} maison"),
        category,
        prep_time: 15,
        cook_time: 30,
        servings: 4,
        ingredients: vec![
            Ingredient::new("Tomates", "4"),
            Ingredient::new("Huile d'olive", "2 c. à soupe"),
        ],
        steps: vec!["Préparer".to_owned(), "Cuire".to_owned()],
        image_url: None,
    }
}

/// Loaded data context over a fresh memory backend
pub async fn loaded_data() -> DataContext {
    DataContext::open(&memory_backend()).await.unwrap()
}

/// Server context with loaded stores and the given inference service
pub async fn test_context(service: Option<Arc<dyn RecipeInferenceService>>) -> ServerContext {
    let data = loaded_data().await;
    let tracker = Arc::new(InferenceTracker::new(Duration::from_secs(5)));
    ServerContext::new(
        data,
        InferenceContext::new(service, tracker),
        Arc::new(ServerConfig::default()),
    )
}

/// Server context whose inference runs over `provider`
pub async fn test_context_with_provider(provider: &Arc<ScriptedProvider>) -> ServerContext {
    let provider: Arc<dyn LlmProvider> = provider.clone();
    let service = LlmRecipeInference::new(provider, "test-model", "test-planner");
    test_context(Some(Arc::new(service))).await
}

/// LLM provider that replays scripted answers and records the requests it saw
pub struct ScriptedProvider {
    answers: Mutex<VecDeque<AppResult<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
    capabilities: LlmCapabilities,
}

impl ScriptedProvider {
    /// Provider answering each call with the next scripted text
    pub fn new(answers: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().map(|a| Ok(a.to_owned())).collect()),
            requests: Mutex::new(Vec::new()),
            capabilities: LlmCapabilities::full_featured(),
        }
    }

    /// Provider failing every call with `error`
    pub fn failing(error: AppError) -> Self {
        Self {
            answers: Mutex::new(VecDeque::from([Err(error)])),
            requests: Mutex::new(Vec::new()),
            capabilities: LlmCapabilities::full_featured(),
        }
    }

    /// Override the advertised capabilities
    #[must_use]
    pub const fn with_capabilities(mut self, capabilities: LlmCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn display_name(&self) -> &'static str {
        "Scripted"
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.capabilities
    }

    fn default_model(&self) -> &str {
        "test-model"
    }

    fn available_models(&self) -> &'static [&'static str] {
        &["test-model", "test-planner"]
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))?;
        Ok(ChatResponse {
            content: answer,
            model: request.model.clone().unwrap_or_else(|| "test-model".to_owned()),
            usage: None,
            finish_reason: Some("STOP".to_owned()),
        })
    }
}

/// Snapshot backend whose reads or writes always fail
pub struct FailingSnapshotStore {
    fail_reads: bool,
}

impl FailingSnapshotStore {
    /// Backend failing both reads and writes
    pub const fn new() -> Self {
        Self { fail_reads: true }
    }

    /// Backend that reads nothing and fails every write
    pub const fn write_only_failures() -> Self {
        Self { fail_reads: false }
    }
}

#[async_trait]
impl SnapshotStore for FailingSnapshotStore {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn read(&self, key: &str) -> AppResult<Option<Snapshot>> {
        if self.fail_reads {
            return Err(AppError::storage(format!("read of {key} failed")));
        }
        Ok(None)
    }

    async fn write(&self, key: &str, _snapshot: &Snapshot) -> AppResult<WriteOutcome> {
        Err(AppError::storage(format!("write of {key} failed")))
    }
}
