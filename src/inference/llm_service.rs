// ABOUTME: Model-backed implementation of the recipe inference flows
// ABOUTME: Builds prompts, calls the LLM provider in JSON mode, and decodes drafts and plans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{instrument, warn};

use super::parsing::{parse_draft, parse_planning};
use super::prompts;
use super::sources::{fetch_page_text, validate_recipe_url, PhotoPayload};
use super::{
    GenerateRecipeRequest, GeneratedPlanning, PhotoImportRequest, PlanningRequest,
    RecipeInferenceService, UrlImportRequest,
};
use crate::config::InferenceConfig;
use crate::constants::defaults::DEFAULT_SYSTEM_PROMPT;
use crate::constants::limits::MAX_PLANNING_DAYS;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::{ChatMessage, ChatRequest, GeminiProvider, LlmProvider};
use crate::logging::AppLogger;
use crate::models::RecipeDraft;

/// Temperature of the recipe-producing flows
const RECIPE_TEMPERATURE: f32 = 0.7;
/// Temperature of the import flows, which transcribe rather than invent
const IMPORT_TEMPERATURE: f32 = 0.2;

/// Recipe inference over an [`LlmProvider`]
pub struct LlmRecipeInference {
    provider: Arc<dyn LlmProvider>,
    model: String,
    planning_model: String,
    http: Client,
    fetch_timeout: Duration,
}

impl LlmRecipeInference {
    /// Create the service over any provider
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        planning_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            planning_model: planning_model.into(),
            http: Client::new(),
            fetch_timeout: Duration::from_secs(15),
        }
    }

    /// Build the Gemini-backed service, `None` when no API key is configured
    #[must_use]
    pub fn from_config(config: &InferenceConfig) -> Option<Self> {
        let api_key = config.gemini_api_key.as_deref()?;
        let provider = GeminiProvider::new(api_key).with_default_model(config.model.clone());
        for model in [&config.model, &config.planning_model] {
            if !provider.available_models().contains(&model.as_str()) {
                warn!(model = %model, provider = provider.display_name(), "Model is not in the known list, sending it as is");
            }
        }
        Some(
            Self::new(Arc::new(provider), &config.model, &config.planning_model)
                .with_fetch_timeout(config.fetch_timeout()),
        )
    }

    /// Deadline of a recipe page download
    #[must_use]
    pub const fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Send one request and return the raw text, logging the call
    async fn ask(&self, flow: &str, request: ChatRequest) -> AppResult<String> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_owned());
        let started = Instant::now();
        let result = self.provider.complete(&request).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(response) => {
                let outcome = if response.content.trim().is_empty() {
                    "empty"
                } else {
                    "completed"
                };
                AppLogger::log_inference_call(self.provider.name(), flow, &model, outcome, duration_ms);
                Ok(response.content)
            }
            Err(error) => {
                AppLogger::log_inference_call(self.provider.name(), flow, &model, "failed", duration_ms);
                Err(error)
            }
        }
    }

    fn recipe_request(&self, messages: Vec<ChatMessage>, temperature: f32) -> ChatRequest {
        ChatRequest::new(messages)
            .with_model(self.model.clone())
            .with_temperature(temperature)
            .with_json_response()
    }
}

#[async_trait]
impl RecipeInferenceService for LlmRecipeInference {
    #[instrument(skip(self, request), fields(flow = "generate_recipe"))]
    async fn generate_recipe(&self, request: &GenerateRecipeRequest) -> AppResult<RecipeDraft> {
        let user_input = request.user_input.trim();
        if user_input.is_empty() {
            return Err(AppError::new(
                ErrorCode::MissingRequiredField,
                "userInput must not be empty",
            ));
        }
        let system_prompt = request
            .system_prompt
            .as_deref()
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);

        let chat = self.recipe_request(
            vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(prompts::generate_recipe_user_prompt(user_input)),
            ],
            RECIPE_TEMPERATURE,
        );
        parse_draft(&self.ask("generate_recipe", chat).await?)
    }

    #[instrument(skip(self, request), fields(flow = "import_url", url = %request.url))]
    async fn import_recipe_from_url(&self, request: &UrlImportRequest) -> AppResult<RecipeDraft> {
        let url = validate_recipe_url(&request.url)?;

        // The model can still recognise well-known pages from the address alone
        let page_text = match fetch_page_text(&self.http, &url, self.fetch_timeout).await {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(error) => {
                warn!(error = %error, "Recipe page unavailable, sending the URL only");
                None
            }
        };

        let chat = self.recipe_request(
            vec![ChatMessage::user(prompts::url_import_prompt(
                url.as_str(),
                page_text.as_deref(),
            ))],
            IMPORT_TEMPERATURE,
        );
        parse_draft(&self.ask("import_url", chat).await?)
    }

    #[instrument(skip(self, request), fields(flow = "import_photo"))]
    async fn import_recipe_from_photo(
        &self,
        request: &PhotoImportRequest,
    ) -> AppResult<RecipeDraft> {
        let photo = PhotoPayload::parse(&request.photo_data_uri)?;
        if !self.provider.capabilities().supports_vision() {
            return Err(AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!("{} does not accept images", self.provider.display_name()),
            ));
        }

        let chat = self.recipe_request(
            vec![ChatMessage::user(prompts::photo_import_prompt()).with_image(photo.into_image())],
            IMPORT_TEMPERATURE,
        );
        parse_draft(&self.ask("import_photo", chat).await?)
    }

    #[instrument(skip(self, request), fields(flow = "generate_planning", duration = request.duration))]
    async fn generate_planning(&self, request: &PlanningRequest) -> AppResult<GeneratedPlanning> {
        if !(1..=MAX_PLANNING_DAYS).contains(&request.duration) {
            return Err(AppError::new(
                ErrorCode::ValueOutOfRange,
                format!("duration must be between 1 and {MAX_PLANNING_DAYS} days"),
            ));
        }

        let recipes_json = serde_json::to_string(&request.recipes)?;
        let chat = ChatRequest::new(vec![
            ChatMessage::system(prompts::planning_system_prompt(
                request.duration,
                request.constraints.trim(),
            )),
            ChatMessage::user(prompts::planning_user_prompt(&recipes_json)),
        ])
        .with_model(self.planning_model.clone())
        .with_json_response();

        parse_planning(&self.ask("generate_planning", chat).await?, request)
    }
}

impl Debug for LlmRecipeInference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("LlmRecipeInference")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("planning_model", &self.planning_model)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}
