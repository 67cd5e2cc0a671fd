// ABOUTME: Recipe inference route handlers: generation, URL and photo import, meal planning
// ABOUTME: Calls carrying an x-view-id header are cancelled by a newer call or an explicit cancel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{day_param, rejected};
use crate::context::ServerContext;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::inference::{
    materialize, GenerateRecipeRequest, GeneratedPlanning, InferenceOutcome, PhotoImportRequest,
    PlanningProposal, PlanningRecipeSummary, PlanningRequest, UrlImportRequest,
};

/// Header naming the client view that started a call
pub const VIEW_ID_HEADER: &str = "x-view-id";

/// Body of a planning generation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningBody {
    /// Recipes offered to the planner; the whole collection when absent
    #[serde(default)]
    pub recipes: Option<Vec<PlanningRecipeSummary>>,
    /// Number of days to plan
    pub duration: u32,
    /// Free-text preferences
    #[serde(default)]
    pub constraints: String,
    /// First day, to lay the plan out on the calendar
    #[serde(default)]
    pub start_date: Option<String>,
}

/// Planning generation response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningResponse {
    /// Plan as produced by the model, unusable meals removed
    pub planning: GeneratedPlanning,
    /// Calendar layout, present when a start date was given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<PlanningProposal>,
}

/// Inference routes handler
pub struct InferenceRoutes;

impl InferenceRoutes {
    /// Create all inference routes
    pub fn routes(context: ServerContext) -> Router {
        Router::new()
            .route("/api/inference/recipe", post(Self::handle_generate_recipe))
            .route("/api/inference/import/url", post(Self::handle_import_url))
            .route("/api/inference/import/photo", post(Self::handle_import_photo))
            .route("/api/inference/planning", post(Self::handle_planning))
            .route(
                "/api/inference/views/:view_id",
                delete(Self::handle_cancel),
            )
            .with_state(context)
    }

    fn view_id(headers: &HeaderMap) -> Option<&str> {
        headers
            .get(VIEW_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Unwrap a tracked outcome; a dropped call answers 409
    fn completed<T>(outcome: InferenceOutcome<T>, view_id: Option<&str>) -> AppResult<T> {
        match outcome {
            InferenceOutcome::Completed(value) => Ok(value),
            InferenceOutcome::Cancelled => {
                let error = AppError::new(
                    ErrorCode::RequestCancelled,
                    "The inference call was cancelled by a newer request",
                );
                Err(match view_id {
                    Some(id) => error.with_resource_id(id),
                    None => error,
                })
            }
        }
    }

    /// Handle POST /api/inference/recipe - Generate a recipe from free text
    async fn handle_generate_recipe(
        State(context): State<ServerContext>,
        headers: HeaderMap,
        Json(mut request): Json<GenerateRecipeRequest>,
    ) -> Result<Response, AppError> {
        let inference = context.inference();
        let service = inference.service()?;
        if request
            .system_prompt
            .as_deref()
            .is_none_or(|prompt| prompt.trim().is_empty())
        {
            request.system_prompt = Some(context.data().settings().system_prompt()?);
        }

        let view_id = Self::view_id(&headers);
        let outcome = inference
            .tracker()
            .run(view_id, service.generate_recipe(&request))
            .await
            .map_err(|error| rejected("POST /api/inference/recipe", error))?;

        let draft = Self::completed(outcome, view_id)?;
        Ok((StatusCode::OK, Json(draft)).into_response())
    }

    /// Handle POST /api/inference/import/url - Import a recipe from a web page
    async fn handle_import_url(
        State(context): State<ServerContext>,
        headers: HeaderMap,
        Json(request): Json<UrlImportRequest>,
    ) -> Result<Response, AppError> {
        let inference = context.inference();
        let service = inference.service()?;

        let view_id = Self::view_id(&headers);
        let outcome = inference
            .tracker()
            .run(view_id, service.import_recipe_from_url(&request))
            .await
            .map_err(|error| rejected("POST /api/inference/import/url", error))?;

        let draft = Self::completed(outcome, view_id)?;
        Ok((StatusCode::OK, Json(draft)).into_response())
    }

    /// Handle POST /api/inference/import/photo - Transcribe a recipe from a photo
    async fn handle_import_photo(
        State(context): State<ServerContext>,
        headers: HeaderMap,
        Json(request): Json<PhotoImportRequest>,
    ) -> Result<Response, AppError> {
        let inference = context.inference();
        let service = inference.service()?;

        let view_id = Self::view_id(&headers);
        let outcome = inference
            .tracker()
            .run(view_id, service.import_recipe_from_photo(&request))
            .await
            .map_err(|error| rejected("POST /api/inference/import/photo", error))?;

        let draft = Self::completed(outcome, view_id)?;
        Ok((StatusCode::OK, Json(draft)).into_response())
    }

    /// Handle POST /api/inference/planning - Generate a meal plan
    ///
    /// The plan is returned to the client, never written to the planning store.
    async fn handle_planning(
        State(context): State<ServerContext>,
        headers: HeaderMap,
        Json(body): Json<PlanningBody>,
    ) -> Result<Response, AppError> {
        const ROUTE: &str = "POST /api/inference/planning";
        let inference = context.inference();
        let service = inference.service()?;

        let start_date = body
            .start_date
            .as_deref()
            .map(|date| day_param(ROUTE, date))
            .transpose()?;
        let recipes = match body.recipes {
            Some(recipes) => recipes,
            None => context.data().recipes().with_book(|book| {
                book.recipes
                    .iter()
                    .map(PlanningRecipeSummary::from)
                    .collect()
            })?,
        };
        let request = PlanningRequest {
            recipes,
            duration: body.duration,
            constraints: body.constraints,
        };

        let view_id = Self::view_id(&headers);
        let outcome = inference
            .tracker()
            .run(view_id, service.generate_planning(&request))
            .await
            .map_err(|error| rejected(ROUTE, error))?;

        let planning = Self::completed(outcome, view_id)?;
        let proposal = start_date.map(|start| materialize(&planning, start));
        Ok((StatusCode::OK, Json(PlanningResponse { planning, proposal })).into_response())
    }

    /// Handle DELETE /api/inference/views/:view_id - Cancel the pending call of a view
    async fn handle_cancel(
        State(context): State<ServerContext>,
        Path(view_id): Path<String>,
    ) -> Result<Response, AppError> {
        let cancelled = context.inference().tracker().cancel(&view_id);
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "viewId": view_id, "cancelled": cancelled })),
        )
            .into_response())
    }
}
