// ABOUTME: Settings route handlers for the system prompt and the background image
// ABOUTME: Every change re-persists both fields; resets restore the built-in defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::rejected;
use crate::context::ServerContext;
use crate::errors::AppError;
use crate::models::Settings;

/// Body of a system prompt change
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemPromptBody {
    /// New instruction preamble
    pub system_prompt: String,
}

/// Body of a background image change
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundImageBody {
    /// Site path or http(s) URL of the image
    pub background_image: String,
}

/// Body of a background image removal
#[derive(Debug, Deserialize)]
pub struct ForgetImageBody {
    /// Image that no longer exists
    pub url: String,
}

/// Result of a background image removal
#[derive(Debug, Serialize, Deserialize)]
pub struct ForgetImageResponse {
    /// True when the removed image was the current background
    pub reverted: bool,
    /// Settings after the removal
    pub settings: Settings,
}

/// Settings routes handler
pub struct SettingsRoutes;

impl SettingsRoutes {
    /// Create all settings routes
    pub fn routes(context: ServerContext) -> Router {
        Router::new()
            .route("/api/settings", get(Self::handle_get))
            .route("/api/settings/system-prompt", put(Self::handle_set_prompt))
            .route(
                "/api/settings/system-prompt/reset",
                post(Self::handle_reset_prompt),
            )
            .route(
                "/api/settings/background-image",
                put(Self::handle_set_background).delete(Self::handle_forget_background),
            )
            .route(
                "/api/settings/background-image/reset",
                post(Self::handle_reset_background),
            )
            .with_state(context)
    }

    /// Handle GET /api/settings - Current settings
    async fn handle_get(State(context): State<ServerContext>) -> Result<Response, AppError> {
        let settings = context.data().settings().settings()?;
        Ok((StatusCode::OK, Json(settings)).into_response())
    }

    /// Handle PUT /api/settings/system-prompt
    async fn handle_set_prompt(
        State(context): State<ServerContext>,
        Json(body): Json<SystemPromptBody>,
    ) -> Result<Response, AppError> {
        let settings = context
            .data()
            .settings()
            .set_system_prompt(&body.system_prompt)
            .await
            .map_err(|error| rejected("PUT /api/settings/system-prompt", error))?;

        Ok((StatusCode::OK, Json(settings)).into_response())
    }

    /// Handle POST /api/settings/system-prompt/reset
    async fn handle_reset_prompt(
        State(context): State<ServerContext>,
    ) -> Result<Response, AppError> {
        let settings = context.data().settings().reset_system_prompt().await?;
        Ok((StatusCode::OK, Json(settings)).into_response())
    }

    /// Handle PUT /api/settings/background-image
    async fn handle_set_background(
        State(context): State<ServerContext>,
        Json(body): Json<BackgroundImageBody>,
    ) -> Result<Response, AppError> {
        let settings = context
            .data()
            .settings()
            .set_background_image(&body.background_image)
            .await
            .map_err(|error| rejected("PUT /api/settings/background-image", error))?;

        Ok((StatusCode::OK, Json(settings)).into_response())
    }

    /// Handle POST /api/settings/background-image/reset
    async fn handle_reset_background(
        State(context): State<ServerContext>,
    ) -> Result<Response, AppError> {
        let settings = context.data().settings().reset_background_image().await?;
        Ok((StatusCode::OK, Json(settings)).into_response())
    }

    /// Handle DELETE /api/settings/background-image - The image was deleted elsewhere
    async fn handle_forget_background(
        State(context): State<ServerContext>,
        Json(body): Json<ForgetImageBody>,
    ) -> Result<Response, AppError> {
        let store = context.data().settings();
        let reverted = store.forget_background_image(&body.url).await?;
        let settings = store.settings()?;

        Ok((StatusCode::OK, Json(ForgetImageResponse { reverted, settings })).into_response())
    }
}
