// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Liveness always answers; readiness waits until every store has loaded
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Health check routes for service monitoring

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::context::ServerContext;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(context: ServerContext) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
            .with_state(context)
    }

    async fn handle_health(State(context): State<ServerContext>) -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "status": "healthy",
            "service": context.config().service_name,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    async fn handle_ready(State(context): State<ServerContext>) -> Response {
        let data = context.data();
        let ready = data.is_ready();
        let status = if ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        let body = serde_json::json!({
            "status": if ready { "ready" } else { "loading" },
            "stores": {
                "planning": data.planning().is_ready(),
                "recipes": data.recipes().is_ready(),
                "settings": data.settings().is_ready(),
            },
            "inference": context.inference().is_enabled(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        (status, Json(body)).into_response()
    }
}
