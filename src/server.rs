// ABOUTME: HTTP server assembly: merges the domain routers and applies the middleware stack
// ABOUTME: Serves the API with graceful shutdown on Ctrl-C or SIGTERM
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # HTTP Server
//!
//! [`build_router`] is what the integration tests drive through
//! `tower::ServiceExt::oneshot`; [`run`] binds a listener and serves it.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::constants::limits::MAX_IMAGE_BYTES;
use crate::context::ServerContext;
use crate::middleware::{request_id_middleware, setup_cors};
use crate::routes::{
    EventRoutes, HealthRoutes, InferenceRoutes, PlanningRoutes, RecipeRoutes, SettingsRoutes,
    ShoppingRoutes,
};

/// Largest accepted request body: a base64 photo at the image limit plus JSON framing
pub const MAX_REQUEST_BODY_BYTES: usize = MAX_IMAGE_BYTES / 3 * 4 + 64 * 1024;

/// Slack added on top of the inference deadline before the HTTP layer gives up
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(30);

/// Build the complete application router for `context`
#[must_use]
pub fn build_router(context: &ServerContext) -> Router {
    let request_timeout = context.config().inference.timeout() + REQUEST_TIMEOUT_MARGIN;

    Router::new()
        .merge(HealthRoutes::routes(context.clone()))
        .merge(RecipeRoutes::routes(context.clone()))
        .merge(PlanningRoutes::routes(context.clone()))
        .merge(EventRoutes::routes(context.clone()))
        .merge(ShoppingRoutes::routes(context.clone()))
        .merge(SettingsRoutes::routes(context.clone()))
        .merge(InferenceRoutes::routes(context.clone()))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(setup_cors(context.config()))
        .layer(middleware::from_fn(request_id_middleware))
}

/// Bind the configured address and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if the address is invalid, the port cannot be bound, or
/// the server stops abnormally.
pub async fn run(context: ServerContext) -> Result<()> {
    let config = context.config();
    let addr: SocketAddr = format!("{}:{}", config.host, config.http_port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.http_port))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {addr}"))?;
    info!(address = %addr, "Recipe planner HTTP server listening");

    let app = build_router(&context);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server exited unexpectedly")?;

    info!("Recipe planner HTTP server stopped");
    Ok(())
}

/// Resolve on Ctrl-C, or on SIGTERM where available
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Ctrl-C received, shutting down"),
        () = terminate => info!("SIGTERM received, shutting down"),
    }
}
