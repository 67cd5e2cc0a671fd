// ABOUTME: Shopping list route for an explicit selection of recipes
// ABOUTME: Unknown recipe ids in the selection are skipped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::context::ServerContext;
use crate::errors::AppError;
use crate::query::ShoppingList;

/// Selection of recipes
#[derive(Debug, Deserialize)]
pub struct ShoppingListQuery {
    /// Comma-separated recipe ids
    #[serde(default)]
    pub ids: String,
}

/// Shopping list routes handler
pub struct ShoppingRoutes;

impl ShoppingRoutes {
    /// Create all shopping list routes
    pub fn routes(context: ServerContext) -> Router {
        Router::new()
            .route("/api/shopping-list", get(Self::handle_selection))
            .with_state(context)
    }

    /// Handle GET /api/shopping-list?ids=a,b - Ingredients of the selected recipes
    async fn handle_selection(
        State(context): State<ServerContext>,
        Query(query): Query<ShoppingListQuery>,
    ) -> Result<Response, AppError> {
        let ids: Vec<&str> = query
            .ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .collect();
        let recipes = context.data().recipes().get_many(&ids)?;

        Ok((StatusCode::OK, Json(ShoppingList::from_recipes(&recipes))).into_response())
    }
}
