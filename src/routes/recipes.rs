// ABOUTME: Recipe collection route handlers: filtered listing, quick search, and CRUD
// ABOUTME: Listing applies the home-page filter; search backs the quick-add dialog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::rejected;
use crate::context::ServerContext;
use crate::errors::AppError;
use crate::models::{Recipe, RecipeInput};
use crate::query::{quick_search, RecipeFilterQuery};

/// Recipe list response
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeListResponse {
    /// Matching recipes in collection order
    pub recipes: Vec<Recipe>,
    /// Number of matching recipes
    pub total: usize,
}

impl RecipeListResponse {
    fn from_matches(matches: Vec<&Recipe>) -> Self {
        Self {
            total: matches.len(),
            recipes: matches.into_iter().cloned().collect(),
        }
    }
}

/// Query of the quick-add search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Text matched against title and category
    #[serde(default)]
    pub q: String,
}

/// Recipe routes handler
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Create all recipe routes
    pub fn routes(context: ServerContext) -> Router {
        Router::new()
            .route(
                "/api/recipes",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/api/recipes/search", get(Self::handle_search))
            .route(
                "/api/recipes/:id",
                get(Self::handle_get)
                    .put(Self::handle_replace)
                    .delete(Self::handle_delete),
            )
            .with_state(context)
    }

    /// Handle GET /api/recipes - Filtered recipe list
    async fn handle_list(
        State(context): State<ServerContext>,
        Query(query): Query<RecipeFilterQuery>,
    ) -> Result<Response, AppError> {
        let filter = query
            .into_filter()
            .map_err(|error| rejected("GET /api/recipes", error))?;
        let response = context
            .data()
            .recipes()
            .with_book(|book| RecipeListResponse::from_matches(filter.apply(&book.recipes)))?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/recipes/search - Quick-add search
    async fn handle_search(
        State(context): State<ServerContext>,
        Query(query): Query<SearchQuery>,
    ) -> Result<Response, AppError> {
        let response = context
            .data()
            .recipes()
            .with_book(|book| RecipeListResponse::from_matches(quick_search(&book.recipes, &query.q)))?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/recipes - Create a recipe
    async fn handle_create(
        State(context): State<ServerContext>,
        Json(input): Json<RecipeInput>,
    ) -> Result<Response, AppError> {
        let recipe = context
            .data()
            .recipes()
            .create(input)
            .await
            .map_err(|error| rejected("POST /api/recipes", error))?;

        Ok((StatusCode::CREATED, Json(recipe)).into_response())
    }

    /// Handle GET /api/recipes/:id - Read one recipe
    async fn handle_get(
        State(context): State<ServerContext>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let recipe = context
            .data()
            .recipes()
            .get(&id)?
            .ok_or_else(|| AppError::not_found(format!("Recipe {id}")).with_resource_id(&id))?;

        Ok((StatusCode::OK, Json(recipe)).into_response())
    }

    /// Handle PUT /api/recipes/:id - Replace a recipe
    async fn handle_replace(
        State(context): State<ServerContext>,
        Path(id): Path<String>,
        Json(input): Json<RecipeInput>,
    ) -> Result<Response, AppError> {
        let recipe = context
            .data()
            .recipes()
            .replace(&id, input)
            .await
            .map_err(|error| rejected("PUT /api/recipes/:id", error))?
            .ok_or_else(|| AppError::not_found(format!("Recipe {id}")).with_resource_id(&id))?;

        Ok((StatusCode::OK, Json(recipe)).into_response())
    }

    /// Handle DELETE /api/recipes/:id - Delete a recipe
    ///
    /// Planning entries that reference the recipe are left in place and
    /// skipped by every view.
    async fn handle_delete(
        State(context): State<ServerContext>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let deleted = context.data().recipes().delete(&id).await?;

        if !deleted {
            return Err(AppError::not_found(format!("Recipe {id}")).with_resource_id(&id));
        }

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
