// ABOUTME: Meal planning route handlers: slot assignments, day, range, and week views
// ABOUTME: Dates are accepted as yyyy-MM-dd or RFC 3339 and normalized to calendar days
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{day_param, rejected};
use crate::constants::limits::{DAYS_PER_WEEK, MAX_EVENT_DAYS};
use crate::context::ServerContext;
use crate::errors::{AppError, ErrorCode};
use crate::models::{MealSlot, MealType, PlannedMeal};
use crate::query::{day_plan, meals_in_range, week_overview, week_recipes, ShoppingList};

/// Body of a slot assignment or removal
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealAssignmentBody {
    /// Day of the slot
    pub date: String,
    /// Slot of the day (`Midi`/`Soir` accepted)
    pub meal: MealSlot,
    /// Recipe to place
    pub recipe_id: String,
    /// Course of the dish
    pub meal_type: MealType,
}

/// Result of a removal
#[derive(Debug, Serialize, Deserialize)]
pub struct RemovalResponse {
    /// False when there was nothing to remove
    pub removed: bool,
}

/// Query of the range listing
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// First day of the range
    pub start: String,
    /// Number of days, one week by default
    #[serde(default)]
    pub days: Option<u32>,
}

/// Planned meals of a range
#[derive(Debug, Serialize, Deserialize)]
pub struct RangeResponse {
    /// Meals ordered by date then slot
    pub meals: Vec<PlannedMeal>,
    /// Number of days covered
    pub days: u32,
}

/// Planning routes handler
pub struct PlanningRoutes;

impl PlanningRoutes {
    /// Create all planning routes
    pub fn routes(context: ServerContext) -> Router {
        Router::new()
            .route("/api/planning", get(Self::handle_snapshot))
            .route(
                "/api/planning/meals",
                post(Self::handle_add_meal).delete(Self::handle_remove_meal),
            )
            .route("/api/planning/dates/:date", get(Self::handle_day))
            .route("/api/planning/range", get(Self::handle_range))
            .route("/api/planning/week/:date", get(Self::handle_week))
            .route(
                "/api/planning/week/:date/shopping-list",
                get(Self::handle_week_shopping_list),
            )
            .with_state(context)
    }

    /// Handle GET /api/planning - Full planning snapshot
    async fn handle_snapshot(State(context): State<ServerContext>) -> Result<Response, AppError> {
        let data = context.data().planning().data()?;
        Ok((StatusCode::OK, Json(data)).into_response())
    }

    /// Handle POST /api/planning/meals - Put a recipe in a slot
    async fn handle_add_meal(
        State(context): State<ServerContext>,
        Json(body): Json<MealAssignmentBody>,
    ) -> Result<Response, AppError> {
        const ROUTE: &str = "POST /api/planning/meals";
        let date = day_param(ROUTE, &body.date)?;
        let meal = context
            .data()
            .planning()
            .add_recipe_to_plan(date, body.meal, &body.recipe_id, body.meal_type)
            .await
            .map_err(|error| rejected(ROUTE, error))?;

        Ok((StatusCode::OK, Json(meal)).into_response())
    }

    /// Handle DELETE /api/planning/meals - Take a recipe out of a slot
    async fn handle_remove_meal(
        State(context): State<ServerContext>,
        Json(body): Json<MealAssignmentBody>,
    ) -> Result<Response, AppError> {
        let date = day_param("DELETE /api/planning/meals", &body.date)?;
        let removed = context
            .data()
            .planning()
            .remove_recipe_from_plan(date, body.meal, &body.recipe_id, body.meal_type)
            .await?;

        Ok((StatusCode::OK, Json(RemovalResponse { removed })).into_response())
    }

    /// Handle GET /api/planning/dates/:date - Plans and events of a day
    async fn handle_day(
        State(context): State<ServerContext>,
        Path(date): Path<String>,
    ) -> Result<Response, AppError> {
        let date = day_param("GET /api/planning/dates/:date", &date)?;
        let plan = context
            .data()
            .planning()
            .with_data(|data| day_plan(data, date))?;

        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    /// Handle GET /api/planning/range - Plans over consecutive days
    async fn handle_range(
        State(context): State<ServerContext>,
        Query(query): Query<RangeQuery>,
    ) -> Result<Response, AppError> {
        const ROUTE: &str = "GET /api/planning/range";
        let start = day_param(ROUTE, &query.start)?;
        let days = query.days.unwrap_or(DAYS_PER_WEEK);
        if !(1..=MAX_EVENT_DAYS).contains(&days) {
            return Err(rejected(
                ROUTE,
                AppError::new(
                    ErrorCode::ValueOutOfRange,
                    format!("days must be between 1 and {MAX_EVENT_DAYS}"),
                ),
            ));
        }

        let meals = context
            .data()
            .planning()
            .with_data(|data| meals_in_range(data, start, days))?;

        Ok((StatusCode::OK, Json(RangeResponse { meals, days })).into_response())
    }

    /// Handle GET /api/planning/week/:date - Week overview around a day
    async fn handle_week(
        State(context): State<ServerContext>,
        Path(date): Path<String>,
    ) -> Result<Response, AppError> {
        let date = day_param("GET /api/planning/week/:date", &date)?;
        let data = context.data();
        let overview = data.planning().with_data(|planning| {
            data.recipes()
                .with_book(|book| week_overview(planning, book, date))
        })??;

        Ok((StatusCode::OK, Json(overview)).into_response())
    }

    /// Handle GET /api/planning/week/:date/shopping-list - Ingredients of a planned week
    async fn handle_week_shopping_list(
        State(context): State<ServerContext>,
        Path(date): Path<String>,
    ) -> Result<Response, AppError> {
        let date = day_param("GET /api/planning/week/:date/shopping-list", &date)?;
        let data = context.data();
        let recipes = data.planning().with_data(|planning| {
            data.recipes()
                .with_book(|book| week_recipes(planning, book, date))
        })??;

        let list = ShoppingList::from_recipes(&recipes);
        Ok((StatusCode::OK, Json(list)).into_response())
    }
}
