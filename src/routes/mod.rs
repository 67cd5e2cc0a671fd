// ABOUTME: Route module organization for the recipe planner HTTP endpoints
// ABOUTME: One router per domain, each a thin layer over the stores, queries, and inference
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Route module for the recipe planner
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the stores, the query layer, or the inference
//! service.

/// Planning event routes
pub mod events;
/// Health check and readiness routes
pub mod health;
/// Recipe inference routes
pub mod inference;
/// Meal planning routes
pub mod planning;
/// Recipe collection routes
pub mod recipes;
/// Settings routes
pub mod settings;
/// Shopping list routes
pub mod shopping;

pub use events::EventRoutes;
pub use health::HealthRoutes;
pub use inference::InferenceRoutes;
pub use planning::PlanningRoutes;
pub use recipes::RecipeRoutes;
pub use settings::SettingsRoutes;
pub use shopping::ShoppingRoutes;

use chrono::NaiveDate;

use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::parse_day;

/// Log an input rejected by `route` and hand the error back
pub(crate) fn rejected(route: &str, error: AppError) -> AppError {
    AppLogger::log_rejected_input(route, &error.message);
    error
}

/// Parse a date path or body parameter, accepting `yyyy-MM-dd` or RFC 3339
pub(crate) fn day_param(route: &str, value: &str) -> AppResult<NaiveDate> {
    parse_day(value).map_err(|error| rejected(route, error))
}
