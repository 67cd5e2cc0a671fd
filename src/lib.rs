// ABOUTME: Main library entry point for the recipe planner server
// ABOUTME: Provides the recipe collection, meal planning, shopping lists, and LLM-assisted recipe flows over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Recipe Planner
//!
//! An HTTP service that keeps a recipe collection and a meal planning
//! calendar, derives week views and shopping lists from them, and asks a
//! language model to write, import, or plan recipes.
//!
//! ## Architecture
//!
//! - **Storage**: versioned snapshots of each store, persisted to `SQLite` or memory
//! - **Stores**: planning, recipes, and settings, each loaded once at startup
//! - **Query**: pure views over the stores (filters, calendar, shopping list)
//! - **Inference**: recipe generation, URL and photo import, planning generation
//! - **Routes**: one axum router per domain, merged by [`server::build_router`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use recipe_planner::config::ServerConfig;
//! use recipe_planner::context::ServerContext;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let context = ServerContext::bootstrap(config).await?;
//!     recipe_planner::server::run(context).await
//! }
//! ```

/// Environment-driven server configuration
pub mod config;

/// Storage keys, defaults, limits, and environment variable names
pub mod constants;

/// Focused dependency-injection contexts shared by the routes
pub mod context;

/// Unified error handling
pub mod errors;

/// Recipe generation, import, and planning over a language model
pub mod inference;

/// LLM provider abstraction and the Gemini client
pub mod llm;

/// Structured logging setup and domain event helpers
pub mod logging;

/// HTTP middleware: request ids and CORS
pub mod middleware;

/// Domain models
pub mod models;

/// Meal planning calendar store
pub mod planning;

/// Filters, calendar views, and shopping lists
pub mod query;

/// Recipe collection store
pub mod recipes;

/// HTTP route handlers
pub mod routes;

/// Router assembly and HTTP serving
pub mod server;

/// User settings store
pub mod settings;

/// Snapshot persistence backends
pub mod storage;
