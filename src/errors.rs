// ABOUTME: Unified error handling for the recipe planner server
// ABOUTME: Re-exports the planner-core error types used by stores, inference, and routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Unified Error Handling System
//!
//! Error types are defined in `planner-core` with the `http-response`
//! feature enabled, so every handler can return `Result<Response, AppError>`.

pub use planner_core::errors::{
    AppError, AppResult, ErrorCode, ErrorContext, ErrorResponse, ErrorResponseDetails,
};
