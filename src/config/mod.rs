// ABOUTME: Configuration module for the recipe planner server
// ABOUTME: Re-exports the environment-driven server configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Configuration module
//!
//! - **Environment**: server configuration from environment variables

/// Environment and server configuration
pub mod environment;

pub use environment::{
    CorsConfig, DatabaseUrl, Environment, InferenceConfig, LogLevel, ServerConfig,
};
