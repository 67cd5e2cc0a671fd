// ABOUTME: Core types and constants for the recipe planner service
// ABOUTME: Foundation crate with error handling, domain models, and storage constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Planner Core
//!
//! Foundation crate providing shared types and constants for the recipe
//! planner. This crate changes infrequently, which keeps incremental builds
//! of the service crate fast.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Storage keys, defaults, and limits
//! - **models**: Recipes, planned meals, planned events, and settings

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Domain models shared by the stores, the query layer, and the HTTP routes
pub mod models;
