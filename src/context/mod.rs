// ABOUTME: Dependency injection contexts handed to the HTTP routes
// ABOUTME: Stores, inference service, and configuration are built once at startup and shared
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Focused dependency injection contexts
//!
//! # Architecture
//!
//! - `DataContext`: the planning, recipe, and settings stores
//! - `InferenceContext`: the optional inference service and its call tracker
//! - `ServerContext`: both of the above plus the server configuration

pub mod data;
pub mod inference;
pub mod server;

pub use data::DataContext;
pub use inference::InferenceContext;
pub use server::ServerContext;
