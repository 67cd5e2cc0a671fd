// ABOUTME: Domain models for recipes, planning, and settings
// ABOUTME: Re-exports the planner-core models used across stores, queries, and routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Domain models shared with `planner-core`

pub use planner_core::models::*;
