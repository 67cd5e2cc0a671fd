// ABOUTME: Application constants shared by the server, stores, and inference flows
// ABOUTME: Re-exports the storage keys, defaults, limits, and environment names from planner-core
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Constants Module
//!
//! The values live in `planner-core` so that models and the server agree on
//! storage keys and limits.

pub use planner_core::constants::{defaults, env_vars, limits, ports, service_names, storage};
