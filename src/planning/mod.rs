// ABOUTME: Planning module: planned meals, planned events, and their persisted store
// ABOUTME: Exposes PlanningStore and the time-based event id generator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Meal Planning
//!
//! The [`PlanningStore`] owns every planned meal and planned event. It starts
//! in the Loading phase, becomes Ready once the persisted snapshot has been
//! read (or defaulted), and persists the full planning after each mutation.

mod event_ids;
mod store;

pub use event_ids::{EventIdGenerator, EVENT_ID_PREFIX};
pub use store::PlanningStore;
