// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Storage keys, default settings values, limits, and environment variable names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Constants module
//!
//! Application constants grouped by domain rather than kept in a single list.

/// Snapshot keys and schema versions, one per persisted store
pub mod storage {
    /// Key of the planning snapshot (meals and events)
    pub const PLANNING_KEY: &str = "mon_planning_v2";
    /// Key of the settings snapshot
    pub const SETTINGS_KEY: &str = "app_settings_v1";
    /// Key of the recipe collection snapshot
    pub const RECIPES_KEY: &str = "recipes_v1";

    /// Current schema version of the planning payload
    pub const PLANNING_SCHEMA_VERSION: u32 = 2;
    /// Current schema version of the settings payload
    pub const SETTINGS_SCHEMA_VERSION: u32 = 1;
    /// Current schema version of the recipe payload
    pub const RECIPES_SCHEMA_VERSION: u32 = 1;
}

/// Default values of the user settings
pub mod defaults {
    /// Instruction preamble used for free-text recipe generation
    pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert chef specializing in creating delicious, easy-to-follow recipes.
Your task is to generate a recipe based on the user's request.
Always provide a concise and appealing title and description.
The ingredients list should be clear and precise.
The steps should be numbered and easy to understand for a novice cook.
The category must be one of the following: 'Entrée', 'Plat Principal', 'Dessert', 'Boisson', 'Apéritif', 'Autre'.
Infer the prep time, cook time, and servings from the user request, or make a reasonable guess if not specified.
Make sure the recipe is complete and logical.";

    /// Background image shown when the user has not picked one
    pub const DEFAULT_BACKGROUND_IMAGE: &str = "/images/default-background.jpg";
}

/// Limits and thresholds
pub mod limits {
    /// Upper bound of the total-time slider on the recipe list
    pub const MAX_TOTAL_TIME_MINUTES: u32 = 240;
    /// Lower bound of the total-time slider on the recipe list
    pub const MIN_TOTAL_TIME_MINUTES: u32 = 10;
    /// Largest accepted image payload (decoded bytes)
    pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
    /// Number of days in a planning week
    pub const DAYS_PER_WEEK: u32 = 7;
    /// Longest planning request accepted by the planning generator
    pub const MAX_PLANNING_DAYS: u32 = 31;
    /// Longest event accepted by the planning store
    pub const MAX_EVENT_DAYS: u32 = 366;
    /// Characters of a fetched recipe page forwarded to the model
    pub const MAX_PAGE_TEXT_CHARS: usize = 20_000;
}

/// Environment variable names
pub mod env_vars {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// HTTP listen address
    pub const HOST: &str = "HOST";
    /// Snapshot database URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Comma-separated CORS origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// Gemini API key
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    /// Model used for recipe generation and import
    pub const GEMINI_MODEL: &str = "GEMINI_MODEL";
    /// Model used for planning generation
    pub const PLANNING_MODEL: &str = "PLANNING_MODEL";
    /// Deadline of one inference call in seconds
    pub const INFERENCE_TIMEOUT_SECS: &str = "INFERENCE_TIMEOUT_SECS";
    /// Deadline of a recipe page download in seconds
    pub const URL_FETCH_TIMEOUT_SECS: &str = "URL_FETCH_TIMEOUT_SECS";
}

/// Service identity used in logs
pub mod service_names {
    /// Name of the HTTP service
    pub const RECIPE_PLANNER_SERVER: &str = "recipe-planner-server";
}

/// Network ports
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}
