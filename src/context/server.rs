// ABOUTME: Composed server context built once at startup and shared by every route
// ABOUTME: Opens the snapshot backend, loads the stores, and wires the inference service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use tracing::{info, warn};

use super::{DataContext, InferenceContext};
use crate::config::ServerConfig;
use crate::errors::AppResult;
use crate::inference::{InferenceTracker, LlmRecipeInference, RecipeInferenceService};
use crate::storage::open_snapshot_store;

/// Composed server context containing all focused contexts
#[derive(Clone)]
pub struct ServerContext {
    data: DataContext,
    inference: InferenceContext,
    config: Arc<ServerConfig>,
}

impl ServerContext {
    /// Create new server context from focused contexts
    #[must_use]
    pub const fn new(data: DataContext, inference: InferenceContext, config: Arc<ServerConfig>) -> Self {
        Self {
            data,
            inference,
            config,
        }
    }

    /// Build the production context described by `config`
    ///
    /// # Errors
    ///
    /// Returns a database error if the snapshot backend cannot be opened.
    pub async fn bootstrap(config: ServerConfig) -> AppResult<Self> {
        let backend = open_snapshot_store(&config.database).await?;
        info!(backend = backend.backend_name(), database = %config.database, "Snapshot backend opened");

        let data = DataContext::open(&backend).await?;

        let service = LlmRecipeInference::from_config(&config.inference)
            .map(|service| Arc::new(service) as Arc<dyn RecipeInferenceService>);
        if service.is_none() {
            warn!("GEMINI_API_KEY not set, inference routes are disabled");
        }
        let tracker = Arc::new(InferenceTracker::new(config.inference.timeout()));

        Ok(Self::new(
            data,
            InferenceContext::new(service, tracker),
            Arc::new(config),
        ))
    }

    /// Get data context
    #[must_use]
    pub const fn data(&self) -> &DataContext {
        &self.data
    }

    /// Get inference context
    #[must_use]
    pub const fn inference(&self) -> &InferenceContext {
        &self.inference
    }

    /// Get server configuration
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
