// ABOUTME: Inference context for dependency injection of the recipe inference service
// ABOUTME: Holds the optional service and the tracker that makes calls cancellable per view
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::inference::{InferenceTracker, RecipeInferenceService};

/// Inference context
///
/// The service is absent when no model API key is configured; every
/// inference route then answers `EXTERNAL_SERVICE_UNAVAILABLE`.
#[derive(Clone)]
pub struct InferenceContext {
    service: Option<Arc<dyn RecipeInferenceService>>,
    tracker: Arc<InferenceTracker>,
}

impl InferenceContext {
    /// Create new inference context
    #[must_use]
    pub const fn new(
        service: Option<Arc<dyn RecipeInferenceService>>,
        tracker: Arc<InferenceTracker>,
    ) -> Self {
        Self { service, tracker }
    }

    /// Get the inference service
    ///
    /// # Errors
    ///
    /// Returns `EXTERNAL_SERVICE_UNAVAILABLE` when inference is not configured.
    pub fn service(&self) -> AppResult<&Arc<dyn RecipeInferenceService>> {
        self.service.as_ref().ok_or_else(|| {
            AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                "Recipe inference is not configured (GEMINI_API_KEY is not set)",
            )
        })
    }

    /// True when a service is configured
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.service.is_some()
    }

    /// Get the call tracker
    #[must_use]
    pub const fn tracker(&self) -> &Arc<InferenceTracker> {
        &self.tracker
    }
}
