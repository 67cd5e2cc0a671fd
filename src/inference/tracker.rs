// ABOUTME: Per-view tracking of pending inference calls with cancellation and deadlines
// ABOUTME: A newer call for the same view, or an explicit cancel, drops the pending call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::errors::{AppError, AppResult, ErrorCode};

/// Result of a tracked call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceOutcome<T> {
    /// The call finished
    Completed(T),
    /// The call was superseded or cancelled before it finished
    Cancelled,
}

impl<T> InferenceOutcome<T> {
    /// True for [`InferenceOutcome::Cancelled`]
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[derive(Debug)]
struct PendingCall {
    generation: u64,
    cancel: Arc<Notify>,
}

/// Removes the view's entry when the tracked call ends or its future is dropped
struct PendingGuard<'a> {
    pending: &'a DashMap<String, PendingCall>,
    view_id: &'a str,
    generation: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let generation = self.generation;
        self.pending
            .remove_if(self.view_id, |_, call| call.generation == generation);
    }
}

/// Pending calls keyed by the id of the view that started them
#[derive(Debug)]
pub struct InferenceTracker {
    pending: DashMap<String, PendingCall>,
    next_generation: AtomicU64,
    timeout: Duration,
}

impl InferenceTracker {
    /// Create a tracker whose calls time out after `timeout`
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            next_generation: AtomicU64::new(1),
            timeout,
        }
    }

    /// Deadline applied to every call
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of views with a call in flight
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Cancel the pending call of `view_id`; false when there was none
    pub fn cancel(&self, view_id: &str) -> bool {
        self.pending.remove(view_id).is_some_and(|(_, call)| {
            call.cancel.notify_one();
            debug!(view_id = %view_id, "Cancelled pending inference call");
            true
        })
    }

    fn register(&self, view_id: &str) -> (u64, Arc<Notify>) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancel = Arc::new(Notify::new());
        let previous = self.pending.insert(
            view_id.to_owned(),
            PendingCall {
                generation,
                cancel: Arc::clone(&cancel),
            },
        );
        if let Some(previous) = previous {
            previous.cancel.notify_one();
            debug!(view_id = %view_id, "Superseded pending inference call");
        }
        (generation, cancel)
    }

    /// Run `call` under the tracker's deadline, cancellable through `view_id`
    ///
    /// # Errors
    ///
    /// Returns the call's own error, or `EXTERNAL_SERVICE_UNAVAILABLE` when
    /// the deadline passes first.
    pub async fn run<T, F>(&self, view_id: Option<&str>, call: F) -> AppResult<InferenceOutcome<T>>
    where
        F: Future<Output = AppResult<T>> + Send,
    {
        let deadline = self.timeout;
        let timed = async move {
            tokio::time::timeout(deadline, call).await.map_err(|_| {
                warn!(timeout_secs = deadline.as_secs(), "Inference call timed out");
                AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("Inference did not answer within {} seconds", deadline.as_secs()),
                )
            })?
        };

        let Some(view_id) = view_id else {
            return timed.await.map(InferenceOutcome::Completed);
        };

        let (generation, cancel) = self.register(view_id);
        let _guard = PendingGuard {
            pending: &self.pending,
            view_id,
            generation,
        };
        tokio::select! {
            result = timed => result.map(InferenceOutcome::Completed),
            () = cancel.notified() => Ok(InferenceOutcome::Cancelled),
        }
    }
}
