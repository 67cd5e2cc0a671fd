// ABOUTME: In-memory state with a Loading/Ready lifecycle that flushes full snapshots on change
// ABOUTME: Shared by the planning, recipe, and settings stores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{Snapshot, SnapshotStore, WriteOutcome};
use crate::errors::{AppError, AppResult};

/// A document persisted as one snapshot under a fixed key
pub trait SnapshotPayload:
    Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static
{
    /// Storage key of the document
    const KEY: &'static str;
    /// Current layout version written with every snapshot
    const SCHEMA_VERSION: u32;

    /// Repair a freshly decoded document
    #[must_use]
    fn normalize(self) -> Self {
        self
    }
}

/// How a store reached the Ready state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A stored snapshot was decoded
    Restored {
        /// Revision of the decoded snapshot
        revision: u64,
    },
    /// Nothing was stored yet
    Empty,
    /// The stored snapshot was unreadable, defaults are in use
    Defaulted,
    /// The store was already Ready
    AlreadyLoaded,
}

enum Phase<T> {
    Loading,
    Ready(T),
}

struct Inner<T> {
    phase: Phase<T>,
    revision: u64,
    detached: bool,
}

/// In-memory document kept in sync with a snapshot backend
///
/// The state starts in Loading and moves to Ready exactly once through
/// [`PersistedState::load`]. Every access before that is rejected with
/// `RESOURCE_UNAVAILABLE`. Mutations run to completion under a synchronous
/// lock, then the full document is flushed with a fresh revision. A failed
/// flush is logged and the in-memory change is kept.
///
/// A state loaded over a snapshot from a newer schema is detached: it
/// serves defaults and accepts mutations, but never flushes them, so the
/// newer document stays intact for the binary that wrote it.
pub struct PersistedState<T: SnapshotPayload> {
    backend: Arc<dyn SnapshotStore>,
    inner: RwLock<Inner<T>>,
}

impl<T: SnapshotPayload> fmt::Debug for PersistedState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedState")
            .field("key", &T::KEY)
            .field("backend", &self.backend.backend_name())
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

impl<T: SnapshotPayload> PersistedState<T> {
    /// Create a state in the Loading phase
    #[must_use]
    pub fn new(backend: Arc<dyn SnapshotStore>) -> Self {
        Self {
            backend,
            inner: RwLock::new(Inner {
                phase: Phase::Loading,
                revision: 0,
                detached: false,
            }),
        }
    }

    /// True once [`Self::load`] has completed
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner
            .read()
            .is_ok_and(|inner| matches!(inner.phase, Phase::Ready(_)))
    }

    /// True when changes stay in memory because the stored snapshot is newer
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.inner.read().is_ok_and(|inner| inner.detached)
    }

    /// Revision of the last issued snapshot
    ///
    /// # Errors
    ///
    /// Returns an internal error if the state lock is poisoned.
    pub fn revision(&self) -> AppResult<u64> {
        Ok(self.read_inner()?.revision)
    }

    /// Read the stored snapshot and enter the Ready phase
    ///
    /// Read failures, undecodable payloads and payloads written by a newer
    /// schema are logged and replaced by defaults. A newer schema also
    /// detaches the state from the backend. The revision counter is
    /// seeded above both the stored revision and the current time so that
    /// writes from this process supersede anything already stored.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the state lock is poisoned.
    pub async fn load(&self) -> AppResult<LoadOutcome> {
        if self.is_ready() {
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        let mut detached = false;
        let (data, stored_revision, outcome) = match self.backend.read(T::KEY).await {
            Ok(Some(snapshot)) if snapshot.schema_version > T::SCHEMA_VERSION => {
                warn!(
                    key = T::KEY,
                    stored = snapshot.schema_version,
                    supported = T::SCHEMA_VERSION,
                    "Snapshot written by a newer schema, using defaults without persisting"
                );
                detached = true;
                (T::default(), snapshot.revision, LoadOutcome::Defaulted)
            }
            Ok(Some(snapshot)) => match snapshot.decode::<T>() {
                Ok(data) => (
                    data.normalize(),
                    snapshot.revision,
                    LoadOutcome::Restored {
                        revision: snapshot.revision,
                    },
                ),
                Err(e) => {
                    warn!(key = T::KEY, error = %e, "Snapshot is unreadable, using defaults");
                    (T::default(), snapshot.revision, LoadOutcome::Defaulted)
                }
            },
            Ok(None) => (T::default(), 0, LoadOutcome::Empty),
            Err(e) => {
                warn!(key = T::KEY, error = %e, "Failed to read snapshot, using defaults");
                (T::default(), 0, LoadOutcome::Defaulted)
            }
        };

        let mut inner = self.write_inner()?;
        if matches!(inner.phase, Phase::Ready(_)) {
            return Ok(LoadOutcome::AlreadyLoaded);
        }
        inner.phase = Phase::Ready(data);
        inner.revision = stored_revision.max(now_micros());
        inner.detached = detached;

        info!(
            key = T::KEY,
            backend = self.backend.backend_name(),
            ?outcome,
            "Store ready"
        );
        Ok(outcome)
    }

    /// Run a read-only closure against the document
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> AppResult<R> {
        let inner = self.read_inner()?;
        match &inner.phase {
            Phase::Ready(data) => Ok(f(data)),
            Phase::Loading => Err(not_ready::<T>()),
        }
    }

    /// Clone of the whole document
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub fn snapshot(&self) -> AppResult<T> {
        self.read(Clone::clone)
    }

    /// Apply a fallible mutation and flush the result
    ///
    /// Nothing is written when the closure fails or the state is detached.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading, or the closure's error.
    pub async fn try_update<R>(&self, f: impl FnOnce(&mut T) -> AppResult<R>) -> AppResult<R> {
        let (result, revision, captured) = {
            let mut guard = self.write_inner()?;
            let inner = &mut *guard;
            let Phase::Ready(data) = &mut inner.phase else {
                return Err(not_ready::<T>());
            };
            let result = f(data)?;
            if inner.detached {
                warn!(
                    key = T::KEY,
                    "Stored snapshot has a newer schema, change kept in memory only"
                );
                return Ok(result);
            }
            inner.revision += 1;
            let captured = Snapshot::capture(T::SCHEMA_VERSION, inner.revision, data);
            (result, inner.revision, captured)
        };

        match captured {
            Ok(snapshot) => self.flush(&snapshot).await,
            Err(e) => warn!(key = T::KEY, revision, error = %e, "Failed to capture snapshot"),
        }
        Ok(result)
    }

    /// Apply an infallible mutation and flush the result
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` while loading.
    pub async fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> AppResult<R> {
        self.try_update(|data| Ok(f(data))).await
    }

    async fn flush(&self, snapshot: &Snapshot) {
        match self.backend.write(T::KEY, snapshot).await {
            Ok(WriteOutcome::Applied) => {
                debug!(key = T::KEY, revision = snapshot.revision, "Snapshot flushed");
            }
            Ok(WriteOutcome::Superseded) => {
                debug!(
                    key = T::KEY,
                    revision = snapshot.revision,
                    "Snapshot superseded by a later flush"
                );
            }
            Err(e) => {
                warn!(
                    key = T::KEY,
                    revision = snapshot.revision,
                    error = %e,
                    "Failed to flush snapshot, keeping in-memory state"
                );
            }
        }
    }

    fn read_inner(&self) -> AppResult<RwLockReadGuard<'_, Inner<T>>> {
        self.inner
            .read()
            .map_err(|_| AppError::internal(format!("{} state lock poisoned", T::KEY)))
    }

    fn write_inner(&self) -> AppResult<RwLockWriteGuard<'_, Inner<T>>> {
        self.inner
            .write()
            .map_err(|_| AppError::internal(format!("{} state lock poisoned", T::KEY)))
    }
}

fn not_ready<T: SnapshotPayload>() -> AppError {
    AppError::unavailable(format!("{} is still loading", T::KEY))
}

fn now_micros() -> u64 {
    u64::try_from(Utc::now().timestamp_micros()).unwrap_or(0)
}
