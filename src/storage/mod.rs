// ABOUTME: Snapshot persistence adapter: one JSON document per store under a fixed key
// ABOUTME: Defines the SnapshotStore contract and the revision rule shared by all backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Snapshot Persistence
//!
//! Each logical store (planning, settings, recipes) is persisted as a single
//! JSON document holding its full state. Documents are wrapped in a
//! [`Snapshot`] envelope tagged with a schema version and a revision.
//!
//! ## Revision rule
//!
//! Backends only accept a write whose revision is strictly greater than the
//! stored one. Writes issued by the same process carry increasing revisions,
//! so even if two flushes complete out of order the stored document
//! converges to the last-issued snapshot.

mod memory;
mod persisted;
mod sqlite;

pub use memory::MemorySnapshotStore;
pub use persisted::{LoadOutcome, PersistedState, SnapshotPayload};
pub use sqlite::SqliteSnapshotStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::environment::DatabaseUrl;
use crate::errors::AppResult;

/// Full-state document envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Version of the payload layout
    pub schema_version: u32,
    /// Monotonic write counter of the issuing store
    pub revision: u64,
    /// When the snapshot was captured
    pub saved_at: DateTime<Utc>,
    /// Full store payload
    pub data: serde_json::Value,
}

impl Snapshot {
    /// Capture the current state of a store
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the payload cannot be encoded.
    pub fn capture<T: Serialize>(schema_version: u32, revision: u64, data: &T) -> AppResult<Self> {
        Ok(Self {
            schema_version,
            revision,
            saved_at: Utc::now(),
            data: serde_json::to_value(data)?,
        })
    }

    /// Decode the payload, defaulting optional fields
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the payload does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> AppResult<T> {
        Ok(T::deserialize(&self.data)?)
    }
}

/// Result of a snapshot write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The snapshot replaced the stored document
    Applied,
    /// A snapshot with the same or a newer revision was already stored
    Superseded,
}

/// Durable key-value store of snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Short backend name for logs ("sqlite", "memory")
    fn backend_name(&self) -> &'static str;

    /// Read the snapshot stored under `key`
    async fn read(&self, key: &str) -> AppResult<Option<Snapshot>>;

    /// Store `snapshot` under `key` unless a newer revision is already stored
    async fn write(&self, key: &str, snapshot: &Snapshot) -> AppResult<WriteOutcome>;
}

/// Open the backend selected by the database URL
///
/// # Errors
///
/// Returns a database error if the SQLite database cannot be opened or migrated.
pub async fn open_snapshot_store(url: &DatabaseUrl) -> AppResult<Arc<dyn SnapshotStore>> {
    match url {
        DatabaseUrl::Memory => Ok(Arc::new(MemorySnapshotStore::new())),
        DatabaseUrl::SQLite { .. } => {
            let store = SqliteSnapshotStore::connect(&url.to_connection_string()).await?;
            Ok(Arc::new(store))
        }
    }
}
