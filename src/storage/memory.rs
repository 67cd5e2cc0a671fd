// ABOUTME: In-memory snapshot backend used for tests and ephemeral deployments
// ABOUTME: Applies the same newer-revision-wins rule as the SQLite backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{Snapshot, SnapshotStore, WriteOutcome};
use crate::errors::AppResult;

/// Snapshot store kept in process memory
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: DashMap<String, Snapshot>,
}

impl MemorySnapshotStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been written yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, key: &str) -> AppResult<Option<Snapshot>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn write(&self, key: &str, snapshot: &Snapshot) -> AppResult<WriteOutcome> {
        match self.entries.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().revision >= snapshot.revision {
                    return Ok(WriteOutcome::Superseded);
                }
                occupied.insert(snapshot.clone());
            }
            Entry::Vacant(vacant) => {
                vacant.insert(snapshot.clone());
            }
        }
        Ok(WriteOutcome::Applied)
    }
}
