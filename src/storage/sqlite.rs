// ABOUTME: SQLite snapshot backend built on sqlx with a single keyed snapshots table
// ABOUTME: Conditional upsert keeps the newest revision when writes complete out of order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use super::{Snapshot, SnapshotStore, WriteOutcome};
use crate::errors::{AppError, AppResult};

/// Snapshot store backed by a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteSnapshotStore {
    pool: SqlitePool,
}

impl SqliteSnapshotStore {
    /// Connect to `database_url` and run migrations
    ///
    /// `sqlite::memory:` opens a private in-memory database held by a single
    /// pooled connection. File databases (and their parent directory) are
    /// created when missing.
    ///
    /// # Errors
    ///
    /// Returns a database error if the connection or a migration fails.
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let pool = if database_url == "sqlite::memory:" {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(database_url)
                .await?
        } else {
            if let Some(parent) = database_url
                .strip_prefix("sqlite:")
                .map(Path::new)
                .and_then(Path::parent)
                .filter(|parent| !parent.as_os_str().is_empty())
            {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::storage(format!(
                        "Failed to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }

            // Ensure SQLite creates the database file if it doesn't exist
            let connection_options = if database_url.contains('?') {
                database_url.to_owned()
            } else {
                format!("{database_url}?mode=rwc")
            };
            SqlitePool::connect(&connection_options).await?
        };

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and run migrations
    ///
    /// # Errors
    ///
    /// Returns a database error if the migration fails.
    pub async fn from_pool(pool: SqlitePool) -> AppResult<Self> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the snapshots table
    ///
    /// # Errors
    ///
    /// Returns a database error if the statement fails.
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS snapshots (
                key TEXT PRIMARY KEY,
                schema_version INTEGER NOT NULL,
                revision INTEGER NOT NULL,
                payload TEXT NOT NULL,
                saved_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create snapshots table: {e}")))?;

        info!("Snapshot table ready");
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn read(&self, key: &str) -> AppResult<Option<Snapshot>> {
        let row = sqlx::query(
            r"
            SELECT schema_version, revision, payload, saved_at
            FROM snapshots
            WHERE key = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to read snapshot {key}: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let schema_version: i64 = row.try_get("schema_version")?;
        let revision: i64 = row.try_get("revision")?;
        let payload: String = row.try_get("payload")?;
        let saved_at_str: String = row.try_get("saved_at")?;

        let saved_at = DateTime::parse_from_rfc3339(&saved_at_str)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        Ok(Some(Snapshot {
            schema_version: u32::try_from(schema_version).map_err(|_| {
                AppError::storage(format!("Snapshot {key} has invalid schema version"))
            })?,
            revision: u64::try_from(revision)
                .map_err(|_| AppError::storage(format!("Snapshot {key} has invalid revision")))?,
            saved_at,
            data: serde_json::from_str(&payload)?,
        }))
    }

    async fn write(&self, key: &str, snapshot: &Snapshot) -> AppResult<WriteOutcome> {
        let revision = i64::try_from(snapshot.revision)
            .map_err(|_| AppError::storage(format!("Revision overflow for snapshot {key}")))?;
        let payload = serde_json::to_string(&snapshot.data)?;

        let result = sqlx::query(
            r"
            INSERT INTO snapshots (key, schema_version, revision, payload, saved_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(key) DO UPDATE SET
                schema_version = excluded.schema_version,
                revision = excluded.revision,
                payload = excluded.payload,
                saved_at = excluded.saved_at
            WHERE excluded.revision > snapshots.revision
            ",
        )
        .bind(key)
        .bind(i64::from(snapshot.schema_version))
        .bind(revision)
        .bind(&payload)
        .bind(snapshot.saved_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to write snapshot {key}: {e}")))?;

        if result.rows_affected() == 0 {
            debug!(key, revision, "Snapshot superseded by a newer revision");
            return Ok(WriteOutcome::Superseded);
        }
        Ok(WriteOutcome::Applied)
    }
}
