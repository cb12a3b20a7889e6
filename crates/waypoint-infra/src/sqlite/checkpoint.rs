//! SQLite checkpoint store implementation.
//!
//! Implements `CheckpointStore` from `waypoint-core` using sqlx with split
//! read/write pools. Step results are stored as JSON text in the `steps`
//! table and upserted on `(workflow_id, step_key)`.

use std::path::Path;

use serde::Serialize;
use sqlx::Row;
use waypoint_core::repository::checkpoint::{encode_output, CheckpointStore};
use waypoint_types::error::RepositoryError;
use waypoint_types::step::{sort_by_sequence, StepRecord, StepStatus};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `CheckpointStore`.
pub struct SqliteCheckpointStore {
    pool: DatabasePool,
}

impl SqliteCheckpointStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database file at `path` and wrap it.
    pub async fn open(path: &Path) -> Result<Self, RepositoryError> {
        let pool = DatabasePool::new(path)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }
}

// ---------------------------------------------------------------------------
// Internal row type
// ---------------------------------------------------------------------------

struct StepRow {
    workflow_id: String,
    step_key: String,
    status: String,
    output: String,
}

impl StepRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            workflow_id: row.try_get("workflow_id")?,
            step_key: row.try_get("step_key")?,
            status: row.try_get("status")?,
            output: row.try_get("output")?,
        })
    }

    fn into_record(self) -> StepRecord {
        StepRecord {
            workflow_id: self.workflow_id,
            step_key: self.step_key,
            status: self.status,
            output: self.output,
        }
    }
}

fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            tracing::warn!(error = %e, "checkpoint database unavailable");
            RepositoryError::Connection
        }
        _ => RepositoryError::Query(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CheckpointStore impl
// ---------------------------------------------------------------------------

impl CheckpointStore for SqliteCheckpointStore {
    async fn get(
        &self,
        workflow_id: &str,
        step_key: &str,
    ) -> Result<Option<StepRecord>, RepositoryError> {
        let row = sqlx::query(
            "SELECT workflow_id, step_key, status, output FROM steps WHERE workflow_id = ? AND step_key = ?",
        )
        .bind(workflow_id)
        .bind(step_key)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => {
                let r = StepRow::from_row(&row).map_err(map_sqlx_error)?;
                Ok(Some(r.into_record()))
            }
            None => Ok(None),
        }
    }

    async fn save<T: Serialize + Sync>(
        &self,
        workflow_id: &str,
        step_key: &str,
        status: StepStatus,
        output: &T,
    ) -> Result<(), RepositoryError> {
        let output_json = encode_output(output)?;

        sqlx::query(
            r#"INSERT INTO steps (workflow_id, step_key, status, output)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(workflow_id, step_key) DO UPDATE SET
                 status = excluded.status,
                 output = excluded.output"#,
        )
        .bind(workflow_id)
        .bind(step_key)
        .bind(status.as_str())
        .bind(output_json)
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_error)?;

        tracing::debug!(workflow_id, step_key, "saved step checkpoint");
        Ok(())
    }

    async fn list(&self, workflow_id: &str) -> Result<Vec<StepRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT workflow_id, step_key, status, output FROM steps WHERE workflow_id = ?",
        )
        .bind(workflow_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let r = StepRow::from_row(row).map_err(map_sqlx_error)?;
            records.push(r.into_record());
        }
        sort_by_sequence(&mut records);
        Ok(records)
    }

    async fn close(&self) -> Result<(), RepositoryError> {
        self.pool.close().await;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
