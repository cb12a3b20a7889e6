//! Checkpoint store trait definition.
//!
//! Maps `(workflow_id, step_key)` to a completed step result. The store knows
//! nothing about workflows or concurrency; callers serialize access.

use serde::Serialize;
use waypoint_types::error::RepositoryError;
use waypoint_types::step::{StepRecord, StepStatus};

/// Durable mapping from `(workflow_id, step_key)` to a step result.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait CheckpointStore: Send + Sync {
    /// Fetch the record for a step, or `None` if it has never been saved.
    ///
    /// A missing record is not an error; `Err` means the lookup itself failed.
    fn get(
        &self,
        workflow_id: &str,
        step_key: &str,
    ) -> impl std::future::Future<Output = Result<Option<StepRecord>, RepositoryError>> + Send;

    /// Serialize `output` and upsert it under `(workflow_id, step_key)`.
    ///
    /// A later save for the same pair replaces the earlier record. Once this
    /// returns `Ok`, the record is visible to `get` on the same store.
    fn save<T: Serialize + Sync>(
        &self,
        workflow_id: &str,
        step_key: &str,
        status: StepStatus,
        output: &T,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// All records of a workflow run, in invocation order (by the sequence
    /// number suffix of the step key).
    fn list(
        &self,
        workflow_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<StepRecord>, RepositoryError>> + Send;

    /// Release underlying resources. Called once at shutdown.
    fn close(&self) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// Encode a step result as the JSON text stored in the `output` column.
pub fn encode_output<T: Serialize + ?Sized>(output: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(output)
        .map_err(|e| RepositoryError::Serialization(format!("serialize step output: {e}")))
}
