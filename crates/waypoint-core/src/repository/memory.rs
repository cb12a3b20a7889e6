//! In-memory checkpoint store.
//!
//! Backed by a `DashMap`, so records live only as long as the store. Useful
//! for tests and for embedding the engine where durability is not needed.

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use serde::Serialize;
use waypoint_types::error::RepositoryError;
use waypoint_types::step::{sort_by_sequence, StepRecord, StepStatus};

use super::checkpoint::{encode_output, CheckpointStore};

/// `CheckpointStore` keeping records in a concurrent hash map.
///
/// After `close`, every operation fails with `RepositoryError::Connection`,
/// matching the behavior of a closed database pool.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    records: DashMap<(String, String), StepRecord>,
    closed: AtomicBool,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records across all workflows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Overwrite a record verbatim, bypassing serialization.
    pub fn insert_raw(&self, record: StepRecord) {
        self.records.insert(
            (record.workflow_id.clone(), record.step_key.clone()),
            record,
        );
    }

    fn ensure_open(&self) -> Result<(), RepositoryError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RepositoryError::Connection);
        }
        Ok(())
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    async fn get(
        &self,
        workflow_id: &str,
        step_key: &str,
    ) -> Result<Option<StepRecord>, RepositoryError> {
        self.ensure_open()?;
        let key = (workflow_id.to_string(), step_key.to_string());
        Ok(self.records.get(&key).map(|entry| entry.value().clone()))
    }

    async fn save<T: Serialize + Sync>(
        &self,
        workflow_id: &str,
        step_key: &str,
        status: StepStatus,
        output: &T,
    ) -> Result<(), RepositoryError> {
        self.ensure_open()?;
        let output = encode_output(output)?;
        self.insert_raw(StepRecord {
            workflow_id: workflow_id.to_string(),
            step_key: step_key.to_string(),
            status: status.as_str().to_string(),
            output,
        });
        Ok(())
    }

    async fn list(&self, workflow_id: &str) -> Result<Vec<StepRecord>, RepositoryError> {
        self.ensure_open()?;
        let mut records: Vec<StepRecord> = self
            .records
            .iter()
            .filter(|entry| entry.key().0 == workflow_id)
            .map(|entry| entry.value().clone())
            .collect();
        sort_by_sequence(&mut records);
        Ok(records)
    }

    async fn close(&self) -> Result<(), RepositoryError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
