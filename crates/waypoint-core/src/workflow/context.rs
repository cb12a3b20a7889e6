//! Per-run execution context.
//!
//! An `ExecutionContext` lives for one invocation of a workflow function. It
//! hands out step sequence numbers and serializes access to the shared
//! checkpoint store. Nothing here is persisted: the sequence is rebuilt on
//! every run purely from the order in which steps are called.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use waypoint_types::error::RepositoryError;
use waypoint_types::step::{StepRecord, StepStatus};

use super::step::StepOptions;
use crate::repository::checkpoint::CheckpointStore;

/// State shared by every step of one workflow run.
///
/// Safe to share across tasks (`Arc<ExecutionContext<S>>`): the sequence is
/// atomic and store round trips are guarded by a single lock.
pub struct ExecutionContext<S> {
    workflow_id: String,
    sequence: AtomicU64,
    store: Arc<S>,
    /// Held for exactly one `get` or `save` round trip.
    store_lock: Mutex<()>,
    options: StepOptions,
}

impl<S: CheckpointStore> ExecutionContext<S> {
    /// Create a context for `workflow_id` with the sequence at zero.
    pub fn new(workflow_id: impl Into<String>, store: Arc<S>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            sequence: AtomicU64::new(0),
            store,
            store_lock: Mutex::new(()),
            options: StepOptions::default(),
        }
    }

    /// Replace the options applied to every `step` call of this run.
    pub fn with_options(mut self, options: StepOptions) -> Self {
        self.options = options;
        self
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    pub fn options(&self) -> &StepOptions {
        &self.options
    }

    /// Atomically advance the sequence and return the new value.
    ///
    /// The first call returns 1. Concurrent callers never observe the same
    /// value, but which caller gets which value depends on scheduling.
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) async fn load(&self, step_key: &str) -> Result<Option<StepRecord>, RepositoryError> {
        let _guard = self.store_lock.lock().await;
        self.store.get(&self.workflow_id, step_key).await
    }

    pub(crate) async fn record<T: Serialize + Sync>(
        &self,
        step_key: &str,
        output: &T,
    ) -> Result<(), RepositoryError> {
        let _guard = self.store_lock.lock().await;
        self.store
            .save(&self.workflow_id, step_key, StepStatus::Completed, output)
            .await
    }
}
