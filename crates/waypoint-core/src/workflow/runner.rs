//! Top-level workflow runner.
//!
//! Binds a workflow id and a workflow function to a fresh
//! [`ExecutionContext`]. Running the same id again with the same function
//! is how an interrupted run resumes: completed steps replay, the rest
//! execute.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::Instrument;
use waypoint_types::error::RepositoryError;

use super::context::ExecutionContext;
use super::step::StepOptions;
use crate::repository::checkpoint::CheckpointStore;

/// Runs workflow functions against a shared checkpoint store.
///
/// Generic over `S: CheckpointStore` so it works with any storage backend
/// (SQLite, in-memory, etc.).
pub struct WorkflowRunner<S> {
    store: Arc<S>,
    options: StepOptions,
}

impl<S: CheckpointStore> WorkflowRunner<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            options: StepOptions::default(),
        }
    }

    /// Options handed to every context this runner creates.
    pub fn with_step_options(mut self, options: StepOptions) -> Self {
        self.options = options;
        self
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run `workflow` under `workflow_id`.
    ///
    /// A new context with its sequence at zero is created for every call.
    /// The workflow's error is returned unmodified.
    pub async fn run<F, Fut, E>(&self, workflow_id: &str, workflow: F) -> Result<(), E>
    where
        F: FnOnce(Arc<ExecutionContext<S>>) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: fmt::Display,
    {
        let ctx = ExecutionContext::new(workflow_id, Arc::clone(&self.store))
            .with_options(self.options.clone());

        tracing::info!(workflow_id, "starting workflow");

        let span = tracing::info_span!("workflow", workflow_id);
        match workflow(Arc::new(ctx)).instrument(span).await {
            Ok(()) => {
                tracing::info!(workflow_id, "workflow completed");
                Ok(())
            }
            Err(e) => {
                tracing::error!(workflow_id, error = %e, "workflow failed");
                Err(e)
            }
        }
    }

    /// Close the store. Consumes the runner so it cannot be closed twice.
    pub async fn close(self) -> Result<(), RepositoryError> {
        self.store.close().await
    }
}
