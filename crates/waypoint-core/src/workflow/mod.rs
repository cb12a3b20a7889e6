//! Workflow execution: per-run context, the step replay protocol, and the
//! runner that binds a workflow id to a workflow function.
//!
//! - `context` -- sequence generation and serialized store access
//! - `step` -- replay-check, execute, persist
//! - `runner` -- creates a fresh context per run and reports the outcome

pub mod context;
pub mod runner;
pub mod step;
