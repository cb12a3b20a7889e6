//! Durable step records.
//!
//! A `StepRecord` is written once a step completes and its result has been
//! persisted. No record means the step has not completed yet.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a persisted step.
///
/// Only `Completed` is ever written; running or failed steps leave no trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Completed => "completed",
        }
    }

    /// Parse the stored column value. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(StepStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the `steps` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub workflow_id: String,
    pub step_key: String,
    /// Raw status column. Unrecognized values read as not completed.
    pub status: String,
    /// JSON encoding of the step result.
    pub output: String,
}

impl StepRecord {
    /// Whether this record marks the step as done.
    pub fn is_completed(&self) -> bool {
        StepStatus::parse(&self.status) == Some(StepStatus::Completed)
    }
}

/// Build the deterministic key for a step invocation.
///
/// The key joins the caller-chosen name with the invocation's sequence
/// number, so the same name used inside a loop yields one key per iteration.
pub fn step_key(name: &str, sequence: u64) -> String {
    format!("{name}_{sequence}")
}

/// Sequence number encoded in a step key, if the key has one.
pub fn key_sequence(step_key: &str) -> Option<u64> {
    step_key.rsplit_once('_')?.1.parse().ok()
}

/// Order records the way their steps were invoked: by sequence number, then
/// by key for records without one.
pub fn sort_by_sequence(records: &mut [StepRecord]) {
    records.sort_by(|a, b| {
        key_sequence(&a.step_key)
            .cmp(&key_sequence(&b.step_key))
            .then_with(|| a.step_key.cmp(&b.step_key))
    });
}
