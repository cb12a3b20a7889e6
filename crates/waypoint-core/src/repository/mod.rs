//! Checkpoint store trait and an in-memory implementation.
//!
//! `waypoint-infra` provides the SQLite-backed store.

pub mod checkpoint;
pub mod memory;
