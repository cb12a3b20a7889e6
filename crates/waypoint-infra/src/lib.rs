//! Infrastructure layer for Waypoint.
//!
//! Implements the `CheckpointStore` trait from `waypoint-core` on SQLite and
//! loads engine configuration from the data directory.

pub mod config;
pub mod sqlite;
