//! Shared types for the Waypoint durable execution engine.
//!
//! Step records, engine configuration, and the error taxonomy used by the
//! store and the step protocol.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, thiserror.

pub mod config;
pub mod error;
pub mod step;
