//! Durable execution core for Waypoint.
//!
//! This crate defines the checkpoint store trait (the "port" the
//! infrastructure layer implements) and the replay protocol built on it.
//! It depends only on `waypoint-types` -- never on `waypoint-infra` or any
//! database crate.

pub mod repository;
pub mod workflow;
