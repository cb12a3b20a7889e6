//! Demo workflows driven by `wpt run`.
//!
//! Each workflow prints from inside its step operations, so a resumed run
//! visibly skips the steps that already completed.

pub mod conditional;
pub mod loop_demo;
pub mod onboarding;
pub mod zombie;

use std::time::Duration;

/// Timing knobs shared by the demos.
#[derive(Debug, Clone, Copy)]
pub struct DemoOptions {
    /// Base duration of simulated work inside a step.
    pub pace: Duration,
    /// How long the zombie step waits between running and saving.
    pub zombie_delay: Duration,
}

impl DemoOptions {
    /// No simulated work and no zombie window.
    #[cfg(test)]
    pub fn instant() -> Self {
        Self {
            pace: Duration::ZERO,
            zombie_delay: Duration::ZERO,
        }
    }
}
