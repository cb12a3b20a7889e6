//! Engine configuration types.
//!
//! `EngineConfig` represents the optional `config.toml` in the data
//! directory. All fields have defaults, so an empty file is valid.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the engine and the `wpt` binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// SQLite file name, relative to the data directory.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Seconds the zombie demo waits between running its step and saving it.
    #[serde(default = "default_zombie_delay_secs")]
    pub zombie_delay_secs: u64,
}

fn default_database_file() -> String {
    "workflow.db".to_string()
}

fn default_zombie_delay_secs() -> u64 {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
            zombie_delay_secs: default_zombie_delay_secs(),
        }
    }
}
