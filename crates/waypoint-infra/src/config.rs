//! Engine configuration loader.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`EngineConfig`]. Falls back to defaults when the file is missing or
//! malformed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use waypoint_types::config::EngineConfig;

/// Load engine configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`EngineConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_engine_config(data_dir: &Path) -> EngineConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return EngineConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return EngineConfig::default();
        }
    };

    match toml::from_str::<EngineConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            EngineConfig::default()
        }
    }
}

/// Absolute or data-dir-relative path of the checkpoint database.
pub fn database_path(data_dir: &Path, config: &EngineConfig) -> PathBuf {
    data_dir.join(&config.database_file)
}

/// Persist delay used by the zombie demo step.
pub fn zombie_delay(config: &EngineConfig) -> Duration {
    Duration::from_secs(config.zombie_delay_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_engine_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_engine_config(tmp.path()).await;
        assert_eq!(config.database_file, "workflow.db");
        assert_eq!(config.zombie_delay_secs, 3);
    }

    #[tokio::test]
    async fn load_engine_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            "database_file = \"runs.db\"\nzombie_delay_secs = 1\n",
        )
        .await
        .unwrap();

        let config = load_engine_config(tmp.path()).await;
        assert_eq!(config.database_file, "runs.db");
        assert_eq!(zombie_delay(&config), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn load_engine_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_engine_config(tmp.path()).await;
        assert_eq!(config.database_file, "workflow.db");
    }

    #[test]
    fn database_path_joins_data_dir() {
        let config = EngineConfig::default();
        let path = database_path(Path::new("/var/lib/waypoint"), &config);
        assert_eq!(path, PathBuf::from("/var/lib/waypoint/workflow.db"));
    }
}
