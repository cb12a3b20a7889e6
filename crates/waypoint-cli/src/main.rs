//! Waypoint CLI entry point.
//!
//! Binary name: `wpt`
//!
//! Parses CLI arguments, opens the checkpoint store in the data directory,
//! then dispatches to the appropriate command handler.

mod cli;
mod workflows;

use anyhow::Context;
use clap::Parser;

use cli::{Cli, Commands};
use waypoint_infra::config::{database_path, load_engine_config};
use waypoint_infra::sqlite::checkpoint::SqliteCheckpointStore;
use waypoint_infra::sqlite::pool::default_data_dir;
use waypoint_observe::tracing_setup::{init_tracing, shutdown_tracing, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = log_filter(cli.verbose, cli.quiet);
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(filter, format, cli.otel).map_err(|e| anyhow::anyhow!(e))?;

    // Shell completions don't need the store
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        clap_complete::generate(*shell, &mut cmd, "wpt", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    tokio::fs::create_dir_all(&data_dir)
        .await
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let config = load_engine_config(&data_dir).await;
    let db_path = database_path(&data_dir, &config);
    let store = SqliteCheckpointStore::open(&db_path)
        .await
        .with_context(|| format!("failed to open checkpoint store at {}", db_path.display()))?;

    let result = match cli.command {
        Commands::Run { workflow_id, kind } => {
            cli::run::run_workflow(store, &config, workflow_id, kind).await
        }
        Commands::Steps { workflow_id, json } => {
            cli::steps::list_steps(store, &workflow_id, json).await
        }
        Commands::Completions { .. } => unreachable!("handled before the store is opened"),
    };

    shutdown_tracing();
    result
}

/// Map `-v`/`-q` to filter directives. Step execution and replay events are
/// shown by default.
fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn,waypoint_core=info",
        1 => "info,waypoint_core=debug,waypoint_infra=debug",
        _ => "trace",
    }
}
