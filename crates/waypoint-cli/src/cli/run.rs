//! `wpt run`: execute or resume a demo workflow.

use std::time::Duration;

use console::style;
use uuid::Uuid;
use waypoint_core::workflow::runner::WorkflowRunner;
use waypoint_infra::config::zombie_delay;
use waypoint_infra::sqlite::checkpoint::SqliteCheckpointStore;
use waypoint_types::config::EngineConfig;

use super::WorkflowKind;
use crate::workflows::{self, DemoOptions};

const DEMO_PACE: Duration = Duration::from_millis(500);

/// Run `kind` under `workflow_id`, generating an id when none is given.
///
/// Ctrl+C (or SIGTERM) abandons the run mid-flight, leaving the store as a
/// crashed process would. Running the printed command resumes it.
pub async fn run_workflow(
    store: SqliteCheckpointStore,
    config: &EngineConfig,
    workflow_id: Option<String>,
    kind: WorkflowKind,
) -> anyhow::Result<()> {
    let workflow_id = workflow_id.unwrap_or_else(|| Uuid::now_v7().to_string());
    let options = DemoOptions {
        pace: DEMO_PACE,
        zombie_delay: zombie_delay(config),
    };

    println!();
    println!(
        "  {} Running {} workflow '{}'",
        style("▶").green().bold(),
        style(kind).bold(),
        style(&workflow_id).cyan(),
    );
    println!("     Press Ctrl+C to simulate a crash.");
    println!();

    let runner = WorkflowRunner::new(store);

    let outcome = tokio::select! {
        result = dispatch(&runner, &workflow_id, kind, options) => Some(result),
        () = shutdown_signal() => None,
    };

    let result = match outcome {
        Some(Ok(())) => {
            println!();
            println!(
                "  {} Workflow '{}' completed",
                style("✓").green().bold(),
                style(&workflow_id).cyan(),
            );
            println!();
            Ok(())
        }
        Some(Err(e)) => {
            println!();
            println!(
                "  {} Workflow '{}' failed: {e:#}",
                style("✗").red().bold(),
                style(&workflow_id).cyan(),
            );
            println!();
            Err(e)
        }
        None => {
            println!();
            println!(
                "  {} Interrupted. Completed steps are saved; resume with:",
                style("!").yellow().bold(),
            );
            println!("     wpt run {workflow_id} --kind {kind}");
            println!();
            Ok(())
        }
    };

    runner.close().await?;
    result
}

async fn dispatch(
    runner: &WorkflowRunner<SqliteCheckpointStore>,
    workflow_id: &str,
    kind: WorkflowKind,
    options: DemoOptions,
) -> anyhow::Result<()> {
    match kind {
        WorkflowKind::Onboarding => {
            runner
                .run(workflow_id, |ctx| workflows::onboarding::run(ctx, options))
                .await
        }
        WorkflowKind::Loop => {
            runner
                .run(workflow_id, |ctx| workflows::loop_demo::run(ctx, options))
                .await
        }
        WorkflowKind::Conditional => {
            runner
                .run(workflow_id, |ctx| workflows::conditional::run(ctx, options))
                .await
        }
        WorkflowKind::Zombie => {
            runner
                .run(workflow_id, |ctx| workflows::zombie::run(ctx, options))
                .await
        }
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
