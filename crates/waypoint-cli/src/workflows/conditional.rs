use std::sync::Arc;

use waypoint_core::repository::checkpoint::CheckpointStore;
use waypoint_core::workflow::context::ExecutionContext;

use super::DemoOptions;

/// Branches on a recorded decision. On resume the decision replays from the
/// store, so the branch that was not taken never runs.
pub async fn run<S: CheckpointStore + 'static>(
    ctx: Arc<ExecutionContext<S>>,
    options: DemoOptions,
) -> anyhow::Result<()> {
    println!("  🔀 Conditional workflow");

    let pace = options.pace;
    let condition = ctx
        .step("check_condition", move || async move {
            tokio::time::sleep(pace).await;
            println!("    🤔 Evaluating condition...");
            Ok::<_, anyhow::Error>(true)
        })
        .await?;

    if condition {
        ctx.step("true_branch", move || async move {
            tokio::time::sleep(pace).await;
            println!("    ✓ [TRUE PATH] executed");
            Ok::<_, anyhow::Error>("true_executed".to_string())
        })
        .await?;
    } else {
        ctx.step("false_branch", move || async move {
            tokio::time::sleep(pace).await;
            println!("    ✓ [FALSE PATH] executed");
            Ok::<_, anyhow::Error>("false_executed".to_string())
        })
        .await?;
    }

    Ok(())
}
