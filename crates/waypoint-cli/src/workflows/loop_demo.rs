use std::sync::Arc;

use waypoint_core::repository::checkpoint::CheckpointStore;
use waypoint_core::workflow::context::ExecutionContext;

use super::DemoOptions;

/// Runs the same step name three times. The sequence suffix keeps the
/// iterations apart: `loop_step_1`, `loop_step_2`, `loop_step_3`.
pub async fn run<S: CheckpointStore + 'static>(
    ctx: Arc<ExecutionContext<S>>,
    options: DemoOptions,
) -> anyhow::Result<()> {
    println!("  🔁 Loop workflow: one step name, three iterations");

    let pace = options.pace;
    for i in 1..=3u32 {
        let result = ctx
            .step("loop_step", move || async move {
                tokio::time::sleep(pace).await;
                println!("    ⚙️  Doing work for iteration {i}...");
                Ok::<_, anyhow::Error>(i * 10)
            })
            .await?;
        println!("    → Result: {result}");
    }

    Ok(())
}
