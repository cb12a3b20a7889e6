use std::sync::Arc;

use console::style;
use waypoint_core::repository::checkpoint::CheckpointStore;
use waypoint_core::workflow::context::ExecutionContext;
use waypoint_core::workflow::step::StepOptions;

use super::DemoOptions;

/// Crash-before-save scenario.
///
/// `zombie_step` pauses between running and saving. Killing the process in
/// that window leaves it unrecorded, so the next run executes it again and
/// then continues with `step_after_zombie`.
pub async fn run<S: CheckpointStore + 'static>(
    ctx: Arc<ExecutionContext<S>>,
    options: DemoOptions,
) -> anyhow::Result<()> {
    println!("  💀 Zombie step workflow");

    let pace = options.pace;
    ctx.step("step_before_zombie", move || async move {
        tokio::time::sleep(pace).await;
        println!("    ✓ Setup step completed normally");
        Ok::<_, anyhow::Error>("ok".to_string())
    })
    .await?;

    println!(
        "  {} Next step waits {}s before saving. Press Ctrl+C during the wait.",
        style("⚠").yellow().bold(),
        options.zombie_delay.as_secs()
    );
    let zombie = StepOptions::default().with_persist_delay(options.zombie_delay);
    ctx.step_with("zombie_step", &zombie, move || async move {
        tokio::time::sleep(pace).await;
        println!("    💀 Zombie step executed, save pending...");
        Ok::<_, anyhow::Error>("I am alive".to_string())
    })
    .await?;

    ctx.step("step_after_zombie", move || async move {
        tokio::time::sleep(pace).await;
        println!("    ✓ Recovery successful: final step executed");
        Ok::<_, anyhow::Error>("done".to_string())
    })
    .await?;

    Ok(())
}
