//! `wpt steps`: inspect the checkpoint records of a run.

use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use waypoint_core::repository::checkpoint::CheckpointStore;
use waypoint_infra::sqlite::checkpoint::SqliteCheckpointStore;
use waypoint_types::step::StepRecord;

const OUTPUT_PREVIEW: usize = 60;

/// Print every recorded step of `workflow_id` in invocation order.
pub async fn list_steps(
    store: SqliteCheckpointStore,
    workflow_id: &str,
    json: bool,
) -> anyhow::Result<()> {
    let listed = store.list(workflow_id).await;
    store.close().await?;
    let records = listed?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!();
        println!(
            "  {} No steps recorded for '{}'.",
            style("i").blue().bold(),
            style(workflow_id).cyan(),
        );
        println!("     Start it with: wpt run {workflow_id}");
        println!();
        return Ok(());
    }

    println!();
    println!(
        "  Steps for '{}' ({} recorded)",
        style(workflow_id).cyan(),
        records.len(),
    );
    println!();
    println!("{}", render_table(&records));
    println!();

    Ok(())
}

fn render_table(records: &[StepRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Step Key").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Output").fg(Color::White),
    ]);

    for record in records {
        let status_color = if record.is_completed() {
            Color::Green
        } else {
            Color::Yellow
        };
        table.add_row(vec![
            Cell::new(&record.step_key).fg(Color::Cyan),
            Cell::new(&record.status).fg(status_color),
            Cell::new(preview(&record.output)).fg(Color::DarkGrey),
        ]);
    }

    table
}

fn preview(output: &str) -> String {
    if output.chars().count() > OUTPUT_PREVIEW {
        let head: String = output.chars().take(OUTPUT_PREVIEW - 3).collect();
        format!("{head}...")
    } else {
        output.to_string()
    }
}
