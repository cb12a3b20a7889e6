//! CLI command definitions for the `wpt` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod run;
pub mod steps;

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Run durable workflows that survive process crashes.
#[derive(Parser)]
#[command(name = "wpt", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding `config.toml` and the checkpoint database
    /// (defaults to $WAYPOINT_DATA_DIR, then the current directory).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a demo workflow, or resume it if WORKFLOW_ID was used before.
    ///
    /// Press Ctrl+C mid-run to simulate a crash, then run the same command
    /// again to resume from the last saved step.
    Run {
        /// Identifier of the run. A new one is generated when omitted.
        workflow_id: Option<String>,

        /// Which demo workflow to run.
        #[arg(short, long, value_enum, default_value_t = WorkflowKind::Onboarding)]
        kind: WorkflowKind,
    },

    /// Show the recorded steps of a workflow run.
    #[command(alias = "ls")]
    Steps {
        /// Identifier of the run to inspect.
        workflow_id: String,

        /// Output machine-readable JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: clap_complete::Shell,
    },
}

/// Demo workflows shipped with the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WorkflowKind {
    /// Employee onboarding with parallel provisioning.
    Onboarding,
    /// Same step name repeated inside a loop.
    Loop,
    /// If/else branching on a recorded decision.
    Conditional,
    /// Crash-before-save recovery.
    Zombie,
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowKind::Onboarding => "onboarding",
            WorkflowKind::Loop => "loop",
            WorkflowKind::Conditional => "conditional",
            WorkflowKind::Zombie => "zombie",
        };
        f.write_str(name)
    }
}
