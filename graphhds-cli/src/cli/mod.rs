//! Command-line interface for graph HDS runs.
//!
//! The `run` command loads a JSONL graph (plus an optional node mapping),
//! executes the clustering pipeline, and optionally writes the viewer
//! artifacts to an output directory.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, MeasureArg, PolicyArg, RunCommand, render_summary,
    run_cli,
};
