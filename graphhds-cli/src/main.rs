//! `graphhds` binary.
//!
//! Parses arguments, runs the pipeline, and prints the summary to stdout.
//! Failures are logged with their stable error codes before exiting with a
//! non-zero status.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use graphhds_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(cli).context("graph HDS run failed")?;
    let mut writer = BufWriter::new(io::stdout().lock());
    render_summary(&summary, &mut writer).context("failed to render summary")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let core = err
            .downcast_ref::<CliError>()
            .and_then(CliError::core_error);
        let code = core.map(|core| field::display(core.code().as_str()));
        let graph_code = core
            .and_then(|core| core.graph_code())
            .map(|code| field::display(code.as_str()));

        let message = format!("{err:#}");
        error!(
            error = message.as_str(),
            code,
            graph_code,
            "command execution failed"
        );
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[expect(
    clippy::print_stderr,
    reason = "logging is unavailable when its own set-up fails"
)]
fn report_logging_error(err: &LoggingError) {
    eprintln!("failed to initialise logging: {err}");
}
