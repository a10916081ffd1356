//! CLI command handlers.

use std::process::ExitCode;

use tracing::{error, info, warn};

use super::output::print_report;
use super::Args;
use crate::config::Options;
use crate::error::GraphResult;
use crate::pipeline::{Pipeline, PipelineReport};

/// Main CLI entry point.
///
/// Returns `SUCCESS` when every stage completed, `FAILURE` (exit code 1)
/// otherwise.
#[must_use]
pub fn run_cli(args: &Args) -> ExitCode {
    let result = args.resolve().and_then(|options| run_options(&options));
    match result {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            if e.is_inconsistency() {
                warn!("route and stored graph disagree; regenerate the graph or rerun the solver");
            }
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run the pipeline for a resolved options snapshot.
///
/// # Errors
///
/// Propagates the first failing stage.
pub fn run_options(options: &Options) -> GraphResult<PipelineReport> {
    info!(
        nodes = options.generation.nodes,
        symmetrical = options.generation.symmetrical,
        output = %options.run.output.display(),
        "starting tspgen v{} ({})",
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_HASH").unwrap_or("unknown")
    );
    Pipeline::new(options).run()
}
