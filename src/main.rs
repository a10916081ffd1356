//! tspgen CLI - random TSP graph generator
//!
//! Generates a graph, optionally runs the external solver, and renders the
//! resulting route.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::FmtSubscriber;

use tspgen::cli::{run_cli, Args};

fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error: failed to install logger: {e}");
        return ExitCode::FAILURE;
    }

    run_cli(&args)
}
