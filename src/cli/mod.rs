//! CLI module for tspgen.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested.
//! `main` parses [`Args`], installs logging, and calls [`run_cli`].

mod args;
mod commands;
mod output;

pub use args::Args;
pub use commands::{run_cli, run_options};
pub use output::{format_report, print_report};
