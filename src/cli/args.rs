//! CLI argument parsing.
//!
//! Every flag is optional; unset flags fall through to the YAML file given
//! with `--config`, and from there to the built-in defaults.

use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

use crate::config::Options;
use crate::error::GraphResult;
use crate::graph::NodeId;

/// Random TSP graph generator with an external solver bridge
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "tspgen", version)]
#[command(about = "Generate random TSP graphs, run a solver, and render the route", long_about = None)]
pub struct Args {
    /// Number of nodes
    #[arg(short = 'n', long)]
    pub nodes: Option<usize>,

    /// Upper weight bound (exclusive)
    #[arg(long)]
    pub max_weight: Option<f64>,

    /// Lower weight bound (symmetrical mode)
    #[arg(long)]
    pub min_weight: Option<f64>,

    /// Use the same weight in both directions of every pair
    #[arg(short, long)]
    pub symmetrical: bool,

    /// Base path of the generated files, without extension
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Force the 0 -> 1 -> ... -> 0 cycle to unit weights
    #[arg(short, long)]
    pub debug: bool,

    /// Run the external solver on the graph
    #[arg(short, long)]
    pub run: bool,

    /// File listing the compute nodes
    #[arg(long)]
    pub compute_nodes: Option<PathBuf>,

    /// Processes per compute node
    #[arg(short, long)]
    pub processes: Option<usize>,

    /// Reuse the existing graph record instead of generating one
    #[arg(long)]
    pub dont_generate: bool,

    /// Render this route (node ids in visiting order)
    #[arg(long, num_args = 1.., value_name = "ID")]
    pub save_result: Option<Vec<NodeId>>,

    /// Master seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// YAML options file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Solver executable
    #[arg(long)]
    pub solver_program: Option<PathBuf>,

    /// Parallel launcher executable
    #[arg(long)]
    pub launcher: Option<String>,

    /// Helper that lists the compute nodes for the launcher
    #[arg(long, conflicts_with = "no_node_discovery")]
    pub node_discovery: Option<String>,

    /// Skip compute-node discovery
    #[arg(long)]
    pub no_node_discovery: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Tracing level for `--log-level`; unknown names fall back to `INFO`.
    #[must_use]
    pub fn log_level(&self) -> Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Resolve the options snapshot: defaults, then `--config`, then flags.
    ///
    /// # Errors
    ///
    /// Returns error if the YAML file cannot be loaded or the merged
    /// options fail validation.
    pub fn resolve(&self) -> GraphResult<Options> {
        let mut options = match &self.config {
            Some(path) => Options::load(path)?,
            None => Options::default(),
        };
        self.apply(&mut options);
        options.check()?;
        Ok(options)
    }

    fn apply(&self, options: &mut Options) {
        let generation = &mut options.generation;
        if let Some(nodes) = self.nodes {
            generation.nodes = nodes;
        }
        if let Some(max) = self.max_weight {
            generation.max_weight = max;
        }
        if let Some(min) = self.min_weight {
            generation.min_weight = min;
        }
        if self.seed.is_some() {
            generation.seed = self.seed;
        }
        generation.symmetrical |= self.symmetrical;
        generation.debug |= self.debug;

        let run = &mut options.run;
        if let Some(output) = &self.output {
            run.output.clone_from(output);
        }
        if self.dont_generate {
            run.generate = false;
        }
        run.run_solver |= self.run;
        if self.save_result.is_some() {
            run.route.clone_from(&self.save_result);
        }

        let solver = &mut run.solver;
        if let Some(path) = &self.compute_nodes {
            solver.compute_nodes.clone_from(path);
        }
        if let Some(p) = self.processes {
            solver.processes = p;
        }
        if let Some(program) = &self.solver_program {
            solver.program.clone_from(program);
        }
        if let Some(launcher) = &self.launcher {
            solver.launcher.clone_from(launcher);
        }
        if self.no_node_discovery {
            solver.node_discovery = None;
        } else if self.node_discovery.is_some() {
            solver.node_discovery.clone_from(&self.node_discovery);
        }
    }
}
