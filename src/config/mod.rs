//! Run options with YAML schema and validation.
//!
//! Options are resolved once at startup (defaults, then an optional YAML
//! file, then command-line flags) and then passed by reference to every
//! stage. Nothing mutates them afterwards.
//!
//! # Example YAML
//!
//! ```yaml
//! generation:
//!   nodes: 12
//!   min_weight: 10
//!   max_weight: 200
//!   symmetrical: true
//!   seed: 42
//! run:
//!   output: ./instances/sym12
//!   run_solver: true
//!   solver:
//!     processes: 4
//!     compute_nodes: ./nodes
//! ```

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{GraphError, GraphResult};
use crate::graph::generator::MIN_NODES;
use crate::graph::NodeId;

/// Extension of persisted graph records.
pub const GRAPH_EXTENSION: &str = ".g";
/// Suffix of the full-graph image.
pub const GRAPH_IMAGE_SUFFIX: &str = ".png";
/// Suffix of the route image.
pub const ROUTE_IMAGE_SUFFIX: &str = "_res.png";

/// Complete options snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Graph generation parameters.
    #[validate(nested)]
    #[serde(default)]
    pub generation: GenerationOptions,

    /// Output, solver, and route parameters.
    #[validate(nested)]
    #[serde(default)]
    pub run: RunOptions,
}

impl Options {
    /// Load options from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> GraphResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse options from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> GraphResult<Self> {
        let options: Self = serde_yaml::from_str(yaml)?;
        options.check()?;
        Ok(options)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> GraphResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Schema and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for range violations, `InvalidTopology` for too
    /// few nodes, and `Config` for inconsistent weight bounds.
    pub fn check(&self) -> GraphResult<()> {
        self.validate()?;
        self.generation.validate_semantic()
    }

    /// Path of the persisted graph record (`<output>.g`).
    #[must_use]
    pub fn graph_path(&self) -> PathBuf {
        with_suffix(&self.run.output, GRAPH_EXTENSION)
    }

    /// Path of the full-graph image (`<output>.png`).
    #[must_use]
    pub fn graph_image_path(&self) -> PathBuf {
        with_suffix(&self.run.output, GRAPH_IMAGE_SUFFIX)
    }

    /// Path of the route image (`<output>_res.png`).
    #[must_use]
    pub fn route_image_path(&self) -> PathBuf {
        with_suffix(&self.run.output, ROUTE_IMAGE_SUFFIX)
    }
}

/// Append `suffix` to the final path component without touching extensions.
fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = base.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Parameters of the random graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationOptions {
    /// Number of nodes.
    pub nodes: usize,
    /// Lower weight bound (symmetrical mode).
    pub min_weight: f64,
    /// Upper weight bound (exclusive).
    pub max_weight: f64,
    /// Mirror weights across both directions of a pair.
    pub symmetrical: bool,
    /// Force the `0 -> 1 -> ... -> 0` cycle to unit weights.
    pub debug: bool,
    /// Master seed; drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            nodes: 10,
            min_weight: 10.0,
            max_weight: 200.0,
            symmetrical: false,
            debug: false,
            seed: None,
        }
    }
}

impl GenerationOptions {
    /// Node count and weight bounds.
    ///
    /// Too few nodes is a topology error, as the generator would report it.
    /// `min_weight` only bounds the symmetrical draw; the asymmetrical draw
    /// needs a positive `max_weight` alone. Degenerate bounds are rejected
    /// rather than collapsed to a constant.
    fn validate_semantic(&self) -> GraphResult<()> {
        if self.nodes < MIN_NODES {
            return Err(GraphError::topology(
                self.nodes,
                self.nodes.saturating_sub(1),
                format!("at least {MIN_NODES} nodes are required"),
            ));
        }
        if !self.max_weight.is_finite() || self.max_weight <= 0.0 {
            return Err(GraphError::config(format!(
                "max_weight must be positive and finite, got {}",
                self.max_weight
            )));
        }
        if !self.symmetrical {
            return Ok(());
        }
        if !self.min_weight.is_finite() || self.min_weight < 0.0 {
            return Err(GraphError::config(format!(
                "min_weight must be non-negative and finite, got {}",
                self.min_weight
            )));
        }
        if self.max_weight <= self.min_weight {
            return Err(GraphError::config(format!(
                "max_weight ({}) must exceed min_weight ({})",
                self.max_weight, self.min_weight
            )));
        }
        Ok(())
    }
}

/// Output and solver parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct RunOptions {
    /// Base path of the generated files (without extension).
    pub output: PathBuf,
    /// Generate a new graph; when false the existing record is reused.
    pub generate: bool,
    /// Launch the external solver.
    pub run_solver: bool,
    /// Route supplied directly instead of (or before) solving.
    pub route: Option<Vec<NodeId>>,
    /// External solver invocation.
    #[validate(nested)]
    pub solver: SolverConfig,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from("./generated_graph"),
            generate: true,
            run_solver: false,
            route: None,
            solver: SolverConfig::default(),
        }
    }
}

/// How the external solver is launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Parallel launcher executable.
    #[validate(length(min = 1))]
    pub launcher: String,
    /// Helper that turns the compute-node file into launcher arguments.
    /// `None` skips node discovery.
    pub node_discovery: Option<String>,
    /// Solver executable.
    pub program: PathBuf,
    /// Processes per compute node.
    #[validate(range(min = 1))]
    pub processes: usize,
    /// File listing the compute nodes.
    pub compute_nodes: PathBuf,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            launcher: "upcxx-run".to_string(),
            node_discovery: Some("upcxx-nodes".to_string()),
            program: PathBuf::from("./main_program/antColonyTSPSolver"),
            processes: 1,
            compute_nodes: PathBuf::from("./nodes"),
        }
    }
}
