//! # tspgen
//!
//! Random TSP instance generator with a portable graph format, an external
//! solver bridge, and PNG rendering.
//!
//! - Complete directed graphs built from a random `(N-1)`-regular skeleton
//! - Symmetric, asymmetric, and debug weight policies
//! - Spring layout persisted in the JIT node-link `.g` format
//! - Route reconciliation and rendering of the solver's answer
//!
//! ## Example
//!
//! ```rust
//! use tspgen::prelude::*;
//!
//! let options = GenerationOptions { nodes: 5, seed: Some(42), ..Default::default() };
//! let mut rng = GraphRng::from_option(options.seed);
//! let graph = GraphGenerator::new().generate(&options, &mut rng).unwrap();
//! assert_eq!(graph.edge_count(), 20);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
    clippy::needless_range_loop,   // Index loops mirror the pairwise force sums
    clippy::manual_midpoint,
)]

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod pipeline;
pub mod reconcile;
pub mod record;
pub mod render;
pub mod rng;
pub mod solver;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{GenerationOptions, Options, RunOptions, SolverConfig};
    pub use crate::error::{GraphError, GraphResult};
    pub use crate::graph::{Edge, GraphGenerator, NodeId, Position, WeightPolicy, WeightedGraph};
    pub use crate::layout::{ForceDirectedLayout, SpringLayout};
    pub use crate::pipeline::{Pipeline, PipelineReport};
    pub use crate::reconcile::{reconcile, PathGraph, RouteSource};
    pub use crate::record::{read_graph, write_graph, GraphRecord};
    pub use crate::rng::GraphRng;
    pub use crate::solver::{parse_solver_output, SolverBridge, SolverOutput};
}

/// Re-export for public API
pub use error::{GraphError, GraphResult};
