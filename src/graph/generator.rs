//! Random TSP graph generation.
//!
//! Builds the `(N-1)`-regular skeleton, doubles every undirected edge into
//! two directed edges, and hands the result to the weight policy.

use tracing::{debug, info};

use crate::config::GenerationOptions;
use crate::error::{GraphError, GraphResult};
use crate::graph::topology::{PairingTopology, RegularTopologyGenerator};
use crate::graph::weights::assign_weights;
use crate::graph::WeightedGraph;
use crate::rng::GraphRng;

/// Smallest node count the generator accepts.
pub const MIN_NODES: usize = 3;

/// Graph generator parameterized by its topology strategy.
#[derive(Debug, Clone, Default)]
pub struct GraphGenerator<T = PairingTopology> {
    topology: T,
}

impl GraphGenerator<PairingTopology> {
    /// Create a generator using the default pairing topology.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topology: PairingTopology::default(),
        }
    }
}

impl<T: RegularTopologyGenerator> GraphGenerator<T> {
    /// Create a generator with a custom topology strategy.
    #[must_use]
    pub const fn with_topology(topology: T) -> Self {
        Self { topology }
    }

    /// Generate a weighted directed graph for the given options.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTopology` for fewer than three nodes or when the
    /// topology strategy fails.
    pub fn generate(
        &self,
        options: &GenerationOptions,
        rng: &mut GraphRng,
    ) -> GraphResult<WeightedGraph> {
        let nodes = options.nodes;
        let degree = nodes.saturating_sub(1);
        if nodes < MIN_NODES {
            return Err(GraphError::topology(
                nodes,
                degree,
                format!("at least {MIN_NODES} nodes are required"),
            ));
        }

        let skeleton = self.topology.generate(nodes, degree, rng)?;
        debug!(
            strategy = self.topology.name(),
            undirected_edges = skeleton.edge_count(),
            "skeleton generated"
        );

        let mut graph = skeleton.to_directed()?;
        assign_weights(&mut graph, options, rng)?;

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            symmetrical = options.symmetrical,
            debug = options.debug,
            "graph generated"
        );
        Ok(graph)
    }
}
