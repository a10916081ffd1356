//! Edge weight assignment.
//!
//! ```text
//! Asymmetrical:  w(u,v) ~ U[0, max)                 independently per direction
//! Symmetrical:   w(u,v) = w(v,u) ~ U[min, max)      one draw per unordered pair
//! Debug:         w(i,i+1) = w(N-1,0) = 1.0          known optimum of length N
//! ```
//!
//! Symmetrical draws are keyed by the unordered pair `{min(u,v), max(u,v)}`
//! and pairs are visited in ascending order, so the result depends only on
//! the seed and never on edge-visit order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GenerationOptions;
use crate::error::{GraphError, GraphResult};
use crate::graph::{NodeId, WeightedGraph};
use crate::rng::GraphRng;

/// Weight of every edge on the debug cycle.
pub const DEBUG_WEIGHT: f64 = 1.0;

/// How weights are drawn for directed edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeightPolicy {
    /// Each direction drawn independently from `[0, max)`.
    Asymmetrical { max: f64 },
    /// One draw from `[min, max)` shared by both directions.
    Symmetrical { min: f64, max: f64 },
}

impl WeightPolicy {
    /// Policy selected by the options' symmetry flag.
    #[must_use]
    pub fn from_options(options: &GenerationOptions) -> Self {
        if options.symmetrical {
            Self::Symmetrical {
                min: options.min_weight,
                max: options.max_weight,
            }
        } else {
            Self::Asymmetrical {
                max: options.max_weight,
            }
        }
    }

    /// Overwrite the weight of every edge of `graph`.
    ///
    /// # Errors
    ///
    /// Propagates `set_edge` failures.
    pub fn apply(&self, graph: &mut WeightedGraph, rng: &mut GraphRng) -> GraphResult<()> {
        let edges: Vec<(NodeId, NodeId)> = graph.edges().map(|e| (e.from, e.to)).collect();

        match *self {
            Self::Asymmetrical { max } => {
                for (from, to) in edges {
                    let w = max * rng.gen_f64();
                    graph.set_edge(from, to, w)?;
                }
            }
            Self::Symmetrical { min, max } => {
                let mut shared: BTreeMap<(NodeId, NodeId), f64> = BTreeMap::new();
                for (from, to) in edges {
                    let key = (from.min(to), from.max(to));
                    let w = *shared
                        .entry(key)
                        .or_insert_with(|| rng.gen_range_f64(min, max));
                    graph.set_edge(from, to, w)?;
                }
            }
        }
        Ok(())
    }

    /// Whether reverse edges must mirror forward edges.
    #[must_use]
    pub const fn is_symmetrical(&self) -> bool {
        matches!(self, Self::Symmetrical { .. })
    }
}

/// Force the cycle `0 -> 1 -> ... -> N-1 -> 0` to weight `1.0`.
///
/// With `mirror` the reverse direction of each cycle edge is forced too.
///
/// # Errors
///
/// Returns `UnknownEdge` if a cycle edge is missing from the skeleton.
pub fn apply_debug_cycle(graph: &mut WeightedGraph, mirror: bool) -> GraphResult<()> {
    let n = graph.node_count();
    for i in 0..n {
        let (from, to) = (i, (i + 1) % n);
        if !graph.has_edge(from, to) {
            return Err(GraphError::UnknownEdge { from, to });
        }
        graph.set_edge(from, to, DEBUG_WEIGHT)?;
        if mirror && graph.has_edge(to, from) {
            graph.set_edge(to, from, DEBUG_WEIGHT)?;
        }
    }
    Ok(())
}

/// Assign weights per the options, then apply the debug override if requested.
///
/// # Errors
///
/// Propagates `apply_debug_cycle` failures.
pub fn assign_weights(
    graph: &mut WeightedGraph,
    options: &GenerationOptions,
    rng: &mut GraphRng,
) -> GraphResult<()> {
    let policy = WeightPolicy::from_options(options);
    policy.apply(graph, rng)?;
    debug!(?policy, edges = graph.edge_count(), "weights assigned");

    if options.debug {
        apply_debug_cycle(graph, policy.is_symmetrical())?;
        debug!(nodes = graph.node_count(), "debug cycle forced to unit weights");
    }
    Ok(())
}
