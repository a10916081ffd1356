//! Route reconciliation.
//!
//! Rebuilds the minimal path graph of a route against a reloaded graph:
//! one node per distinct id, one labelled edge per consecutive pair. A
//! single missing edge aborts the whole reconciliation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Edge, NodeId, Position, WeightedGraph};

/// Where the route to render comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteSource {
    /// Route passed in by the caller.
    Supplied(Vec<NodeId>),
    /// Route returned by the external solver.
    Solver(Vec<NodeId>),
    /// Nothing to reconcile.
    None,
}

impl RouteSource {
    /// Pick the route: a solver result wins over a supplied route.
    #[must_use]
    pub fn select(solver: Option<Vec<NodeId>>, supplied: Option<Vec<NodeId>>) -> Self {
        match (solver, supplied) {
            (Some(route), _) => Self::Solver(route),
            (None, Some(route)) => Self::Supplied(route),
            (None, None) => Self::None,
        }
    }

    /// The selected route, if any.
    #[must_use]
    pub fn route(&self) -> Option<&[NodeId]> {
        match self {
            Self::Supplied(route) | Self::Solver(route) => Some(route),
            Self::None => None,
        }
    }

    /// Short label for logs and reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Supplied(_) => "supplied",
            Self::Solver(_) => "solver",
            Self::None => "none",
        }
    }
}

/// A node of the path graph with its stored position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    pub id: NodeId,
    pub position: Option<Position>,
}

/// Minimal weight-labelled path graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathGraph {
    /// Distinct route nodes in first-appearance order.
    pub nodes: Vec<PathNode>,
    /// One edge per consecutive route pair, in route order.
    pub edges: Vec<Edge>,
}

impl PathGraph {
    /// Whether there is nothing to render.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Sum of edge weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Whether the route visits each of `node_count` nodes exactly once and
    /// returns to its start.
    #[must_use]
    pub fn is_closed_tour(&self, node_count: usize) -> bool {
        if self.edges.len() != node_count || node_count == 0 {
            return false;
        }
        let start = self.edges[0].from;
        let closes = self.edges.last().is_some_and(|e| e.to == start);
        let chained = self.edges.windows(2).all(|w| w[0].to == w[1].from);
        let visited: BTreeSet<NodeId> = self.edges.iter().map(|e| e.from).collect();
        closes && chained && visited.len() == node_count
    }
}

/// Reconcile `route` against `graph`.
///
/// Routes with fewer than two nodes yield an empty path graph.
///
/// # Errors
///
/// Returns `UnknownEdge` for the first consecutive pair that is not an edge
/// of `graph`; no partial result is returned.
pub fn reconcile(graph: &WeightedGraph, route: &[NodeId]) -> GraphResult<PathGraph> {
    if route.len() < 2 {
        return Ok(PathGraph::default());
    }

    let edges = route
        .windows(2)
        .map(|pair| {
            let (from, to) = (pair[0], pair[1]);
            graph
                .weight(from, to)
                .map(|weight| Edge { from, to, weight })
                .ok_or(GraphError::UnknownEdge { from, to })
        })
        .collect::<GraphResult<Vec<_>>>()?;

    let mut seen = BTreeSet::new();
    let nodes = route
        .iter()
        .filter(|&&id| seen.insert(id))
        .map(|&id| PathNode {
            id,
            position: graph.position(id),
        })
        .collect();

    Ok(PathGraph { nodes, edges })
}

/// Reconcile whichever route `source` carries.
///
/// # Errors
///
/// See [`reconcile`].
pub fn reconcile_source(graph: &WeightedGraph, source: &RouteSource) -> GraphResult<PathGraph> {
    source
        .route()
        .map_or_else(|| Ok(PathGraph::default()), |route| reconcile(graph, route))
}
