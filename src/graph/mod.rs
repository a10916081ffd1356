//! In-memory weighted directed graph.
//!
//! Nodes are dense ids `0..N`. Each node carries an optional 2D position
//! (filled by the layout stage) and an ordered map of outgoing edges to
//! their weights, so iteration order is stable and serialization is
//! deterministic for a given graph.

pub mod generator;
pub mod topology;
pub mod weights;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{GraphError, GraphResult};

pub use generator::GraphGenerator;
pub use topology::{validate_regular, PairingTopology, RegularTopologyGenerator, Skeleton};
pub use weights::{assign_weights, WeightPolicy};

/// Node identifier.
pub type NodeId = usize;

/// Position in the layout plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A directed, weighted edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: f64,
}

/// Per-node storage.
#[derive(Debug, Clone, Default, PartialEq)]
struct NodeEntry {
    position: Option<Position>,
    outgoing: BTreeMap<NodeId, f64>,
}

/// Weighted directed graph with optional node positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedGraph {
    nodes: Vec<NodeEntry>,
}

impl WeightedGraph {
    /// Create a graph with `n` isolated nodes.
    #[must_use]
    pub fn with_nodes(n: usize) -> Self {
        Self {
            nodes: vec![NodeEntry::default(); n],
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.outgoing.len()).sum()
    }

    /// Whether `id` is a node of this graph.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        id < self.nodes.len()
    }

    /// Insert or overwrite the directed edge `from -> to`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` for self-loops or unknown endpoints.
    pub fn set_edge(&mut self, from: NodeId, to: NodeId, weight: f64) -> GraphResult<()> {
        if from == to {
            return Err(GraphError::malformed(format!("self-loop on node {from}")));
        }
        if !self.contains_node(to) {
            return Err(GraphError::malformed(format!(
                "edge {from} -> {to} targets an unknown node"
            )));
        }
        let entry = self.nodes.get_mut(from).ok_or_else(|| {
            GraphError::malformed(format!("edge {from} -> {to} starts at an unknown node"))
        })?;
        entry.outgoing.insert(to, weight);
        Ok(())
    }

    /// Weight of `from -> to`, if the edge exists.
    #[must_use]
    pub fn weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.nodes.get(from)?.outgoing.get(&to).copied()
    }

    /// Whether the directed edge exists.
    #[must_use]
    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.weight(from, to).is_some()
    }

    /// Outgoing edges of a node in ascending target order.
    pub fn outgoing(&self, from: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.nodes
            .get(from)
            .into_iter()
            .flat_map(|n| n.outgoing.iter().map(|(&to, &w)| (to, w)))
    }

    /// Out-degree of a node.
    #[must_use]
    pub fn out_degree(&self, id: NodeId) -> usize {
        self.nodes.get(id).map_or(0, |n| n.outgoing.len())
    }

    /// All directed edges ordered by `(from, to)`.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.nodes.iter().enumerate().flat_map(|(from, n)| {
            n.outgoing
                .iter()
                .map(move |(&to, &weight)| Edge { from, to, weight })
        })
    }

    /// Position of a node, if the layout stage assigned one.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.nodes.get(id)?.position
    }

    /// Assign a node position once.
    ///
    /// # Errors
    ///
    /// Returns `Layout` if the node is unknown or already placed.
    pub fn set_position(&mut self, id: NodeId, position: Position) -> GraphResult<()> {
        let entry = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::Layout(format!("unknown node {id}")))?;
        if entry.position.is_some() {
            return Err(GraphError::Layout(format!("node {id} is already placed")));
        }
        entry.position = Some(position);
        Ok(())
    }

    /// Assign positions for every node, in id order.
    ///
    /// # Errors
    ///
    /// Returns `Layout` if the count does not match or a node is already placed.
    pub fn place_all(&mut self, positions: &[Position]) -> GraphResult<()> {
        if positions.len() != self.nodes.len() {
            return Err(GraphError::Layout(format!(
                "{} positions for {} nodes",
                positions.len(),
                self.nodes.len()
            )));
        }
        for (id, &p) in positions.iter().enumerate() {
            self.set_position(id, p)?;
        }
        Ok(())
    }

    /// Whether every node has a position.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.nodes.iter().all(|n| n.position.is_some())
    }

    /// Sum of weights along consecutive pairs of `route`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEdge` at the first missing step.
    pub fn route_weight(&self, route: &[NodeId]) -> GraphResult<f64> {
        route.windows(2).try_fold(0.0, |acc, pair| {
            self.weight(pair[0], pair[1])
                .map(|w| acc + w)
                .ok_or(GraphError::UnknownEdge {
                    from: pair[0],
                    to: pair[1],
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> WeightedGraph {
        let mut g = WeightedGraph::with_nodes(3);
        g.set_edge(0, 1, 1.5).unwrap();
        g.set_edge(1, 2, 2.5).unwrap();
        g.set_edge(2, 0, 3.0).unwrap();
        g
    }

    #[test]
    fn test_edges_are_ordered() {
        let mut g = WeightedGraph::with_nodes(3);
        g.set_edge(2, 0, 1.0).unwrap();
        g.set_edge(0, 2, 1.0).unwrap();
        g.set_edge(0, 1, 1.0).unwrap();
        let pairs: Vec<_> = g.edges().map(|e| (e.from, e.to)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (2, 0)]);
    }

    #[test]
    fn test_set_edge_rejects_self_loop() {
        let mut g = WeightedGraph::with_nodes(2);
        assert!(matches!(
            g.set_edge(1, 1, 1.0),
            Err(GraphError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_set_edge_rejects_unknown_node() {
        let mut g = WeightedGraph::with_nodes(2);
        assert!(g.set_edge(0, 5, 1.0).is_err());
        assert!(g.set_edge(5, 0, 1.0).is_err());
    }

    #[test]
    fn test_weight_lookup() {
        let g = triangle();
        assert_eq!(g.weight(0, 1), Some(1.5));
        assert_eq!(g.weight(1, 0), None);
        assert!(g.has_edge(2, 0));
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.out_degree(1), 1);
    }

    #[test]
    fn test_route_weight() {
        let g = triangle();
        let total = g.route_weight(&[0, 1, 2, 0]).unwrap();
        assert!((total - 7.0).abs() < 1e-12);
        assert!((g.route_weight(&[1]).unwrap()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_route_weight_unknown_edge() {
        let g = triangle();
        match g.route_weight(&[0, 2]) {
            Err(GraphError::UnknownEdge { from, to }) => assert_eq!((from, to), (0, 2)),
            other => panic!("expected UnknownEdge, got {other:?}"),
        }
    }

    #[test]
    fn test_positions_assigned_once() {
        let mut g = WeightedGraph::with_nodes(2);
        assert!(!g.is_placed());
        g.set_position(0, Position::new(0.5, -0.5)).unwrap();
        assert!(g.set_position(0, Position::new(0.0, 0.0)).is_err());
        g.set_position(1, Position::new(0.0, 0.0)).unwrap();
        assert!(g.is_placed());
        assert_eq!(g.position(0), Some(Position::new(0.5, -0.5)));
    }

    #[test]
    fn test_place_all_count_mismatch() {
        let mut g = WeightedGraph::with_nodes(3);
        let err = g.place_all(&[Position::default()]).unwrap_err();
        assert!(matches!(err, GraphError::Layout(_)));
    }

    #[test]
    fn test_position_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
        assert!(!Position::new(f64::NAN, 0.0).is_finite());
    }
}
