//! Random regular topologies.
//!
//! The generator only needs an undirected `d`-regular skeleton on `n`
//! nodes. `RegularTopologyGenerator` keeps the algorithm pluggable;
//! `PairingTopology` is the default stub-pairing construction.
//!
//! # Pairing construction
//!
//! ```text
//! stubs  = [0]*d ++ [1]*d ++ ... ++ [n-1]*d
//! repeat:
//!     shuffle stubs, pair neighbours (s1, s2)
//!     accept (s1, s2) if s1 != s2 and the edge is new
//!     otherwise both stubs go back into the pool
//!     if no pair left in the pool could ever be accepted: restart
//! ```
//!
//! Expected cost per attempt is `O(n·d)` for the degrees used here.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{GraphError, GraphResult};
use crate::graph::{NodeId, WeightedGraph};
use crate::rng::GraphRng;

/// Default number of restarts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1_000;

/// Check that a `degree`-regular simple graph on `nodes` nodes can exist.
///
/// # Errors
///
/// Returns `InvalidTopology` if `degree >= nodes` or `degree * nodes` is odd.
pub fn validate_regular(nodes: usize, degree: usize) -> GraphResult<()> {
    if degree >= nodes {
        return Err(GraphError::topology(
            nodes,
            degree,
            "degree must be smaller than the node count",
        ));
    }
    if (degree * nodes) % 2 != 0 {
        return Err(GraphError::topology(
            nodes,
            degree,
            "degree times node count must be even",
        ));
    }
    Ok(())
}

/// Undirected simple graph without weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
    nodes: usize,
    /// Normalized `(min, max)` pairs.
    edges: BTreeSet<(NodeId, NodeId)>,
}

impl Skeleton {
    /// Build a skeleton from undirected pairs; pairs are normalized.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTopology` for self-loops or out-of-range endpoints.
    pub fn from_pairs(
        nodes: usize,
        pairs: impl IntoIterator<Item = (NodeId, NodeId)>,
    ) -> GraphResult<Self> {
        let mut edges = BTreeSet::new();
        for (a, b) in pairs {
            if a == b || a >= nodes || b >= nodes {
                return Err(GraphError::topology(
                    nodes,
                    0,
                    format!("invalid undirected edge {{{a}, {b}}}"),
                ));
            }
            edges.insert((a.min(b), a.max(b)));
        }
        Ok(Self { nodes, edges })
    }

    /// Number of nodes.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.nodes
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Undirected pairs in ascending order.
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges.iter().copied()
    }

    /// Degree of every node.
    #[must_use]
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.nodes];
        for &(a, b) in &self.edges {
            degrees[a] += 1;
            degrees[b] += 1;
        }
        degrees
    }

    /// Whether every node has exactly `degree` neighbours.
    #[must_use]
    pub fn is_regular(&self, degree: usize) -> bool {
        self.degrees().iter().all(|&d| d == degree)
    }

    /// Materialize both directions of every pair with weight `0.0`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` if a pair is a self-loop or leaves the
    /// node set.
    pub fn to_directed(&self) -> GraphResult<WeightedGraph> {
        let mut graph = WeightedGraph::with_nodes(self.nodes);
        for &(a, b) in &self.edges {
            graph.set_edge(a, b, 0.0)?;
            graph.set_edge(b, a, 0.0)?;
        }
        Ok(graph)
    }
}

/// Strategy that produces a random `degree`-regular skeleton.
pub trait RegularTopologyGenerator {
    /// Generate a `degree`-regular skeleton on `nodes` nodes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTopology` if no such graph exists or construction fails.
    fn generate(&self, nodes: usize, degree: usize, rng: &mut GraphRng) -> GraphResult<Skeleton>;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

/// Stub-pairing random regular graph generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingTopology {
    /// Restarts allowed before returning `InvalidTopology`.
    pub max_attempts: usize,
}

impl Default for PairingTopology {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PairingTopology {
    /// One pairing attempt; `None` when the pool got stuck.
    fn try_creation(
        nodes: usize,
        degree: usize,
        rng: &mut GraphRng,
    ) -> Option<BTreeSet<(NodeId, NodeId)>> {
        let mut edges = BTreeSet::new();
        let mut stubs: Vec<NodeId> = (0..nodes)
            .flat_map(|n| std::iter::repeat(n).take(degree))
            .collect();

        while !stubs.is_empty() {
            let mut potential: BTreeMap<NodeId, usize> = BTreeMap::new();
            rng.shuffle(&mut stubs);

            for pair in stubs.chunks_exact(2) {
                let (s1, s2) = (pair[0].min(pair[1]), pair[0].max(pair[1]));
                if s1 != s2 && !edges.contains(&(s1, s2)) {
                    edges.insert((s1, s2));
                } else {
                    *potential.entry(s1).or_insert(0) += 1;
                    *potential.entry(s2).or_insert(0) += 1;
                }
            }

            if !Self::suitable(&edges, &potential) {
                return None;
            }

            stubs = potential
                .iter()
                .flat_map(|(&node, &count)| std::iter::repeat(node).take(count))
                .collect();
        }

        Some(edges)
    }

    /// Whether any two distinct pooled nodes could still be joined.
    fn suitable(edges: &BTreeSet<(NodeId, NodeId)>, potential: &BTreeMap<NodeId, usize>) -> bool {
        if potential.is_empty() {
            return true;
        }
        let pooled: Vec<NodeId> = potential.keys().copied().collect();
        pooled.iter().enumerate().any(|(i, &a)| {
            pooled[i + 1..]
                .iter()
                .any(|&b| !edges.contains(&(a.min(b), a.max(b))))
        })
    }
}

impl RegularTopologyGenerator for PairingTopology {
    fn generate(&self, nodes: usize, degree: usize, rng: &mut GraphRng) -> GraphResult<Skeleton> {
        validate_regular(nodes, degree)?;
        if degree == 0 {
            return Ok(Skeleton {
                nodes,
                edges: BTreeSet::new(),
            });
        }

        for _ in 0..self.max_attempts {
            if let Some(edges) = Self::try_creation(nodes, degree, rng) {
                return Ok(Skeleton { nodes, edges });
            }
        }

        Err(GraphError::topology(
            nodes,
            degree,
            format!("pairing did not converge in {} attempts", self.max_attempts),
        ))
    }

    fn name(&self) -> &'static str {
        "pairing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_regular_ok() {
        assert!(validate_regular(5, 4).is_ok());
        assert!(validate_regular(6, 3).is_ok());
        assert!(validate_regular(4, 0).is_ok());
    }

    #[test]
    fn test_validate_regular_degree_too_large() {
        let err = validate_regular(3, 3).unwrap_err();
        assert!(matches!(err, GraphError::InvalidTopology { .. }));
    }

    #[test]
    fn test_validate_regular_odd_product() {
        let err = validate_regular(5, 3).unwrap_err();
        assert!(err.to_string().contains("even"));
    }

    #[test]
    fn test_complete_graph_from_pairing() {
        let mut rng = GraphRng::new(42);
        for n in 3..12 {
            let skeleton = PairingTopology::default()
                .generate(n, n - 1, &mut rng)
                .unwrap();
            assert_eq!(skeleton.edge_count(), n * (n - 1) / 2);
            assert!(skeleton.is_regular(n - 1));
        }
    }

    #[test]
    fn test_sparse_regular_graph() {
        let mut rng = GraphRng::new(7);
        let skeleton = PairingTopology::default().generate(10, 3, &mut rng).unwrap();
        assert!(skeleton.is_regular(3));
        assert_eq!(skeleton.edge_count(), 15);
    }

    #[test]
    fn test_zero_degree() {
        let mut rng = GraphRng::new(1);
        let skeleton = PairingTopology::default().generate(4, 0, &mut rng).unwrap();
        assert_eq!(skeleton.edge_count(), 0);
        assert!(skeleton.is_regular(0));
    }

    #[test]
    fn test_to_directed_reports_bad_pair() {
        let skeleton = Skeleton {
            nodes: 2,
            edges: BTreeSet::from([(0, 5)]),
        };
        assert!(matches!(
            skeleton.to_directed(),
            Err(GraphError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_to_directed_doubles_edges() {
        let skeleton = Skeleton::from_pairs(3, [(0, 1), (2, 1)]).unwrap();
        let graph = skeleton.to_directed().unwrap();
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.has_edge(1, 2));
        assert!(graph.has_edge(2, 1));
        assert!(!graph.has_edge(0, 2));
    }

    #[test]
    fn test_from_pairs_rejects_self_loop() {
        assert!(Skeleton::from_pairs(3, [(1, 1)]).is_err());
        assert!(Skeleton::from_pairs(3, [(0, 3)]).is_err());
    }

    #[test]
    fn test_same_seed_same_skeleton() {
        let a = PairingTopology::default()
            .generate(8, 3, &mut GraphRng::new(5))
            .unwrap();
        let b = PairingTopology::default()
            .generate(8, 3, &mut GraphRng::new(5))
            .unwrap();
        assert_eq!(a, b);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_complete_regular(seed in 0u64..u64::MAX, n in 3usize..16) {
            let mut rng = GraphRng::new(seed);
            let skeleton = PairingTopology::default().generate(n, n - 1, &mut rng).unwrap();
            prop_assert!(skeleton.is_regular(n - 1));
            prop_assert_eq!(skeleton.to_directed().unwrap().edge_count(), 2 * skeleton.edge_count());
        }
    }
}
