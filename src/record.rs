//! Persisted graph record (`.g` files).
//!
//! The record is node-link JSON in the shape the external solver reads:
//!
//! ```json
//! [
//!     {
//!         "id": 0,
//!         "name": "0",
//!         "data": { "pos": [0.31, -0.72] },
//!         "adjacencies": [
//!             { "nodeTo": 1, "data": { "weight": 118.25 } }
//!         ]
//!     }
//! ]
//! ```
//!
//! Weights and coordinates are written at full `f64` precision; a record
//! read back reproduces the generated graph exactly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{GraphError, GraphResult};
use crate::graph::{NodeId, Position, WeightedGraph};

/// Node attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Layout position `[x, y]`.
    pub pos: [f64; 2],
}

/// Edge attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub weight: f64,
}

/// One outgoing edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjacency {
    #[serde(rename = "nodeTo")]
    pub node_to: NodeId,
    pub data: EdgeData,
}

/// One node with its position and outgoing edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    pub data: NodeData,
    #[serde(default)]
    pub adjacencies: Vec<Adjacency>,
}

/// Serializable graph: nodes in id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphRecord {
    pub nodes: Vec<NodeRecord>,
}

impl GraphRecord {
    /// Capture a placed graph.
    ///
    /// # Errors
    ///
    /// Returns `Layout` if some node has no position.
    pub fn from_graph(graph: &WeightedGraph) -> GraphResult<Self> {
        let nodes = (0..graph.node_count())
            .map(|id| {
                let pos = graph
                    .position(id)
                    .ok_or_else(|| GraphError::Layout(format!("node {id} has no position")))?;
                Ok(NodeRecord {
                    id,
                    name: id.to_string(),
                    data: NodeData { pos: [pos.x, pos.y] },
                    adjacencies: graph
                        .outgoing(id)
                        .map(|(node_to, weight)| Adjacency {
                            node_to,
                            data: EdgeData { weight },
                        })
                        .collect(),
                })
            })
            .collect::<GraphResult<Vec<_>>>()?;
        Ok(Self { nodes })
    }

    /// Rebuild the graph, checking every structural invariant.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` if ids are not exactly `0..N`, an edge
    /// leaves the node set, loops, repeats, a value is non-finite, or a
    /// weight is negative.
    pub fn to_graph(&self) -> GraphResult<WeightedGraph> {
        let n = self.nodes.len();
        let mut seen = BTreeSet::new();
        for node in &self.nodes {
            if node.id >= n {
                return Err(GraphError::malformed(format!(
                    "node id {} outside 0..{n}",
                    node.id
                )));
            }
            if !seen.insert(node.id) {
                return Err(GraphError::malformed(format!("duplicate node id {}", node.id)));
            }
        }

        let mut graph = WeightedGraph::with_nodes(n);
        for node in &self.nodes {
            let [x, y] = node.data.pos;
            let position = Position::new(x, y);
            if !position.is_finite() {
                return Err(GraphError::malformed(format!(
                    "node {} has a non-finite position",
                    node.id
                )));
            }
            graph
                .set_position(node.id, position)
                .map_err(|e| GraphError::malformed(e.to_string()))?;

            for adj in &node.adjacencies {
                if !graph.contains_node(adj.node_to) {
                    return Err(GraphError::malformed(format!(
                        "edge {} -> {} references an unknown node",
                        node.id, adj.node_to
                    )));
                }
                if graph.has_edge(node.id, adj.node_to) {
                    return Err(GraphError::malformed(format!(
                        "edge {} -> {} appears twice",
                        node.id, adj.node_to
                    )));
                }
                if !adj.data.weight.is_finite() || adj.data.weight < 0.0 {
                    return Err(GraphError::malformed(format!(
                        "edge {} -> {} has invalid weight {}",
                        node.id, adj.node_to, adj.data.weight
                    )));
                }
                graph.set_edge(node.id, adj.node_to, adj.data.weight)?;
            }
        }
        Ok(graph)
    }

    /// Pretty JSON with four-space indentation.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` if serialization fails.
    pub fn to_json(&self) -> GraphResult<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .map_err(|e| GraphError::malformed(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| GraphError::malformed(e.to_string()))
    }

    /// Parse a record from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` if the text is not a valid record.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        serde_json::from_str(json).map_err(|e| GraphError::malformed(e.to_string()))
    }

    /// Write the record to `path`.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> GraphResult<()> {
        let json = self.to_json()?;
        fs::write(path, json)
            .map_err(|e| GraphError::io(format!("Failed to write {}: {e}", path.display())))?;
        info!(path = %path.display(), nodes = self.nodes.len(), "graph record written");
        Ok(())
    }

    /// Read a record from `path`.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `MalformedRecord` if it does
    /// not parse.
    pub fn load(path: &Path) -> GraphResult<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| GraphError::io(format!("Failed to read {}: {e}", path.display())))?;
        let record = Self::from_json(&json)?;
        debug!(path = %path.display(), nodes = record.nodes.len(), "graph record read");
        Ok(record)
    }
}

/// Serialize a placed graph to `path`.
///
/// # Errors
///
/// See [`GraphRecord::from_graph`] and [`GraphRecord::save`].
pub fn write_graph(graph: &WeightedGraph, path: &Path) -> GraphResult<()> {
    GraphRecord::from_graph(graph)?.save(path)
}

/// Load and rebuild a graph from `path`; each call yields a fresh graph.
///
/// # Errors
///
/// See [`GraphRecord::load`] and [`GraphRecord::to_graph`].
pub fn read_graph(path: &Path) -> GraphResult<WeightedGraph> {
    GraphRecord::load(path)?.to_graph()
}
