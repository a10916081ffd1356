//! Error types for tspgen.
//!
//! Every stage of the pipeline returns `Result<T, GraphError>`; nothing is
//! retried and nothing is partially written after a failure.

use thiserror::Error;

use crate::graph::NodeId;

/// Result type alias for tspgen operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Unified error type for all tspgen operations.
#[derive(Debug, Error)]
pub enum GraphError {
    // ===== Generation =====
    /// Requested node count cannot form the required regular structure.
    #[error("Invalid topology: {degree}-regular graph on {nodes} nodes ({reason})")]
    InvalidTopology {
        /// Requested node count.
        nodes: usize,
        /// Requested degree.
        degree: usize,
        /// Why the topology was rejected.
        reason: String,
    },

    /// Force-directed placement produced unusable coordinates.
    #[error("Layout error: {0}")]
    Layout(String),

    // ===== Persistence =====
    /// Persisted graph file unreadable or internally inconsistent.
    #[error("Malformed graph record: {0}")]
    MalformedRecord(String),

    // ===== Reconciliation =====
    /// Route references an edge that does not exist in the graph.
    #[error("Unknown edge {from} -> {to}: route is inconsistent with the graph")]
    UnknownEdge {
        /// Source node of the missing edge.
        from: NodeId,
        /// Target node of the missing edge.
        to: NodeId,
    },

    // ===== External solver =====
    /// Solver process failed to run, exited abnormally, or broke the protocol.
    #[error("External process failure: {0}")]
    ExternalProcessFailure(String),

    // ===== Configuration =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image rendering error.
    #[error("Render error: {0}")]
    Render(String),
}

impl GraphError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a topology error.
    #[must_use]
    pub fn topology(nodes: usize, degree: usize, reason: impl Into<String>) -> Self {
        Self::InvalidTopology {
            nodes,
            degree,
            reason: reason.into(),
        }
    }

    /// Create a malformed-record error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord(message.into())
    }

    /// Create an external process error.
    #[must_use]
    pub fn external(message: impl Into<String>) -> Self {
        Self::ExternalProcessFailure(message.into())
    }

    /// Create a render error.
    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Create an I/O error with a message (wraps in `std::io::Error`).
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(std::io::Error::other(message.into()))
    }

    /// Whether the error means the stored graph and the route disagree.
    #[must_use]
    pub const fn is_inconsistency(&self) -> bool {
        matches!(self, Self::MalformedRecord(_) | Self::UnknownEdge { .. })
    }
}
