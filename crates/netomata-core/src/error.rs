//! Error types for topology construction and conversion.

use thiserror::Error;

use crate::NodeId;

/// Result type alias for topology operations.
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Errors that can occur while building or converting a topology.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    /// An edge referenced a node label outside `[0, node_count)`.
    #[error("node {node} is out of range for a topology of {node_count} nodes")]
    NodeOutOfRange { node: NodeId, node_count: usize },

    /// An adjacency matrix row had the wrong number of columns.
    #[error("adjacency matrix is not square: row {row} has {len} columns, expected {expected}")]
    NonSquareMatrix {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// The dense form cannot hold parallel edges.
    #[error("edge {from} -> {to} occurs {count} times; a dense matrix cannot represent parallel edges")]
    MultiEdge {
        from: NodeId,
        to: NodeId,
        count: usize,
    },

    /// Two shapes that must agree do not.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A builder parameter is outside its supported range.
    #[error("invalid topology parameter: {message}")]
    InvalidParameter { message: String },
}
