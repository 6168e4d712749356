//! Core topology types shared across the netomata workspace.
//!
//! A network automaton replaces the fixed lattice of a cellular automaton with
//! an arbitrary directed graph. This crate holds that graph:
//!
//! - [`NodeId`]: a node label in `[0, N)`
//! - [`Edge`]: one `(source, weight)` connection feeding a node
//! - [`Topology`]: the sparse, ordered per-node connectivity map used by the engine
//! - [`AdjacencyMatrix`]: the dense `N x N` weight form, convertible to and from [`Topology`]
//! - [`lattice`]: builders for rings, 2-D lattices and fully connected networks

use std::fmt;

use serde::{Deserialize, Serialize};

mod error;
pub mod lattice;
mod matrix;
mod topology;

pub use error::{TopologyError, TopologyResult};
pub use lattice::{all_to_all, ring, Boundary, Lattice2d, Neighbourhood};
pub use matrix::AdjacencyMatrix;
pub use topology::{Edge, Topology};

/// Label of a node within a topology of `N` nodes.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Position of this node in activity vectors.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}
