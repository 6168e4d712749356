//! Sparse, ordered connectivity map.
//!
//! For every node the topology stores the list of edges that feed it, in the
//! order they were added. That order is part of the contract: rules that care
//! about left/right or positional semantics read neighbourhoods in exactly
//! this order. Self-loops and parallel edges are kept as separate entries and
//! counted in degree queries.

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};

use crate::error::{TopologyError, TopologyResult};
use crate::matrix::AdjacencyMatrix;
use crate::NodeId;

/// A single connection `source -> node` with its weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Node whose activity flows along this edge.
    pub source: NodeId,
    /// Connection weight (1.0 for unweighted lattices).
    pub weight: f64,
}

impl Edge {
    /// Create an edge from `source` with the given weight.
    pub fn new(source: impl Into<NodeId>, weight: f64) -> Self {
        Self {
            source: source.into(),
            weight,
        }
    }

    /// Create an unweighted edge (weight 1.0).
    pub fn unit(source: impl Into<NodeId>) -> Self {
        Self::new(source, 1.0)
    }
}

/// Directed graph over nodes `[0, N)`, stored as inbound edge lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTopology")]
pub struct Topology {
    inbound: Vec<Vec<Edge>>,
}

/// Wire form of [`Topology`], checked on the way in.
#[derive(Deserialize)]
struct RawTopology {
    inbound: Vec<Vec<Edge>>,
}

impl TryFrom<RawTopology> for Topology {
    type Error = TopologyError;

    fn try_from(raw: RawTopology) -> TopologyResult<Self> {
        Self::from_inbound(raw.inbound)
    }
}

impl Topology {
    /// Create a topology of `node_count` nodes and no edges.
    pub fn new(node_count: usize) -> Self {
        Self {
            inbound: vec![Vec::new(); node_count],
        }
    }

    /// Build from per-node inbound edge lists, validating every label.
    pub fn from_inbound(inbound: Vec<Vec<Edge>>) -> TopologyResult<Self> {
        let topology = Self { inbound };
        topology.check_labels()?;
        Ok(topology)
    }

    /// Fails with [`TopologyError::NodeOutOfRange`] on the first edge whose
    /// source is not a node of this topology.
    pub fn check_labels(&self) -> TopologyResult<()> {
        let node_count = self.node_count();
        self.inbound
            .iter()
            .flatten()
            .try_for_each(|edge| check_node(edge.source, node_count))
    }

    /// Build from inbound lists whose labels are known to be in range.
    pub(crate) fn from_inbound_unchecked(inbound: Vec<Vec<Edge>>) -> Self {
        Self { inbound }
    }

    /// Build from a dense matrix where `matrix[from][to] != 0` is an edge `from -> to`.
    ///
    /// Each node's sources are ordered by ascending label.
    pub fn from_matrix(matrix: &AdjacencyMatrix) -> Self {
        let n = matrix.size();
        let inbound = (0..n)
            .map(|to| {
                (0..n)
                    .filter_map(|from| {
                        let weight = matrix.get(from, to);
                        (weight != 0.0).then(|| Edge::new(from, weight))
                    })
                    .collect()
            })
            .collect();
        Self { inbound }
    }

    /// Convert to the dense form.
    ///
    /// Fails with [`TopologyError::MultiEdge`] when a node pair is connected
    /// more than once, since a matrix cell holds a single weight.
    pub fn to_matrix(&self) -> TopologyResult<AdjacencyMatrix> {
        let n = self.node_count();
        let mut matrix = AdjacencyMatrix::new(n);
        let mut seen = vec![0usize; n];
        for (to, edges) in self.inbound.iter().enumerate() {
            seen.iter_mut().for_each(|c| *c = 0);
            for edge in edges {
                seen[edge.source.0] += 1;
            }
            if let Some(from) = seen.iter().position(|&c| c > 1) {
                return Err(TopologyError::MultiEdge {
                    from: NodeId(from),
                    to: NodeId(to),
                    count: seen[from],
                });
            }
            for edge in edges {
                matrix.set(edge.source.0, to, edge.weight);
            }
        }
        Ok(matrix)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.inbound.len()
    }

    /// Total number of edges, parallel edges included.
    pub fn edge_count(&self) -> usize {
        self.inbound.iter().map(Vec::len).sum()
    }

    /// Iterate over all node labels in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.node_count()).map(NodeId)
    }

    /// Ordered `(source, weight)` edges driving `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is out of range; use [`Topology::get`] for a checked lookup.
    pub fn resolve(&self, node: NodeId) -> &[Edge] {
        &self.inbound[node.0]
    }

    /// Checked variant of [`Topology::resolve`].
    pub fn get(&self, node: NodeId) -> Option<&[Edge]> {
        self.inbound.get(node.0).map(Vec::as_slice)
    }

    /// Source labels feeding `node`, in resolve order.
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.resolve(node).iter().map(|e| e.source)
    }

    /// Append an edge `source -> target`. Parallel edges are allowed.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, weight: f64) -> TopologyResult<()> {
        let n = self.node_count();
        check_node(source, n)?;
        check_node(target, n)?;
        self.inbound[target.0].push(Edge { source, weight });
        Ok(())
    }

    /// Remove every edge `source -> target`, returning how many were removed.
    pub fn remove_edges(&mut self, source: NodeId, target: NodeId) -> usize {
        match self.inbound.get_mut(target.0) {
            Some(edges) => {
                let before = edges.len();
                edges.retain(|e| e.source != source);
                before - edges.len()
            }
            None => 0,
        }
    }

    /// Number of edges `source -> target`.
    pub fn multiplicity(&self, source: NodeId, target: NodeId) -> usize {
        self.get(target)
            .map(|edges| edges.iter().filter(|e| e.source == source).count())
            .unwrap_or(0)
    }

    /// Whether at least one edge `source -> target` exists.
    pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.multiplicity(source, target) > 0
    }

    /// Number of edges feeding `node`, duplicates counted.
    pub fn in_degree(&self, node: NodeId) -> usize {
        self.get(node).map(<[Edge]>::len).unwrap_or(0)
    }

    /// Number of edges leaving `node`, duplicates counted.
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.inbound
            .iter()
            .flatten()
            .filter(|e| e.source == node)
            .count()
    }

    /// In-degree of every node.
    pub fn in_degrees(&self) -> Vec<usize> {
        self.inbound.iter().map(Vec::len).collect()
    }

    /// Out-degree of every node, computed in a single pass.
    pub fn out_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.node_count()];
        for edge in self.inbound.iter().flatten() {
            degrees[edge.source.0] += 1;
        }
        degrees
    }

    /// Convert to a petgraph multigraph for analysis.
    ///
    /// Node weights are the labels; `NodeIndex(i)` corresponds to `NodeId(i)`.
    pub fn to_graph(&self) -> StableDiGraph<NodeId, f64> {
        let mut graph = StableDiGraph::with_capacity(self.node_count(), self.edge_count());
        for node in self.nodes() {
            graph.add_node(node);
        }
        for (to, edges) in self.inbound.iter().enumerate() {
            for edge in edges {
                graph.add_edge(NodeIndex::new(edge.source.0), NodeIndex::new(to), edge.weight);
            }
        }
        graph
    }
}

impl From<AdjacencyMatrix> for Topology {
    fn from(matrix: AdjacencyMatrix) -> Self {
        Self::from_matrix(&matrix)
    }
}

impl From<&AdjacencyMatrix> for Topology {
    fn from(matrix: &AdjacencyMatrix) -> Self {
        Self::from_matrix(matrix)
    }
}

fn check_node(node: NodeId, node_count: usize) -> TopologyResult<()> {
    if node.0 >= node_count {
        return Err(TopologyError::NodeOutOfRange { node, node_count });
    }
    Ok(())
}
