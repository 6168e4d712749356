//! Builders for the regular topologies most models start from.

use serde::{Deserialize, Serialize};

use crate::error::{TopologyError, TopologyResult};
use crate::topology::{Edge, Topology};
use crate::NodeId;

/// What happens at the edge of a finite lattice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Wrap around; the lattice is a ring (1-D) or torus (2-D).
    #[default]
    Periodic,
    /// No wrapping; cells near the edge have fewer neighbours.
    Open,
}

/// Neighbourhood shape for 2-D lattices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighbourhood {
    /// Chebyshev ball: all cells with `max(|dr|, |dc|) <= r`.
    #[default]
    Moore,
    /// Manhattan ball: all cells with `|dr| + |dc| <= r`.
    VonNeumann,
}

/// 1-D cellular-automaton topology.
///
/// Node `i` is fed by `i - radius ..= i + radius` in that order, so for
/// `radius = 1` the neighbourhood reads `[left, self, right]`. With
/// [`Boundary::Open`] out-of-range offsets are omitted.
pub fn ring(node_count: usize, radius: usize, boundary: Boundary) -> TopologyResult<Topology> {
    if node_count == 0 {
        return Err(TopologyError::InvalidParameter {
            message: "a ring needs at least one node".into(),
        });
    }
    let n = node_count as isize;
    let r = radius as isize;
    let inbound = (0..n)
        .map(|i| {
            (-r..=r)
                .filter_map(|offset| {
                    let j = i + offset;
                    match boundary {
                        Boundary::Periodic => Some(j.rem_euclid(n)),
                        Boundary::Open => (0..n).contains(&j).then_some(j),
                    }
                })
                .map(|j| Edge::unit(j as usize))
                .collect()
        })
        .collect();
    Topology::from_inbound(inbound)
}

/// Fully connected topology with uniform weight.
///
/// Sources are ordered by label. Self-loops are added only when requested.
pub fn all_to_all(node_count: usize, weight: f64, self_loops: bool) -> Topology {
    let inbound = (0..node_count)
        .map(|to| {
            (0..node_count)
                .filter(|from| self_loops || *from != to)
                .map(|from| Edge::new(from, weight))
                .collect()
        })
        .collect();
    Topology::from_inbound_unchecked(inbound)
}

/// Builder for rectangular 2-D lattices.
///
/// Cells are labelled row-major (`row * cols + col`). Each cell's neighbours
/// are listed row-major over the offsets, top-left first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lattice2d {
    rows: usize,
    cols: usize,
    radius: usize,
    neighbourhood: Neighbourhood,
    boundary: Boundary,
    include_centre: bool,
}

impl Lattice2d {
    /// A `rows x cols` Moore lattice of radius 1 with periodic boundary,
    /// including the centre cell.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            radius: 1,
            neighbourhood: Neighbourhood::Moore,
            boundary: Boundary::Periodic,
            include_centre: true,
        }
    }

    /// Set the neighbourhood radius.
    pub fn radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }

    /// Set the neighbourhood shape.
    pub fn neighbourhood(mut self, neighbourhood: Neighbourhood) -> Self {
        self.neighbourhood = neighbourhood;
        self
    }

    /// Set the boundary behaviour.
    pub fn boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Whether each cell feeds itself.
    pub fn include_centre(mut self, include: bool) -> Self {
        self.include_centre = include;
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Label of the cell at `(row, col)`.
    pub fn index(&self, row: usize, col: usize) -> NodeId {
        NodeId(row * self.cols + col)
    }

    /// `(row, col)` of a label.
    pub fn coords(&self, node: NodeId) -> (usize, usize) {
        (node.0 / self.cols, node.0 % self.cols)
    }

    /// Total cell count.
    pub fn node_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Materialize the topology.
    pub fn build(&self) -> TopologyResult<Topology> {
        if self.rows == 0 || self.cols == 0 {
            return Err(TopologyError::InvalidParameter {
                message: format!("lattice must be non-empty, got {}x{}", self.rows, self.cols),
            });
        }
        let (rows, cols, r) = (self.rows as isize, self.cols as isize, self.radius as isize);
        let mut inbound = Vec::with_capacity(self.node_count());
        for row in 0..rows {
            for col in 0..cols {
                let mut edges = Vec::new();
                for dr in -r..=r {
                    for dc in -r..=r {
                        if !self.in_shape(dr, dc) {
                            continue;
                        }
                        if let Some((nr, nc)) = self.wrap(row + dr, col + dc) {
                            edges.push(Edge::unit((nr * cols + nc) as usize));
                        }
                    }
                }
                inbound.push(edges);
            }
        }
        Topology::from_inbound(inbound)
    }

    fn in_shape(&self, dr: isize, dc: isize) -> bool {
        if dr == 0 && dc == 0 {
            return self.include_centre;
        }
        let r = self.radius as isize;
        match self.neighbourhood {
            Neighbourhood::Moore => dr.abs().max(dc.abs()) <= r,
            Neighbourhood::VonNeumann => dr.abs() + dc.abs() <= r,
        }
    }

    fn wrap(&self, row: isize, col: isize) -> Option<(isize, isize)> {
        let (rows, cols) = (self.rows as isize, self.cols as isize);
        match self.boundary {
            Boundary::Periodic => Some((row.rem_euclid(rows), col.rem_euclid(cols))),
            Boundary::Open => {
                ((0..rows).contains(&row) && (0..cols).contains(&col)).then_some((row, col))
            }
        }
    }
}
