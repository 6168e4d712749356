//! Dense `N x N` weight matrix.

use serde::{Deserialize, Serialize};

use crate::error::{TopologyError, TopologyResult};

/// Row-major adjacency matrix: `get(from, to)` is the weight of edge `from -> to`,
/// and zero means "no edge".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyMatrix {
    size: usize,
    weights: Vec<f64>,
}

impl AdjacencyMatrix {
    /// An all-zero matrix for `size` nodes.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            weights: vec![0.0; size * size],
        }
    }

    /// Build from nested rows, checking that the matrix is square.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> TopologyResult<Self> {
        let size = rows.len();
        let mut weights = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(TopologyError::NonSquareMatrix {
                    row,
                    len: values.len(),
                    expected: size,
                });
            }
            weights.extend(values);
        }
        Ok(Self { size, weights })
    }

    /// Number of nodes (rows).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Weight of edge `from -> to`.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.weights[from * self.size + to]
    }

    /// Overwrite the weight of edge `from -> to`.
    pub fn set(&mut self, from: usize, to: usize, weight: f64) {
        self.weights[from * self.size + to] = weight;
    }

    /// Accumulate into the weight of edge `from -> to`.
    pub fn add(&mut self, from: usize, to: usize, delta: f64) {
        self.weights[from * self.size + to] += delta;
    }

    /// Zero every self-weight.
    pub fn clear_diagonal(&mut self) {
        for i in 0..self.size {
            self.set(i, i, 0.0);
        }
    }

    /// One row: the outgoing weights of `from`.
    pub fn row(&self, from: usize) -> &[f64] {
        &self.weights[from * self.size..(from + 1) * self.size]
    }

    /// Nested-vector copy, row by row.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.size).map(|r| self.row(r).to_vec()).collect()
    }

    /// Count of non-zero cells.
    pub fn edge_count(&self) -> usize {
        self.weights.iter().filter(|w| **w != 0.0).count()
    }
}
