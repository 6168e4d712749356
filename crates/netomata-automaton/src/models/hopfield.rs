//! Hopfield associative memory.

use netomata_core::{AdjacencyMatrix, Topology};
use tracing::debug;

use crate::context::Context;
use crate::error::{EvolveError, EvolveResult, RuleResult};
use crate::evolve::{Evolution, Trajectory};
use crate::order::Cyclic;
use crate::random::SimRng;
use crate::rule::{ActivityRule, RuleId};

/// Fully connected bipolar network storing patterns in its weights.
///
/// Training accumulates the Hebbian outer product `w[i][j] += p[i] * p[j]`
/// over every pattern and zeroes the self-weights. Recall updates one node
/// per timestep in label order, so a net of `N` cells needs about `N`
/// timesteps per sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct HopfieldNet {
    weights: AdjacencyMatrix,
    threshold: f64,
}

impl HopfieldNet {
    pub fn new(size: usize) -> Self {
        Self {
            weights: AdjacencyMatrix::new(size),
            threshold: 0.0,
        }
    }

    /// Activation threshold; a node fires when its weighted input reaches it.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn size(&self) -> usize {
        self.weights.size()
    }

    pub fn weights(&self) -> &AdjacencyMatrix {
        &self.weights
    }

    /// Store bipolar patterns.
    pub fn train(&mut self, patterns: &[Vec<i8>]) -> EvolveResult<()> {
        let n = self.size();
        for (index, pattern) in patterns.iter().enumerate() {
            if pattern.len() != n {
                return Err(EvolveError::configuration(format!(
                    "pattern {index} has {} cells, network has {n}",
                    pattern.len()
                )));
            }
            if let Some(v) = pattern.iter().find(|v| **v != 1 && **v != -1) {
                return Err(EvolveError::configuration(format!(
                    "pattern {index} is not bipolar: found {v}"
                )));
            }
            for i in 0..n {
                for j in 0..n {
                    self.weights
                        .add(i, j, f64::from(pattern[i]) * f64::from(pattern[j]));
                }
            }
        }
        self.weights.clear_diagonal();
        debug!(patterns = patterns.len(), size = n, "hopfield_trained");
        Ok(())
    }

    pub fn topology(&self) -> Topology {
        Topology::from_matrix(&self.weights)
    }

    pub fn rule(&self) -> HopfieldRule {
        HopfieldRule {
            threshold: self.threshold,
        }
    }

    pub fn update_order(&self) -> Cyclic {
        Cyclic::new()
    }

    /// Evolve `probe` for `timesteps` asynchronous single-node updates.
    pub fn recall(&self, probe: Vec<i8>, timesteps: usize) -> EvolveResult<Trajectory<i8>> {
        let rule = self.rule();
        Evolution::new(probe, self.topology(), &rule)
            .timesteps(timesteps)
            .update_order(self.update_order())
            .run()
    }
}

/// Sign of the weighted input: `+1` at or above the threshold, `-1` below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HopfieldRule {
    pub threshold: f64,
}

impl ActivityRule<i8> for HopfieldRule {
    fn id(&self) -> RuleId {
        RuleId::new("hopfield")
    }

    fn apply(&self, ctx: &Context<'_, i8>, _rng: &mut SimRng) -> RuleResult<i8> {
        Ok(if ctx.weighted_sum() >= self.threshold {
            1
        } else {
            -1
        })
    }
}
