//! Update scheduling policies.
//!
//! An [`UpdateOrder`] decides, for every timestep, which nodes update and in
//! what sequence, and whether they read the frozen previous vector
//! ([`UpdateMode::Synchronous`]) or the in-progress one
//! ([`UpdateMode::Asynchronous`]).

use netomata_core::{NodeId, Topology};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};
use crate::random::SimRng;

/// What a node sees of the other nodes while it updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Every node reads the vector of `t - 1`.
    #[default]
    Synchronous,
    /// Nodes read values already written at `t` by nodes earlier in the pass.
    Asynchronous,
}

/// Per-timestep node sequencing.
pub trait UpdateOrder {
    fn mode(&self) -> UpdateMode;

    /// Nodes to update at `timestep`, in order. Nodes not listed keep their value.
    fn schedule(
        &mut self,
        timestep: usize,
        topology: &Topology,
        rng: &mut SimRng,
    ) -> RuleResult<Vec<NodeId>>;
}

/// All nodes, reading the frozen previous vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct Synchronous;

impl UpdateOrder for Synchronous {
    fn mode(&self) -> UpdateMode {
        UpdateMode::Synchronous
    }

    fn schedule(&mut self, _: usize, topology: &Topology, _: &mut SimRng) -> RuleResult<Vec<NodeId>> {
        Ok(topology.nodes().collect())
    }
}

/// A full in-place sweep per timestep, in label order or a fixed caller order.
#[derive(Debug, Clone, Default)]
pub struct Sequential {
    order: Option<Vec<NodeId>>,
}

impl Sequential {
    /// Sweep in ascending label order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sweep in the given order every timestep.
    pub fn with_order(order: Vec<NodeId>) -> Self {
        Self { order: Some(order) }
    }
}

impl UpdateOrder for Sequential {
    fn mode(&self) -> UpdateMode {
        UpdateMode::Asynchronous
    }

    fn schedule(&mut self, _: usize, topology: &Topology, _: &mut SimRng) -> RuleResult<Vec<NodeId>> {
        Ok(match &self.order {
            Some(order) => order.clone(),
            None => topology.nodes().collect(),
        })
    }
}

/// A full in-place sweep per timestep in a freshly shuffled order.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSequential;

impl UpdateOrder for RandomSequential {
    fn mode(&self) -> UpdateMode {
        UpdateMode::Asynchronous
    }

    fn schedule(&mut self, _: usize, topology: &Topology, rng: &mut SimRng) -> RuleResult<Vec<NodeId>> {
        let mut nodes: Vec<NodeId> = topology.nodes().collect();
        nodes.shuffle(rng);
        Ok(nodes)
    }
}

/// One node per timestep, cycling through a sequence.
///
/// Timestep `t` updates position `(t - 1) mod len` of the cycle. With
/// `randomize_each_cycle`, the sequence is reshuffled whenever a cycle starts.
#[derive(Debug, Clone, Default)]
pub struct Cyclic {
    order: Option<Vec<NodeId>>,
    randomize_each_cycle: bool,
    current: Vec<NodeId>,
}

impl Cyclic {
    /// Cycle through nodes in ascending label order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cycle through a fixed sequence.
    pub fn with_order(order: Vec<NodeId>) -> Self {
        Self {
            order: Some(order),
            ..Self::default()
        }
    }

    /// Reshuffle the sequence at the start of every cycle.
    pub fn randomize_each_cycle(mut self, randomize: bool) -> Self {
        self.randomize_each_cycle = randomize;
        self
    }
}

impl UpdateOrder for Cyclic {
    fn mode(&self) -> UpdateMode {
        UpdateMode::Asynchronous
    }

    fn schedule(
        &mut self,
        timestep: usize,
        topology: &Topology,
        rng: &mut SimRng,
    ) -> RuleResult<Vec<NodeId>> {
        let len = self
            .order
            .as_ref()
            .map_or(topology.node_count(), Vec::len);
        if len == 0 {
            return Err(RuleError::msg("cyclic order over zero nodes"));
        }
        let position = timestep.saturating_sub(1) % len;
        if position == 0 || self.current.len() != len {
            self.current = match &self.order {
                Some(order) => order.clone(),
                None => topology.nodes().collect(),
            };
            if self.randomize_each_cycle {
                self.current.shuffle(rng);
            }
        }
        Ok(vec![self.current[position]])
    }
}

/// Order backed by a closure. See [`order_fn`].
pub struct FnOrder<F> {
    mode: UpdateMode,
    f: F,
}

impl<F> UpdateOrder for FnOrder<F>
where
    F: FnMut(usize, &Topology, &mut SimRng) -> RuleResult<Vec<NodeId>>,
{
    fn mode(&self) -> UpdateMode {
        self.mode
    }

    fn schedule(
        &mut self,
        timestep: usize,
        topology: &Topology,
        rng: &mut SimRng,
    ) -> RuleResult<Vec<NodeId>> {
        (self.f)(timestep, topology, rng)
    }
}

/// Wrap a closure as an [`UpdateOrder`].
pub fn order_fn<F>(mode: UpdateMode, f: F) -> FnOrder<F>
where
    F: FnMut(usize, &Topology, &mut SimRng) -> RuleResult<Vec<NodeId>>,
{
    FnOrder { mode, f }
}
