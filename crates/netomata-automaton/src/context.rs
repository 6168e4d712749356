//! Per-node view handed to activity rules.

use netomata_core::{Edge, NodeId, Topology};

use crate::past::PastConditions;
use crate::rule_table::RuleTable;

/// Everything an activity rule may read while computing one node at one timestep.
///
/// A context is built for a single `(node, timestep)` pair and dropped right
/// after the rule returns. All fields are borrowed read-only.
#[derive(Debug)]
pub struct Context<'a, A> {
    /// The node being updated.
    pub node_label: NodeId,

    /// Its activity before this timestep.
    pub node_activity: &'a A,

    /// Edges feeding the node, in resolve order.
    pub neighbourhood: &'a [Edge],

    /// Timestep being computed (starts at 1).
    pub timestep: usize,

    /// Full activity vector as this node sees it.
    ///
    /// Under a synchronous order this is the frozen vector of `timestep - 1`.
    /// Under an asynchronous order it already holds the values written earlier
    /// in the same pass.
    pub activities: &'a [A],

    /// Vectors older than the previous timestep, newest last.
    pub past_activities: &'a PastConditions<A>,

    /// Topology in force for this timestep.
    pub topology: &'a Topology,

    /// Model-supplied transition table, if any.
    pub rule_table: Option<&'a RuleTable>,
}

impl<'a, A> Context<'a, A> {
    /// Neighbour activities in resolve order.
    pub fn neighbourhood_activities(&self) -> impl ExactSizeIterator<Item = &'a A> + 'a {
        let activities = self.activities;
        self.neighbourhood
            .iter()
            .map(move |edge| &activities[edge.source.index()])
    }

    /// Neighbour labels in resolve order.
    pub fn neighbourhood_labels(&self) -> impl ExactSizeIterator<Item = NodeId> + 'a {
        self.neighbourhood.iter().map(|edge| edge.source)
    }

    /// Edge weights in resolve order.
    pub fn weights(&self) -> impl ExactSizeIterator<Item = f64> + 'a {
        self.neighbourhood.iter().map(|edge| edge.weight)
    }

    /// Number of incoming edges, duplicates included.
    pub fn degree(&self) -> usize {
        self.neighbourhood.len()
    }

    /// This node's activity `back` vectors into the past window.
    ///
    /// `back = 1` is the value from two timesteps ago.
    pub fn past_node_activity(&self, back: usize) -> Option<&'a A> {
        self.past_activities.node_activity(self.node_label.index(), back)
    }

    /// This node's activity two timesteps ago.
    pub fn two_steps_prior(&self) -> Option<&'a A> {
        self.past_node_activity(1)
    }
}

impl<'a, A: Copy + Into<f64>> Context<'a, A> {
    /// Sum of `weight * activity` over the neighbourhood.
    pub fn weighted_sum(&self) -> f64 {
        self.neighbourhood
            .iter()
            .map(|edge| {
                let activity: f64 = self.activities[edge.source.index()].into();
                edge.weight * activity
            })
            .sum()
    }

    /// Plain sum of neighbour activities, ignoring weights.
    pub fn activity_sum(&self) -> f64 {
        self.neighbourhood_activities()
            .map(|a| -> f64 { (*a).into() })
            .sum()
    }
}
