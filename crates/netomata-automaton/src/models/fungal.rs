//! Resource-driven network growth on a 2-D lattice.
//!
//! Each cell holds an amount of resource. Links are directed and carry
//! resource from source to target. Every timestep:
//!
//! - a cell on the resource layer absorbs `absorption` units;
//! - a cell with outgoing links passes `transfer * r` of its resource on,
//!   split evenly across those links;
//! - the network is then rewired: links whose source fell below the prune
//!   threshold are removed, and every cell at or above the growth threshold
//!   grows one link to a random lattice neighbour it does not yet feed.
//!
//! Without absorption the total resource is conserved.

use netomata_core::{Boundary, Lattice2d, NodeId, Topology, TopologyResult};
use rand::Rng;

use crate::context::Context;
use crate::error::{EvolveError, EvolveResult, RuleResult};
use crate::evolve::{Evolution, Trajectory};
use crate::init;
use crate::random::SimRng;
use crate::rule::{ActivityRule, ConnectivityContext, ConnectivityRule, RuleId};

/// Model parameters and the lattice it grows on.
#[derive(Debug, Clone, PartialEq)]
pub struct FungalGrowth {
    lattice: Lattice2d,
    /// Neighbours a cell may grow a link to.
    reach: Topology,
    initial_resource: f64,
    resource_layer: Vec<bool>,
    absorption: f64,
    transfer: f64,
    growth_threshold: f64,
    prune_threshold: f64,
}

impl FungalGrowth {
    /// A `rows x cols` lattice with `initial_resource` on the centre cell and no resource layer.
    pub fn new(rows: usize, cols: usize, initial_resource: f64) -> TopologyResult<Self> {
        let lattice = Lattice2d::new(rows, cols)
            .boundary(Boundary::Open)
            .include_centre(false);
        let reach = lattice.build()?;
        Ok(Self {
            lattice,
            resource_layer: vec![false; reach.node_count()],
            reach,
            initial_resource,
            absorption: 0.0,
            transfer: 0.5,
            growth_threshold: 100.0,
            prune_threshold: 1.0,
        })
    }

    /// Cells that absorb `absorption` units every timestep.
    pub fn with_resource_layer(mut self, layer: Vec<bool>, absorption: f64) -> EvolveResult<Self> {
        if layer.len() != self.node_count() {
            return Err(EvolveError::configuration(format!(
                "resource layer has {} cells, lattice has {}",
                layer.len(),
                self.node_count()
            )));
        }
        self.resource_layer = layer;
        self.absorption = absorption;
        Ok(self)
    }

    /// Fraction of a cell's resource passed on per timestep.
    pub fn with_transfer(mut self, transfer: f64) -> Self {
        self.transfer = transfer.clamp(0.0, 1.0);
        self
    }

    pub fn with_growth_threshold(mut self, threshold: f64) -> Self {
        self.growth_threshold = threshold;
        self
    }

    pub fn with_prune_threshold(mut self, threshold: f64) -> Self {
        self.prune_threshold = threshold;
        self
    }

    pub fn lattice(&self) -> &Lattice2d {
        &self.lattice
    }

    pub fn node_count(&self) -> usize {
        self.reach.node_count()
    }

    pub fn initial_conditions(&self) -> Vec<f64> {
        init::simple_2d(
            self.lattice.rows(),
            self.lattice.cols(),
            self.initial_resource,
            0.0,
        )
    }

    /// No links yet; growth starts from the centre.
    pub fn topology(&self) -> Topology {
        Topology::new(self.node_count())
    }

    pub fn activity_rule(&self) -> ResourceFlow {
        ResourceFlow {
            resource_layer: self.resource_layer.clone(),
            absorption: self.absorption,
            transfer: self.transfer,
        }
    }

    pub fn connectivity_rule(&self) -> GrowPrune {
        GrowPrune {
            reach: self.reach.clone(),
            growth_threshold: self.growth_threshold,
            prune_threshold: self.prune_threshold,
        }
    }

    /// Grow the network for `timesteps`, keeping every topology snapshot.
    pub fn run(&self, timesteps: usize, seed: u64) -> EvolveResult<Trajectory<f64>> {
        let flow = self.activity_rule();
        let growth = self.connectivity_rule();
        Evolution::new(self.initial_conditions(), self.topology(), &flow)
            .connectivity_rule(&growth)
            .timesteps(timesteps)
            .seed(seed)
            .run()
    }
}

/// Absorption plus even outflow along the current links.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceFlow {
    resource_layer: Vec<bool>,
    absorption: f64,
    transfer: f64,
}

impl ActivityRule<f64> for ResourceFlow {
    fn id(&self) -> RuleId {
        RuleId::new("resource_flow")
    }

    fn apply(&self, ctx: &Context<'_, f64>, _rng: &mut SimRng) -> RuleResult<f64> {
        let node = ctx.node_label;
        let mut resource = *ctx.node_activity;
        if ctx.topology.out_degree(node) > 0 {
            resource -= self.transfer * *ctx.node_activity;
        }
        for edge in ctx.neighbourhood {
            let out = ctx.topology.out_degree(edge.source);
            resource += self.transfer * ctx.activities[edge.source.index()] / out as f64;
        }
        if self.resource_layer.get(node.index()).copied().unwrap_or(false) {
            resource += self.absorption;
        }
        Ok(resource)
    }
}

/// Prune links from depleted cells, then grow one link from each rich cell.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowPrune {
    reach: Topology,
    growth_threshold: f64,
    prune_threshold: f64,
}

impl ConnectivityRule<f64> for GrowPrune {
    fn id(&self) -> RuleId {
        RuleId::new("grow_prune")
    }

    fn apply(&self, ctx: &ConnectivityContext<'_, f64>, rng: &mut SimRng) -> RuleResult<Topology> {
        let resource = ctx.activities;
        let mut topology = ctx.topology.clone();

        for target in ctx.topology.nodes() {
            for source in ctx.topology.neighbours(target) {
                if resource[source.index()] < self.prune_threshold {
                    topology.remove_edges(source, target);
                }
            }
        }

        for source in topology.nodes().collect::<Vec<_>>() {
            if resource[source.index()] < self.growth_threshold {
                continue;
            }
            let candidates: Vec<NodeId> = self
                .reach
                .neighbours(source)
                .filter(|target| !topology.has_edge(source, *target))
                .collect();
            if candidates.is_empty() {
                continue;
            }
            let target = candidates[rng.random_range(0..candidates.len())];
            topology.add_edge(source, target, 1.0)?;
        }
        Ok(topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(row: &[f64]) -> f64 {
        row.iter().sum()
    }

    #[test]
    fn test_first_step_grows_a_single_link_from_centre() {
        let model = FungalGrowth::new(10, 10, 80_000.0).unwrap();
        let trajectory = model.run(1, 7).unwrap();
        let snapshot = trajectory.connectivities.get(1).unwrap();
        assert_eq!(snapshot.edge_count(), 1);
        let centre = model.lattice().index(5, 5);
        assert_eq!(snapshot.out_degree(centre), 1);
        assert_eq!(&trajectory.activities[1], &trajectory.activities[0]);
    }

    #[test]
    fn test_resource_is_conserved_without_absorption() {
        let model = FungalGrowth::new(10, 10, 80_000.0).unwrap();
        let trajectory = model.run(10, 20210408).unwrap();
        for (_, row) in trajectory.activities.iter() {
            assert!((total(row) - 80_000.0).abs() < 1e-6);
        }
        assert_eq!(trajectory.connectivities.len(), 11);
    }

    #[test]
    fn test_absorption_adds_resource_each_step() {
        let model = FungalGrowth::new(5, 5, 10.0).unwrap();
        let mut layer = vec![false; 25];
        layer[12] = true;
        let model = model.with_resource_layer(layer, 2.0).unwrap();
        let trajectory = model.run(4, 1).unwrap();
        let totals: Vec<f64> = trajectory.activities.rows().map(total).collect();
        assert_eq!(totals, vec![10.0, 12.0, 14.0, 16.0, 18.0]);
    }

    #[test]
    fn test_depleted_sources_lose_their_links() {
        let model = FungalGrowth::new(5, 5, 80_000.0)
            .unwrap()
            .with_growth_threshold(60_000.0)
            .with_prune_threshold(50_000.0);
        let trajectory = model.run(2, 3).unwrap();
        let edges: Vec<usize> = trajectory
            .connectivities
            .iter()
            .map(|(_, t)| t.edge_count())
            .collect();
        assert_eq!(edges, vec![0, 1, 0]);
    }

    #[test]
    fn test_growth_is_seed_deterministic() {
        let model = FungalGrowth::new(8, 8, 1_000.0).unwrap();
        assert_eq!(model.run(6, 5).unwrap(), model.run(6, 5).unwrap());
    }
}
