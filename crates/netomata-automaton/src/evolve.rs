//! The evolve loop.
//!
//! [`Evolution`] collects the initial conditions, topology and hooks of a run,
//! validates them, and steps the network for a fixed number of timesteps.
//! Each timestep runs, in order:
//!
//! 1. the update order, which picks the nodes to update;
//! 2. for each of them, the activity rule followed by the perturbation;
//! 3. the input function, once;
//! 4. the connectivity rule, once, producing the topology for the next step;
//! 5. history recording and the past-conditions shift.
//!
//! Any hook error aborts the run; no partial history is returned.

use std::time::Instant;

use netomata_core::{NodeId, Topology};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::activity::Activity;
use crate::config::EvolveConfig;
use crate::context::Context;
use crate::error::{EvolveError, EvolveResult, Hook};
use crate::history::{ActivityHistory, ConnectivityHistory, SnapshotRetention};
use crate::order::{Synchronous, UpdateMode, UpdateOrder};
use crate::past::PastConditions;
use crate::random::{seeded, SimRng};
use crate::rule::{
    ActivityRule, ConnectivityContext, ConnectivityRule, InputFunction, Perturbation,
    PerturbationContext,
};
use crate::rule_table::RuleTable;

/// Histories returned by a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory<A> {
    pub activities: ActivityHistory<A>,
    pub connectivities: ConnectivityHistory,
}

impl<A> Trajectory<A> {
    /// Split into `(activities, connectivities)`.
    pub fn into_parts(self) -> (ActivityHistory<A>, ConnectivityHistory) {
        (self.activities, self.connectivities)
    }

    /// Topology in force at the end of the run.
    pub fn final_topology(&self) -> Option<&Topology> {
        self.connectivities.latest().map(|(_, topology)| topology)
    }
}

/// Builder and runner for one evolve call.
///
/// ```no_run
/// use netomata_automaton::{init, rules::TotalisticRule, Evolution};
/// use netomata_core::{ring, Boundary};
///
/// let rule = TotalisticRule::new(3, 777)?;
/// let trajectory = Evolution::new(init::simple(200, 1u8, 0), ring(200, 1, Boundary::Periodic)?, &rule)
///     .timesteps(100)
///     .run()?;
/// assert_eq!(trajectory.activities.len(), 101);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Evolution<'a, A> {
    initial: Vec<A>,
    topology: Topology,
    activity_rule: &'a dyn ActivityRule<A>,
    connectivity_rule: Option<&'a dyn ConnectivityRule<A>>,
    update_order: Option<Box<dyn UpdateOrder + 'a>>,
    perturbation: Option<&'a dyn Perturbation<A>>,
    input_function: Option<&'a dyn InputFunction<A>>,
    past_conditions: Vec<Vec<A>>,
    rule_table: Option<&'a RuleTable>,
    config: EvolveConfig,
}

impl<'a, A: Activity> Evolution<'a, A> {
    /// Start a run from initial activities, a topology and an activity rule.
    pub fn new<R>(initial: Vec<A>, topology: impl Into<Topology>, activity_rule: &'a R) -> Self
    where
        R: ActivityRule<A> + 'a,
    {
        Self {
            initial,
            topology: topology.into(),
            activity_rule,
            connectivity_rule: None,
            update_order: None,
            perturbation: None,
            input_function: None,
            past_conditions: Vec::new(),
            rule_table: None,
            config: EvolveConfig::default(),
        }
    }

    /// Replace all run settings at once.
    pub fn with_config(mut self, config: EvolveConfig) -> Self {
        self.config = config;
        self
    }

    pub fn timesteps(mut self, timesteps: usize) -> Self {
        self.config.timesteps = timesteps;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn copy_connectivity(mut self, copy: bool) -> Self {
        self.config.copy_connectivity = copy;
        self
    }

    pub fn compression(mut self, compression: bool) -> Self {
        self.config.compression = compression;
        self
    }

    pub fn connectivity_rule<R>(mut self, rule: &'a R) -> Self
    where
        R: ConnectivityRule<A> + 'a,
    {
        self.connectivity_rule = Some(rule);
        self
    }

    pub fn update_order(mut self, order: impl UpdateOrder + 'a) -> Self {
        self.update_order = Some(Box::new(order));
        self
    }

    pub fn perturbation<P>(mut self, perturbation: &'a P) -> Self
    where
        P: Perturbation<A> + 'a,
    {
        self.perturbation = Some(perturbation);
        self
    }

    pub fn input_function<I>(mut self, input: &'a I) -> Self
    where
        I: InputFunction<A> + 'a,
    {
        self.input_function = Some(input);
        self
    }

    /// Activity vectors preceding the initial conditions, oldest first.
    ///
    /// The last one plays the role of timestep `-1`. The window keeps this
    /// many vectors for the whole run.
    pub fn past_conditions(mut self, past: Vec<Vec<A>>) -> Self {
        self.past_conditions = past;
        self
    }

    pub fn rule_table(mut self, table: &'a RuleTable) -> Self {
        self.rule_table = Some(table);
        self
    }

    /// Validate the inputs and step the network to the configured horizon.
    pub fn run(self) -> EvolveResult<Trajectory<A>> {
        self.validate()?;

        let Evolution {
            initial,
            mut topology,
            activity_rule,
            connectivity_rule,
            update_order,
            perturbation,
            input_function,
            past_conditions,
            rule_table,
            config,
        } = self;

        let node_count = initial.len();
        let mut update_order = update_order.unwrap_or_else(|| Box::new(Synchronous));
        let mut rng = seeded(config.seed);
        let mut past = PastConditions::new(past_conditions);

        let mut activities = if config.compression {
            ActivityHistory::windowed(initial.clone(), past.capacity().max(1) + 1)
        } else {
            ActivityHistory::full(initial.clone())
        };
        let retention = if config.compression || !config.copy_connectivity {
            SnapshotRetention::Latest
        } else {
            SnapshotRetention::All
        };
        let record_snapshots = connectivity_rule.is_some() || config.copy_connectivity;
        let mut connectivities = ConnectivityHistory::new(topology.clone(), retention);

        info!(
            rule = %activity_rule.id(),
            nodes = node_count,
            timesteps = config.timesteps,
            mode = ?update_order.mode(),
            compression = config.compression,
            seed = config.seed,
            "evolve_start"
        );
        let started = Instant::now();

        let mut previous = initial;
        for timestep in 1..=config.timesteps {
            let schedule = update_order
                .schedule(timestep, &topology, &mut rng)
                .map_err(|e| EvolveError::hook(Hook::UpdateOrder, None, timestep, e))?;
            if let Some(node) = schedule.iter().find(|n| n.index() >= node_count) {
                return Err(EvolveError::configuration(format!(
                    "update order scheduled node {node} at timestep {timestep}, network has {node_count} nodes"
                )));
            }

            let mut next = previous.clone();
            let step = Step {
                timestep,
                topology: &topology,
                past: &past,
                activity_rule,
                perturbation,
                rule_table,
            };
            match update_order.mode() {
                UpdateMode::Synchronous => {
                    for &node in &schedule {
                        let value = step.update_node(node, &previous, &previous, &mut rng)?;
                        next[node.index()] = value;
                    }
                }
                UpdateMode::Asynchronous => {
                    for &node in &schedule {
                        let value = step.update_node(node, &next, &previous, &mut rng)?;
                        next[node.index()] = value;
                    }
                }
            }

            if let Some(input) = input_function {
                input
                    .apply(timestep, &mut next, &topology, &mut rng)
                    .map_err(|e| EvolveError::hook(Hook::InputFunction, None, timestep, e))?;
            }

            if let Some(rule) = connectivity_rule {
                let ctx = ConnectivityContext {
                    activities: &next,
                    topology: &topology,
                    timestep,
                };
                let updated = rule
                    .apply(&ctx, &mut rng)
                    .map_err(|e| EvolveError::hook(Hook::ConnectivityRule, None, timestep, e))?;
                if updated.node_count() != node_count {
                    return Err(EvolveError::configuration(format!(
                        "connectivity rule {} returned {} nodes at timestep {timestep}, expected {node_count}",
                        rule.id(),
                        updated.node_count()
                    )));
                }
                updated.check_labels().map_err(|e| {
                    EvolveError::configuration(format!(
                        "connectivity rule {} returned a bad topology at timestep {timestep}: {e}",
                        rule.id()
                    ))
                })?;
                topology = updated;
            }
            if record_snapshots {
                connectivities.record(timestep, topology.clone());
            }

            let changed = next
                .iter()
                .zip(&previous)
                .filter(|(a, b)| a != b)
                .count();
            activities.push(next.clone());
            if let Some(evicted) = past.push(std::mem::replace(&mut previous, next)) {
                trace!(timestep, len = evicted.len(), "past_condition_evicted");
            }

            debug!(
                timestep,
                updated = schedule.len(),
                changed,
                edges = topology.edge_count(),
                "evolve_step_complete"
            );
        }

        info!(
            timesteps = config.timesteps,
            retained = activities.retained(),
            snapshots = connectivities.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "evolve_complete"
        );

        Ok(Trajectory {
            activities,
            connectivities,
        })
    }

    fn validate(&self) -> EvolveResult<()> {
        let n = self.initial.len();
        if n == 0 {
            return Err(EvolveError::configuration("initial conditions are empty"));
        }
        if self.topology.node_count() != n {
            return Err(EvolveError::configuration(format!(
                "topology has {} nodes but initial conditions have {n}",
                self.topology.node_count()
            )));
        }
        self.topology
            .check_labels()
            .map_err(|e| EvolveError::configuration(format!("invalid topology: {e}")))?;
        if let Some((i, past)) = self
            .past_conditions
            .iter()
            .enumerate()
            .find(|(_, past)| past.len() != n)
        {
            return Err(EvolveError::configuration(format!(
                "past condition vector {i} has {} entries, expected {n}",
                past.len()
            )));
        }
        let required = self.activity_rule.past_conditions_required();
        if self.past_conditions.len() < required {
            return Err(EvolveError::MissingPastConditions {
                rule: self.activity_rule.id(),
                required,
                supplied: self.past_conditions.len(),
            });
        }
        Ok(())
    }
}

/// Per-timestep state shared by every node update.
struct Step<'s, 'a, A> {
    timestep: usize,
    topology: &'s Topology,
    past: &'s PastConditions<A>,
    activity_rule: &'a dyn ActivityRule<A>,
    perturbation: Option<&'a dyn Perturbation<A>>,
    rule_table: Option<&'a RuleTable>,
}

impl<A: Activity> Step<'_, '_, A> {
    /// Run the activity rule and perturbation for one node.
    ///
    /// `view` is what the rule reads; `previous` is the frozen `t - 1` vector.
    fn update_node(
        &self,
        node: NodeId,
        view: &[A],
        previous: &[A],
        rng: &mut SimRng,
    ) -> EvolveResult<A> {
        let ctx = Context {
            node_label: node,
            node_activity: &view[node.index()],
            neighbourhood: self.topology.resolve(node),
            timestep: self.timestep,
            activities: view,
            past_activities: self.past,
            topology: self.topology,
            rule_table: self.rule_table,
        };
        let candidate = self
            .activity_rule
            .apply(&ctx, rng)
            .map_err(|e| EvolveError::hook(Hook::ActivityRule, Some(node), self.timestep, e))?;

        match self.perturbation {
            Some(perturbation) => {
                let ctx = PerturbationContext {
                    node_label: node,
                    candidate,
                    previous: &previous[node.index()],
                    timestep: self.timestep,
                };
                perturbation
                    .perturb(ctx, rng)
                    .map_err(|e| EvolveError::hook(Hook::Perturbation, Some(node), self.timestep, e))
            }
            None => Ok(candidate),
        }
    }
}

/// Run with a configuration and no optional hooks.
pub fn evolve<A, R>(
    initial: Vec<A>,
    topology: impl Into<Topology>,
    activity_rule: &R,
    config: EvolveConfig,
) -> EvolveResult<Trajectory<A>>
where
    A: Activity,
    R: ActivityRule<A>,
{
    Evolution::new(initial, topology, activity_rule)
        .with_config(config)
        .run()
}
