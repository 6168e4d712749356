//! Extension points the evolve loop calls into.
//!
//! Each hook is a trait with one implementation per strategy. Closures can be
//! plugged in through the `*_fn` adapters at the bottom of this module.

use std::fmt;

use netomata_core::{NodeId, Topology};
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::RuleResult;
use crate::random::SimRng;

/// Name of a rule, used in logs and error messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Id derived from a type name, with the module path stripped.
    pub fn of<T: ?Sized>() -> Self {
        let full = std::any::type_name::<T>();
        let base = full.split('<').next().unwrap_or(full);
        let short = base.rsplit("::").next().unwrap_or(base);
        Self::new(short)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RuleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Computes a node's next activity from its context.
pub trait ActivityRule<A> {
    fn id(&self) -> RuleId {
        RuleId::of::<Self>()
    }

    /// Number of past condition vectors the rule reads through
    /// [`Context::past_activities`]. The engine refuses to start when fewer
    /// are supplied.
    fn past_conditions_required(&self) -> usize {
        0
    }

    fn apply(&self, ctx: &Context<'_, A>, rng: &mut SimRng) -> RuleResult<A>;
}

/// Input to a connectivity rule, built once per timestep.
#[derive(Debug)]
pub struct ConnectivityContext<'a, A> {
    /// Finalized activities of the timestep just computed.
    pub activities: &'a [A],
    /// Topology used to compute them.
    pub topology: &'a Topology,
    pub timestep: usize,
}

/// Produces the topology for the next timestep.
///
/// The returned topology must keep the node count unchanged.
pub trait ConnectivityRule<A> {
    fn id(&self) -> RuleId {
        RuleId::of::<Self>()
    }

    fn apply(&self, ctx: &ConnectivityContext<'_, A>, rng: &mut SimRng) -> RuleResult<Topology>;
}

/// Input to a perturbation.
#[derive(Debug)]
pub struct PerturbationContext<'a, A> {
    pub node_label: NodeId,
    /// Value the activity rule just produced.
    pub candidate: A,
    /// Value before this timestep.
    pub previous: &'a A,
    pub timestep: usize,
}

/// Overrides the activity rule's output for a node; it has the final say.
pub trait Perturbation<A> {
    fn perturb(&self, ctx: PerturbationContext<'_, A>, rng: &mut SimRng) -> RuleResult<A>;
}

/// Exogenous effect applied once per timestep after all node updates.
pub trait InputFunction<A> {
    fn apply(
        &self,
        timestep: usize,
        activities: &mut [A],
        topology: &Topology,
        rng: &mut SimRng,
    ) -> RuleResult<()>;
}

/// Activity rule backed by a closure. See [`rule_fn`].
pub struct FnRule<F> {
    id: RuleId,
    past_conditions: usize,
    f: F,
}

impl<F> FnRule<F> {
    /// Declare how many past condition vectors the closure reads.
    pub fn with_past_conditions(mut self, required: usize) -> Self {
        self.past_conditions = required;
        self
    }
}

impl<F> fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule").field("id", &self.id).finish()
    }
}

impl<A, F> ActivityRule<A> for FnRule<F>
where
    F: Fn(&Context<'_, A>, &mut SimRng) -> RuleResult<A>,
{
    fn id(&self) -> RuleId {
        self.id.clone()
    }

    fn past_conditions_required(&self) -> usize {
        self.past_conditions
    }

    fn apply(&self, ctx: &Context<'_, A>, rng: &mut SimRng) -> RuleResult<A> {
        (self.f)(ctx, rng)
    }
}

/// Wrap a closure as an [`ActivityRule`].
pub fn rule_fn<A, F>(id: impl Into<RuleId>, f: F) -> FnRule<F>
where
    F: Fn(&Context<'_, A>, &mut SimRng) -> RuleResult<A>,
{
    FnRule {
        id: id.into(),
        past_conditions: 0,
        f,
    }
}

/// Connectivity rule backed by a closure. See [`connectivity_fn`].
pub struct FnConnectivity<F>(F);

impl<A, F> ConnectivityRule<A> for FnConnectivity<F>
where
    F: Fn(&ConnectivityContext<'_, A>, &mut SimRng) -> RuleResult<Topology>,
{
    fn apply(&self, ctx: &ConnectivityContext<'_, A>, rng: &mut SimRng) -> RuleResult<Topology> {
        (self.0)(ctx, rng)
    }
}

/// Wrap a closure as a [`ConnectivityRule`].
pub fn connectivity_fn<A, F>(f: F) -> FnConnectivity<F>
where
    F: Fn(&ConnectivityContext<'_, A>, &mut SimRng) -> RuleResult<Topology>,
{
    FnConnectivity(f)
}

/// Perturbation backed by a closure. See [`perturbation_fn`].
pub struct FnPerturbation<F>(F);

impl<A, F> Perturbation<A> for FnPerturbation<F>
where
    F: Fn(PerturbationContext<'_, A>, &mut SimRng) -> RuleResult<A>,
{
    fn perturb(&self, ctx: PerturbationContext<'_, A>, rng: &mut SimRng) -> RuleResult<A> {
        (self.0)(ctx, rng)
    }
}

/// Wrap a closure as a [`Perturbation`].
pub fn perturbation_fn<A, F>(f: F) -> FnPerturbation<F>
where
    F: Fn(PerturbationContext<'_, A>, &mut SimRng) -> RuleResult<A>,
{
    FnPerturbation(f)
}

/// Input function backed by a closure. See [`input_fn`].
pub struct FnInput<F>(F);

impl<A, F> InputFunction<A> for FnInput<F>
where
    F: Fn(usize, &mut [A], &Topology, &mut SimRng) -> RuleResult<()>,
{
    fn apply(
        &self,
        timestep: usize,
        activities: &mut [A],
        topology: &Topology,
        rng: &mut SimRng,
    ) -> RuleResult<()> {
        (self.0)(timestep, activities, topology, rng)
    }
}

/// Wrap a closure as an [`InputFunction`].
pub fn input_fn<A, F>(f: F) -> FnInput<F>
where
    F: Fn(usize, &mut [A], &Topology, &mut SimRng) -> RuleResult<()>,
{
    FnInput(f)
}
