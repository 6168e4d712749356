//! Network automata: cellular automata whose neighbour relation is an
//! arbitrary, possibly time-varying, directed graph.
//!
//! A run starts from a vector of node activities and a [`Topology`]. Every
//! timestep the engine asks an [`UpdateOrder`] which nodes to update, builds a
//! [`Context`] for each and calls the [`ActivityRule`]; an optional
//! [`Perturbation`] gets the last word on each value. An [`InputFunction`]
//! may then touch the whole vector, and a [`ConnectivityRule`] may rewrite
//! the topology for the next step.
//!
//! ## The state model
//!
//! ```text
//! Trajectory = {
//!     activities:     ActivityHistory,      // timestep -> Vec<A>, entry 0 = initial
//!     connectivities: ConnectivityHistory,  // timestep -> Topology, entry 0 = initial
//! }
//! ```
//!
//! `activities.len()` is always `timesteps + 1`. With compression enabled only
//! a short trailing window stays in memory and reads outside it report
//! [`HistoryError::Evicted`].
//!
//! All randomness comes from one [`SimRng`] seeded per run, so a run is fully
//! reproducible from its seed.
//!
//! [`Topology`]: netomata_core::Topology

mod activity;
mod config;
mod context;
mod error;
mod evolve;
mod history;
pub mod init;
pub mod measures;
pub mod models;
mod order;
mod past;
pub mod perturbation;
mod random;
mod reversible;
mod rule;
mod rule_table;
pub mod rules;

pub use activity::{Activity, Alphabet, ReversibleActivity};
pub use config::EvolveConfig;
pub use context::Context;
pub use error::{EvolveError, EvolveResult, HistoryError, Hook, RuleError, RuleResult};
pub use evolve::{evolve, Evolution, Trajectory};
pub use history::{ActivityHistory, ConnectivityHistory, SnapshotRetention};
pub use order::{
    order_fn, Cyclic, FnOrder, RandomSequential, Sequential, Synchronous, UpdateMode, UpdateOrder,
};
pub use past::PastConditions;
pub use random::{seeded, SimRng, DEFAULT_SEED};
pub use reversible::ReversibleRule;
pub use rule::{
    connectivity_fn, input_fn, perturbation_fn, rule_fn, ActivityRule, ConnectivityContext,
    ConnectivityRule, FnConnectivity, FnInput, FnPerturbation, FnRule, InputFunction,
    Perturbation, PerturbationContext, RuleId,
};
pub use rule_table::{Direction, Instruction, RuleTable, TableEntry};
