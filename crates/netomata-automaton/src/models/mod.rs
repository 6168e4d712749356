//! Concrete models built purely on the extension points.
//!
//! Each model supplies a topology, an activity rule and, where it needs them,
//! an update order, a connectivity rule or an input function. None of them
//! reach into the engine.

pub mod fungal;
pub mod hopfield;
pub mod turing;

pub use fungal::{FungalGrowth, GrowPrune, ResourceFlow};
pub use hopfield::{HopfieldNet, HopfieldRule};
pub use turing::{Head, HeadMover, HeadRule, TapeCell, TapeRow, TuringMachine};
