//! Head-centric Turing machine on a periodic 1-D tape.
//!
//! Every tape cell is a node fed by `[left, self, right]`. The cell carrying
//! the head looks up `(head state, symbol)` in the [`RuleTable`] supplied
//! through the context, writes the new symbol and marks the pending move.
//! The input function then carries the head to the neighbour in that
//! direction, so each timestep executes exactly one transition.

use netomata_core::{ring, Boundary, Topology};
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::{EvolveError, EvolveResult, RuleError, RuleResult};
use crate::evolve::{Evolution, Trajectory};
use crate::history::ActivityHistory;
use crate::random::SimRng;
use crate::rule::{ActivityRule, InputFunction, RuleId};
use crate::rule_table::{Direction, RuleTable};

/// The read/write head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Head {
    pub state: u32,
    /// Move decided this timestep, not yet carried out.
    pub pending: Option<Direction>,
}

/// Activity of one tape cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TapeCell {
    pub symbol: u32,
    pub head: Option<Head>,
}

/// One timestep of the tape as plain symbols plus head position and state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeRow {
    pub symbols: Vec<u32>,
    pub head: Option<(usize, u32)>,
}

impl TapeRow {
    pub fn from_cells(cells: &[TapeCell]) -> Self {
        Self {
            symbols: cells.iter().map(|c| c.symbol).collect(),
            head: cells
                .iter()
                .enumerate()
                .find_map(|(i, c)| c.head.map(|h| (i, h.state))),
        }
    }
}

/// Machine description: tape, table and where the head starts.
#[derive(Debug, Clone, PartialEq)]
pub struct TuringMachine {
    tape: Vec<u32>,
    table: RuleTable,
    initial_state: u32,
    initial_position: usize,
}

impl TuringMachine {
    pub fn new(
        tape: Vec<u32>,
        table: RuleTable,
        initial_state: u32,
        initial_position: usize,
    ) -> EvolveResult<Self> {
        if initial_position >= tape.len() {
            return Err(EvolveError::configuration(format!(
                "head position {initial_position} is off a tape of {} cells",
                tape.len()
            )));
        }
        Ok(Self {
            tape,
            table,
            initial_state,
            initial_position,
        })
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn topology(&self) -> EvolveResult<Topology> {
        Ok(ring(self.tape.len(), 1, Boundary::Periodic)?)
    }

    pub fn initial_conditions(&self) -> Vec<TapeCell> {
        self.tape
            .iter()
            .enumerate()
            .map(|(i, &symbol)| TapeCell {
                symbol,
                head: (i == self.initial_position).then_some(Head {
                    state: self.initial_state,
                    pending: None,
                }),
            })
            .collect()
    }

    /// Execute `timesteps` transitions.
    pub fn run(&self, timesteps: usize) -> EvolveResult<Trajectory<TapeCell>> {
        Evolution::new(self.initial_conditions(), self.topology()?, &HeadRule)
            .input_function(&HeadMover)
            .rule_table(&self.table)
            .timesteps(timesteps)
            .run()
    }

    /// Flatten a history into symbol rows and head positions.
    pub fn tape_history(history: &ActivityHistory<TapeCell>) -> Vec<TapeRow> {
        history.rows().map(TapeRow::from_cells).collect()
    }
}

/// Executes one table transition on the cell holding the head.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadRule;

impl ActivityRule<TapeCell> for HeadRule {
    fn id(&self) -> RuleId {
        RuleId::new("turing_head")
    }

    fn apply(&self, ctx: &Context<'_, TapeCell>, _rng: &mut SimRng) -> RuleResult<TapeCell> {
        let cell = *ctx.node_activity;
        let Some(head) = cell.head else {
            return Ok(cell);
        };
        let table = ctx
            .rule_table
            .ok_or_else(|| RuleError::msg("turing head needs a rule table"))?;
        let instruction = table.lookup(head.state, cell.symbol).ok_or_else(|| {
            RuleError::msg(format!(
                "no transition for state {} reading {}",
                head.state, cell.symbol
            ))
        })?;
        Ok(TapeCell {
            symbol: instruction.write,
            head: Some(Head {
                state: instruction.next_state,
                pending: Some(instruction.direction),
            }),
        })
    }
}

/// Carries out the pending move of the head.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadMover;

impl InputFunction<TapeCell> for HeadMover {
    fn apply(
        &self,
        _timestep: usize,
        activities: &mut [TapeCell],
        topology: &Topology,
        _rng: &mut SimRng,
    ) -> RuleResult<()> {
        let Some((from, head)) = activities
            .iter()
            .enumerate()
            .find_map(|(i, c)| c.head.filter(|h| h.pending.is_some()).map(|h| (i, h)))
        else {
            return Ok(());
        };
        let neighbours = topology.resolve(from.into());
        if neighbours.len() != 3 {
            return Err(RuleError::msg(format!(
                "tape cell {from} needs [left, self, right] neighbours, has {}",
                neighbours.len()
            )));
        }
        let to = match head.pending {
            Some(Direction::Left) => neighbours[0].source.index(),
            Some(Direction::Right) => neighbours[2].source.index(),
            Some(Direction::Stay) | None => from,
        };
        activities[from].head = None;
        activities[to].head = Some(Head {
            state: head.state,
            pending: None,
        });
        Ok(())
    }
}
