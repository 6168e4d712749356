//! Head/tape transition tables.
//!
//! The engine only carries a [`RuleTable`] through to rule contexts; what the
//! entries mean is up to the rule reading them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Head movement after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Stay,
}

/// Right-hand side of a table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub next_state: u32,
    pub write: u32,
    pub direction: Direction,
}

/// One row of a table in its serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub state: u32,
    pub symbol: u32,
    #[serde(flatten)]
    pub instruction: Instruction,
}

/// Lookup from `(state, symbol)` to the instruction to execute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TableEntry>", into = "Vec<TableEntry>")]
pub struct RuleTable {
    entries: BTreeMap<(u32, u32), Instruction>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the entry for `(state, symbol)`.
    pub fn insert(
        &mut self,
        state: u32,
        symbol: u32,
        next_state: u32,
        write: u32,
        direction: Direction,
    ) -> &mut Self {
        self.entries.insert(
            (state, symbol),
            Instruction {
                next_state,
                write,
                direction,
            },
        );
        self
    }

    /// Builder form of [`RuleTable::insert`].
    pub fn with(
        mut self,
        state: u32,
        symbol: u32,
        next_state: u32,
        write: u32,
        direction: Direction,
    ) -> Self {
        self.insert(state, symbol, next_state, write, direction);
        self
    }

    pub fn lookup(&self, state: u32, symbol: u32) -> Option<&Instruction> {
        self.entries.get(&(state, symbol))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by `(state, symbol)`.
    pub fn entries(&self) -> impl Iterator<Item = TableEntry> + '_ {
        self.entries.iter().map(|(&(state, symbol), &instruction)| TableEntry {
            state,
            symbol,
            instruction,
        })
    }
}

impl From<Vec<TableEntry>> for RuleTable {
    fn from(rows: Vec<TableEntry>) -> Self {
        let entries = rows
            .into_iter()
            .map(|row| ((row.state, row.symbol), row.instruction))
            .collect();
        Self { entries }
    }
}

impl From<RuleTable> for Vec<TableEntry> {
    fn from(table: RuleTable) -> Self {
        table.entries().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_replace() {
        let mut table = RuleTable::new();
        table.insert(1, 0, 2, 1, Direction::Right);
        table.insert(1, 0, 3, 0, Direction::Left);

        assert_eq!(table.len(), 1);
        let instruction = table.lookup(1, 0).unwrap();
        assert_eq!(instruction.next_state, 3);
        assert_eq!(instruction.direction, Direction::Left);
        assert!(table.lookup(2, 0).is_none());
    }

    #[test]
    fn test_serializes_as_flat_rows() {
        let table = RuleTable::new().with(1, 1, 1, 0, Direction::Right);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"[{"state":1,"symbol":1,"next_state":1,"write":0,"direction":"right"}]"#
        );
        let parsed: RuleTable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, table);
    }
}
