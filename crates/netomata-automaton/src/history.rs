//! Activity and connectivity histories produced by an evolve run.
//!
//! Both stores are timestep-indexed. Without compression every entry stays
//! retrievable. With compression only a short trailing window is kept and
//! reads of older entries report [`HistoryError::Evicted`] instead of
//! returning placeholder data.

use std::collections::{BTreeMap, VecDeque};
use std::ops::{Index, Range};

use netomata_core::Topology;
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

/// Timestep-indexed activity vectors; entry 0 is the initial conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityHistory<A> {
    /// Timestep of the oldest retained entry.
    first: usize,
    entries: VecDeque<Vec<A>>,
    /// Maximum retained entries; `None` keeps everything.
    window: Option<usize>,
}

impl<A> ActivityHistory<A> {
    /// A history that keeps every entry.
    pub fn full(initial: Vec<A>) -> Self {
        Self {
            first: 0,
            entries: VecDeque::from([initial]),
            window: None,
        }
    }

    /// A history that keeps at most `window` trailing entries (at least one).
    pub fn windowed(initial: Vec<A>, window: usize) -> Self {
        Self {
            window: Some(window.max(1)),
            ..Self::full(initial)
        }
    }

    /// Logical length: one past the latest timestep, evicted entries included.
    pub fn len(&self) -> usize {
        self.first + self.entries.len()
    }

    /// Always false; entry 0 exists from construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether older entries are being dropped.
    pub fn is_compressed(&self) -> bool {
        self.window.is_some()
    }

    /// Timesteps still retrievable.
    pub fn retained_range(&self) -> Range<usize> {
        self.first..self.len()
    }

    /// Number of vectors held in memory.
    pub fn retained(&self) -> usize {
        self.entries.len()
    }

    /// Activities at `timestep`, or `None` if evicted or never reached.
    pub fn get(&self, timestep: usize) -> Option<&[A]> {
        self.try_get(timestep).ok()
    }

    /// Activities at `timestep`, distinguishing eviction from overrun.
    pub fn try_get(&self, timestep: usize) -> Result<&[A], HistoryError> {
        if timestep >= self.len() {
            return Err(HistoryError::OutOfRange {
                timestep,
                len: self.len(),
            });
        }
        if timestep < self.first {
            return Err(HistoryError::Evicted {
                timestep,
                retained: self.retained_range(),
            });
        }
        Ok(&self.entries[timestep - self.first])
    }

    /// The most recent vector.
    pub fn last(&self) -> &[A] {
        // Never empty: pushes only ever evict down to the window size, which is >= 1.
        self.entries.back().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Retained `(timestep, activities)` pairs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[A])> {
        self.entries
            .iter()
            .enumerate()
            .map(move |(i, v)| (self.first + i, v.as_slice()))
    }

    /// Retained vectors, oldest first.
    pub fn rows(&self) -> impl Iterator<Item = &[A]> {
        self.entries.iter().map(Vec::as_slice)
    }

    /// One node's retained activities over time.
    pub fn node_series(&self, node: usize) -> impl Iterator<Item = &A> {
        self.entries.iter().filter_map(move |v| v.get(node))
    }

    /// Owned retained vectors, oldest first.
    pub fn into_rows(self) -> Vec<Vec<A>> {
        self.entries.into()
    }

    pub(crate) fn push(&mut self, activities: Vec<A>) {
        self.entries.push_back(activities);
        if let Some(window) = self.window {
            while self.entries.len() > window {
                self.entries.pop_front();
                self.first += 1;
            }
        }
    }
}

impl<A> Index<usize> for ActivityHistory<A> {
    type Output = [A];

    /// # Panics
    ///
    /// Panics when the timestep is evicted or out of range.
    fn index(&self, timestep: usize) -> &[A] {
        match self.try_get(timestep) {
            Ok(row) => row,
            Err(err) => panic!("{err}"),
        }
    }
}

/// Which connectivity snapshots are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotRetention {
    /// One snapshot per recorded timestep.
    All,
    /// Only the most recent snapshot.
    Latest,
}

/// Timestep-indexed topology snapshots.
///
/// Snapshot `t` is the topology in force after timestep `t`, the one used to
/// compute `t + 1`. Snapshot 0 is the initial topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityHistory {
    snapshots: BTreeMap<usize, Topology>,
    retention: SnapshotRetention,
}

impl ConnectivityHistory {
    pub fn new(initial: Topology, retention: SnapshotRetention) -> Self {
        Self {
            snapshots: BTreeMap::from([(0, initial)]),
            retention,
        }
    }

    pub fn retention(&self) -> SnapshotRetention {
        self.retention
    }

    /// Number of snapshots held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, timestep: usize) -> Option<&Topology> {
        self.snapshots.get(&timestep)
    }

    /// The most recent snapshot and its timestep.
    pub fn latest(&self) -> Option<(usize, &Topology)> {
        self.snapshots.iter().next_back().map(|(t, topo)| (*t, topo))
    }

    /// Recorded timesteps in ascending order.
    pub fn timesteps(&self) -> impl Iterator<Item = usize> + '_ {
        self.snapshots.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Topology)> {
        self.snapshots.iter().map(|(t, topo)| (*t, topo))
    }

    pub(crate) fn record(&mut self, timestep: usize, topology: Topology) {
        if self.retention == SnapshotRetention::Latest {
            self.snapshots.clear();
        }
        self.snapshots.insert(timestep, topology);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_history_keeps_everything() {
        let mut history = ActivityHistory::full(vec![0u8]);
        for t in 1..=5 {
            history.push(vec![t]);
        }
        assert_eq!(history.len(), 6);
        assert_eq!(history.retained_range(), 0..6);
        assert_eq!(&history[3], &[3]);
        assert_eq!(history.last(), &[5]);
    }

    #[test]
    fn test_windowed_history_signals_eviction() {
        let mut history = ActivityHistory::windowed(vec![0u8], 2);
        for t in 1..=10 {
            history.push(vec![t]);
        }
        assert_eq!(history.len(), 11);
        assert_eq!(history.retained(), 2);
        assert_eq!(history.retained_range(), 9..11);
        assert_eq!(history.get(10), Some(&[10][..]));
        assert_eq!(history.get(3), None);
        assert_eq!(
            history.try_get(3),
            Err(HistoryError::Evicted {
                timestep: 3,
                retained: 9..11
            })
        );
        assert_eq!(
            history.try_get(11),
            Err(HistoryError::OutOfRange {
                timestep: 11,
                len: 11
            })
        );
    }

    #[test]
    #[should_panic(expected = "evicted")]
    fn test_index_panics_on_evicted_entry() {
        let mut history = ActivityHistory::windowed(vec![0u8], 1);
        history.push(vec![1]);
        let _ = &history[0];
    }

    #[test]
    fn test_node_series_reads_one_column() {
        let mut history = ActivityHistory::full(vec![1u8, 2]);
        history.push(vec![3, 4]);
        let series: Vec<u8> = history.node_series(1).copied().collect();
        assert_eq!(series, vec![2, 4]);
    }

    #[test]
    fn test_latest_only_snapshots() {
        let mut history = ConnectivityHistory::new(Topology::new(2), SnapshotRetention::Latest);
        history.record(1, Topology::new(2));
        history.record(2, Topology::new(2));
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().map(|(t, _)| t), Some(2));
        assert!(history.get(0).is_none());
    }
}
