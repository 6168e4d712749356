//! Rolling window of activity vectors older than the previous timestep.

use std::collections::VecDeque;

/// The last `k` activity vectors before the previous one.
///
/// When timestep `t` is computed, [`PastConditions::latest`] is the vector of
/// timestep `t - 2`. Before the first step it is the last vector the caller
/// supplied. The capacity is fixed at construction; pushing into a full window
/// drops the oldest vector.
#[derive(Debug, Clone, PartialEq)]
pub struct PastConditions<A> {
    window: VecDeque<Vec<A>>,
    capacity: usize,
}

impl<A> PastConditions<A> {
    /// A window seeded with the given vectors, oldest first.
    pub fn new(initial: Vec<Vec<A>>) -> Self {
        let capacity = initial.len();
        Self {
            window: initial.into(),
            capacity,
        }
    }

    /// A window that retains nothing.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Number of vectors the window holds at most.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of vectors currently held.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Most recent vector.
    pub fn latest(&self) -> Option<&[A]> {
        self.window.back().map(Vec::as_slice)
    }

    /// Vector `back` positions from the end; `back = 1` is [`PastConditions::latest`].
    pub fn get(&self, back: usize) -> Option<&[A]> {
        let len = self.window.len();
        if back == 0 || back > len {
            return None;
        }
        self.window.get(len - back).map(Vec::as_slice)
    }

    /// Activity of one node in the vector `back` positions from the end.
    pub fn node_activity(&self, node: usize, back: usize) -> Option<&A> {
        self.get(back).and_then(|v| v.get(node))
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &[A]> {
        self.window.iter().map(Vec::as_slice)
    }

    /// Append a vector, evicting the oldest when full.
    ///
    /// Returns the vector that left the window, which is `vector` itself when
    /// the capacity is zero.
    pub fn push(&mut self, vector: Vec<A>) -> Option<Vec<A>> {
        if self.capacity == 0 {
            return Some(vector);
        }
        let evicted = if self.window.len() == self.capacity {
            self.window.pop_front()
        } else {
            None
        };
        self.window.push_back(vector);
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_is_last_supplied() {
        let past = PastConditions::new(vec![vec![1], vec![2]]);
        assert_eq!(past.latest(), Some(&[2][..]));
        assert_eq!(past.get(2), Some(&[1][..]));
        assert_eq!(past.get(0), None);
        assert_eq!(past.get(3), None);
    }

    #[test]
    fn test_push_evicts_oldest_at_capacity() {
        let mut past = PastConditions::new(vec![vec![1], vec![2]]);
        assert_eq!(past.push(vec![3]), Some(vec![1]));
        assert_eq!(past.iter().collect::<Vec<_>>(), vec![&[2][..], &[3][..]]);
        assert_eq!(past.len(), past.capacity());
    }

    #[test]
    fn test_zero_capacity_retains_nothing() {
        let mut past: PastConditions<u8> = PastConditions::empty();
        assert_eq!(past.push(vec![9]), Some(vec![9]));
        assert!(past.is_empty());
        assert_eq!(past.latest(), None);
    }

    #[test]
    fn test_node_activity_reads_one_cell() {
        let past = PastConditions::new(vec![vec![5, 6, 7]]);
        assert_eq!(past.node_activity(2, 1), Some(&7));
        assert_eq!(past.node_activity(3, 1), None);
    }
}
