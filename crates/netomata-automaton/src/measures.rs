//! Information-theoretic summaries of activity histories.
//!
//! Both measures use base-2 logarithms and only look at retained rows, so on
//! a compressed history they describe the trailing window.

use std::collections::HashMap;
use std::hash::Hash;

use crate::history::ActivityHistory;

/// Mean over nodes of the Shannon entropy of each node's value distribution over time.
pub fn average_node_entropy<A: Eq + Hash>(history: &ActivityHistory<A>) -> f64 {
    let rows: Vec<&[A]> = history.rows().collect();
    let Some(width) = rows.first().map(|r| r.len()) else {
        return 0.0;
    };
    if width == 0 {
        return 0.0;
    }
    let total: f64 = (0..width)
        .map(|node| entropy(rows.iter().map(|row| &row[node])))
        .sum();
    total / width as f64
}

/// Mean over nodes of the mutual information between a node's value at `t` and at `t + 1`.
pub fn average_mutual_information<A: Eq + Hash>(history: &ActivityHistory<A>) -> f64 {
    let rows: Vec<&[A]> = history.rows().collect();
    if rows.len() < 2 {
        return 0.0;
    }
    let width = rows[0].len();
    if width == 0 {
        return 0.0;
    }
    let total: f64 = (0..width)
        .map(|node| {
            let pairs = rows.windows(2).map(|w| (&w[0][node], &w[1][node]));
            mutual_information(pairs)
        })
        .sum();
    total / width as f64
}

/// Shannon entropy in bits of the empirical distribution of `values`.
pub fn entropy<T: Eq + Hash>(values: impl IntoIterator<Item = T>) -> f64 {
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut n = 0usize;
    for v in values {
        *counts.entry(v).or_default() += 1;
        n += 1;
    }
    entropy_of_counts(counts.values().copied(), n)
}

/// Mutual information in bits between the two coordinates of `pairs`.
pub fn mutual_information<X, Y>(pairs: impl IntoIterator<Item = (X, Y)>) -> f64
where
    X: Eq + Hash + Clone,
    Y: Eq + Hash + Clone,
{
    let mut joint: HashMap<(X, Y), usize> = HashMap::new();
    let mut xs: HashMap<X, usize> = HashMap::new();
    let mut ys: HashMap<Y, usize> = HashMap::new();
    let mut n = 0usize;
    for (x, y) in pairs {
        *xs.entry(x.clone()).or_default() += 1;
        *ys.entry(y.clone()).or_default() += 1;
        *joint.entry((x, y)).or_default() += 1;
        n += 1;
    }
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    joint
        .iter()
        .map(|((x, y), &c)| {
            let pxy = c as f64 / n;
            let px = xs[x] as f64 / n;
            let py = ys[y] as f64 / n;
            pxy * (pxy / (px * py)).log2()
        })
        .sum()
}

fn entropy_of_counts(counts: impl Iterator<Item = usize>, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    counts
        .filter(|c| *c > 0)
        .map(|c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum()
}
