//! Ready-made activity rules for symbolic automata.
//!
//! All rules here work on `u8` activities and read the neighbourhood in
//! resolve order, so on a ring built with radius `r` the neighbourhood of
//! node `i` is `i - r ..= i + r`.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::context::Context;
use crate::error::{RuleError, RuleResult};
use crate::random::SimRng;
use crate::rule::{ActivityRule, RuleId};

/// Wolfram's elementary rules over a `[left, self, right]` neighbourhood.
///
/// The new value is bit `4 * left + 2 * self + right` of the rule number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementaryRule {
    rule: u8,
}

impl ElementaryRule {
    pub fn new(rule: u8) -> Self {
        Self { rule }
    }

    pub fn number(&self) -> u8 {
        self.rule
    }

    /// Output for one `(left, centre, right)` triple.
    pub fn output(&self, left: u8, centre: u8, right: u8) -> u8 {
        let index = 4 * (left & 1) + 2 * (centre & 1) + (right & 1);
        (self.rule >> index) & 1
    }
}

impl ActivityRule<u8> for ElementaryRule {
    fn id(&self) -> RuleId {
        RuleId::new(format!("rule_{}", self.rule))
    }

    fn apply(&self, ctx: &Context<'_, u8>, _rng: &mut SimRng) -> RuleResult<u8> {
        let mut neighbours = ctx.neighbourhood_activities();
        match (neighbours.next(), neighbours.next(), neighbours.next(), neighbours.next()) {
            (Some(&l), Some(&c), Some(&r), None) => Ok(self.output(l, c, r)),
            _ => Err(RuleError::msg(format!(
                "elementary rule needs exactly 3 neighbours, node {} has {}",
                ctx.node_label,
                ctx.degree()
            ))),
        }
    }
}

/// Totalistic rule over `k` colours.
///
/// The new value is the digit of the rule number, written in base `k`, at the
/// position given by the neighbourhood sum (least significant digit first).
/// Sums beyond the last digit map to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalisticRule {
    k: u8,
    rule: u64,
}

impl TotalisticRule {
    pub fn new(k: u8, rule: u64) -> RuleResult<Self> {
        if k < 2 {
            return Err(RuleError::msg(format!("totalistic rule needs k >= 2, got {k}")));
        }
        Ok(Self { k, rule })
    }

    /// Output for a neighbourhood sum.
    pub fn output(&self, sum: u32) -> u8 {
        match u64::from(self.k).checked_pow(sum) {
            Some(place) => ((self.rule / place) % u64::from(self.k)) as u8,
            None => 0,
        }
    }
}

impl ActivityRule<u8> for TotalisticRule {
    fn id(&self) -> RuleId {
        RuleId::new(format!("totalistic_k{}_{}", self.k, self.rule))
    }

    fn apply(&self, ctx: &Context<'_, u8>, _rng: &mut SimRng) -> RuleResult<u8> {
        let sum: u32 = ctx.neighbourhood_activities().map(|a| u32::from(*a)).sum();
        Ok(self.output(sum))
    }
}

/// Explicit lookup from the neighbourhood tuple to the new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRule {
    table: HashMap<Vec<u8>, u8>,
    fallback: Option<u8>,
}

impl TableRule {
    pub fn new(table: HashMap<Vec<u8>, u8>) -> Self {
        Self {
            table,
            fallback: None,
        }
    }

    /// Value for neighbourhoods missing from the table; without one they are an error.
    pub fn with_fallback(mut self, value: u8) -> Self {
        self.fallback = Some(value);
        self
    }

    pub fn get(&self, neighbourhood: &[u8]) -> Option<u8> {
        self.table.get(neighbourhood).copied().or(self.fallback)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl ActivityRule<u8> for TableRule {
    fn apply(&self, ctx: &Context<'_, u8>, _rng: &mut SimRng) -> RuleResult<u8> {
        let key: Vec<u8> = ctx.neighbourhood_activities().copied().collect();
        self.get(&key)
            .ok_or_else(|| RuleError::msg(format!("no table entry for neighbourhood {key:?}")))
    }
}

/// Output of [`random_rule_table`].
#[derive(Debug, Clone)]
pub struct RandomTable {
    pub rule: TableRule,
    /// Fraction of entries that map to a non-quiescent state.
    pub actual_lambda: f64,
    pub quiescent_state: u8,
}

/// Parameters of [`random_rule_table`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambdaParams {
    /// Target probability that an entry maps to a non-quiescent state.
    pub lambda: f64,
    /// Number of states.
    pub k: u8,
    /// Neighbourhood radius; tables cover `2r + 1` cells.
    pub r: usize,
    /// Uniform neighbourhoods `(s, .., s)` map to `s`.
    pub strong_quiescence: bool,
    /// A neighbourhood and its mirror image share an entry.
    pub isotropic: bool,
}

const MAX_TABLE_ENTRIES: usize = 1 << 22;

/// Random rule table with Langton's lambda parameter.
///
/// A quiescent state is drawn uniformly; every other entry maps to it with
/// probability `1 - lambda` and otherwise to a uniformly drawn non-quiescent
/// state.
pub fn random_rule_table(params: LambdaParams, rng: &mut SimRng) -> RuleResult<RandomTable> {
    let LambdaParams {
        lambda,
        k,
        r,
        strong_quiescence,
        isotropic,
    } = params;
    let (width, entries) = table_shape(lambda, k, r)?;

    let quiescent_state = rng.random_range(0..k);
    let mut table: HashMap<Vec<u8>, u8> = HashMap::with_capacity(entries);
    for index in 0..entries {
        let neighbourhood = digits(index, k, width);
        if table.contains_key(&neighbourhood) {
            continue;
        }
        let uniform = neighbourhood.iter().all(|s| *s == neighbourhood[0]);
        let output = if strong_quiescence && uniform {
            neighbourhood[0]
        } else if rng.random_bool(1.0 - lambda) {
            quiescent_state
        } else {
            let other = rng.random_range(0..k - 1);
            if other >= quiescent_state {
                other + 1
            } else {
                other
            }
        };
        if isotropic {
            let mirrored: Vec<u8> = neighbourhood.iter().rev().copied().collect();
            table.insert(mirrored, output);
        }
        table.insert(neighbourhood, output);
    }

    let quiescent = table.values().filter(|v| **v == quiescent_state).count();
    let actual_lambda = (entries - quiescent) as f64 / entries as f64;
    Ok(RandomTable {
        rule: TableRule::new(table),
        actual_lambda,
        quiescent_state,
    })
}

/// Moves an existing table towards a new lambda.
///
/// Raising lambda rewrites randomly chosen quiescent entries to random
/// non-quiescent states; lowering it sends randomly chosen non-quiescent
/// entries back to `quiescent_state`. Entries on the other side of the
/// quiescent line are left alone, so walking through increasing lambdas
/// only ever adds transitions. Uniform neighbourhoods stay fixed under
/// strong quiescence, and under isotropy a neighbourhood and its mirror
/// image change together. Neighbourhoods missing from `rule` start out
/// quiescent.
pub fn table_walk_through(
    rule: &TableRule,
    params: LambdaParams,
    quiescent_state: u8,
    rng: &mut SimRng,
) -> RuleResult<RandomTable> {
    let LambdaParams {
        lambda,
        k,
        r,
        strong_quiescence,
        isotropic,
    } = params;
    let (width, entries) = table_shape(lambda, k, r)?;
    if quiescent_state >= k {
        return Err(RuleError::msg(format!(
            "quiescent state {quiescent_state} is not below k={k}"
        )));
    }

    let mut table: HashMap<Vec<u8>, u8> = HashMap::with_capacity(entries);
    for index in 0..entries {
        let neighbourhood = digits(index, k, width);
        let output = rule
            .get(&neighbourhood)
            .filter(|v| *v < k)
            .unwrap_or(quiescent_state);
        table.insert(neighbourhood, output);
    }

    let mut active = table.values().filter(|v| **v != quiescent_state).count();
    let target = lambda * entries as f64;
    let raising = (active as f64) < target;

    // one candidate per mirror pair when isotropic
    let mut candidates: Vec<Vec<u8>> = table
        .iter()
        .filter(|(neighbourhood, output)| {
            let uniform = neighbourhood.iter().all(|s| *s == neighbourhood[0]);
            let canonical = !isotropic || neighbourhood.iter().le(neighbourhood.iter().rev());
            canonical
                && !(strong_quiescence && uniform)
                && ((**output == quiescent_state) == raising)
        })
        .map(|(neighbourhood, _)| neighbourhood.clone())
        .collect();
    candidates.sort();
    candidates.shuffle(rng);

    for neighbourhood in candidates {
        let reached = if raising {
            active as f64 >= target
        } else {
            active as f64 <= target
        };
        if reached {
            break;
        }
        let output = if raising {
            let other = rng.random_range(0..k - 1);
            if other >= quiescent_state {
                other + 1
            } else {
                other
            }
        } else {
            quiescent_state
        };
        let mirrored: Vec<u8> = neighbourhood.iter().rev().copied().collect();
        let mut keys = vec![neighbourhood];
        if isotropic && mirrored != keys[0] {
            keys.push(mirrored);
        }
        for key in keys {
            if let Some(slot) = table.get_mut(&key) {
                let was_active = *slot != quiescent_state;
                *slot = output;
                match (was_active, output != quiescent_state) {
                    (false, true) => active += 1,
                    (true, false) => active -= 1,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!(
        target_lambda = lambda,
        actual_lambda = active as f64 / entries as f64,
        "table_walk_through"
    );
    Ok(RandomTable {
        rule: TableRule::new(table),
        actual_lambda: active as f64 / entries as f64,
        quiescent_state,
    })
}

/// Checks lambda and k, and returns the neighbourhood width and table size.
fn table_shape(lambda: f64, k: u8, r: usize) -> RuleResult<(usize, usize)> {
    if !(0.0..=1.0).contains(&lambda) {
        return Err(RuleError::msg(format!("lambda must be in [0, 1], got {lambda}")));
    }
    if k < 2 {
        return Err(RuleError::msg(format!("need at least 2 states, got {k}")));
    }
    let width = 2 * r + 1;
    let entries = u32::try_from(width)
        .ok()
        .and_then(|w| usize::from(k).checked_pow(w))
        .filter(|n| *n <= MAX_TABLE_ENTRIES)
        .ok_or_else(|| RuleError::msg(format!("table for k={k}, r={r} is too large")))?;
    Ok((width, entries))
}

/// `width` base-`k` digits of `index`, most significant first.
fn digits(mut index: usize, k: u8, width: usize) -> Vec<u8> {
    let k = usize::from(k);
    let mut out = vec![0u8; width];
    for slot in out.iter_mut().rev() {
        *slot = (index % k) as u8;
        index /= k;
    }
    out
}
