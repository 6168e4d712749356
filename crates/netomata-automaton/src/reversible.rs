//! Adapter that makes any activity rule reversible.
//!
//! The wrapped rule's output `f(x_{t-1})` is combined with the node's value
//! two steps back, `x_{t-2}`, using the group operation of the alphabet:
//!
//! ```text
//! x_t = f(x_{t-1}) - x_{t-2}   (mod k)     binary / cyclic
//! x_t = f(x_{t-1}) * x_{t-2}               bipolar
//! ```
//!
//! Because the combination is invertible in `x_{t-2}`, evolving the same
//! adapter from `(x_t, x_{t-1})` retraces the trajectory backwards. The
//! engine must be given at least one past condition vector; the adapter
//! reports that requirement so the run fails before the first step otherwise.

use crate::activity::{Alphabet, ReversibleActivity};
use crate::context::Context;
use crate::error::{RuleError, RuleResult};
use crate::random::SimRng;
use crate::rule::{ActivityRule, RuleId};

/// Reversible wrapper around an activity rule.
#[derive(Debug, Clone)]
pub struct ReversibleRule<R> {
    inner: R,
    alphabet: Alphabet,
}

impl<R> ReversibleRule<R> {
    pub fn new(inner: R, alphabet: Alphabet) -> Self {
        Self { inner, alphabet }
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<A, R> ActivityRule<A> for ReversibleRule<R>
where
    A: ReversibleActivity,
    R: ActivityRule<A>,
{
    fn id(&self) -> RuleId {
        RuleId::new(format!("reversible({})", self.inner.id()))
    }

    fn past_conditions_required(&self) -> usize {
        self.inner.past_conditions_required().max(1)
    }

    fn apply(&self, ctx: &Context<'_, A>, rng: &mut SimRng) -> RuleResult<A> {
        let candidate = self.inner.apply(ctx, rng)?;
        let prior = ctx.two_steps_prior().ok_or_else(|| {
            RuleError::msg(format!(
                "node {} has no activity two timesteps back",
                ctx.node_label
            ))
        })?;
        A::reverse_combine(&candidate, prior, self.alphabet)
    }
}

#[cfg(test)]
mod tests {
    use netomata_core::{NodeId, Topology};

    use super::*;
    use crate::past::PastConditions;
    use crate::random::seeded;
    use crate::rule::rule_fn;

    #[test]
    fn test_combines_with_two_steps_prior() {
        let always_one = rule_fn("one", |_: &Context<'_, u8>, _: &mut SimRng| Ok(1u8));
        let rule = ReversibleRule::new(always_one, Alphabet::Binary);
        assert_eq!(ActivityRule::<u8>::past_conditions_required(&rule), 1);
        assert_eq!(ActivityRule::<u8>::id(&rule).name(), "reversible(one)");

        let topology = Topology::new(2);
        let activities = vec![0u8, 0];
        let past = PastConditions::new(vec![vec![0u8, 1]]);
        let mut rng = seeded(0);
        let results: Vec<u8> = (0..2)
            .map(|i| {
                let ctx = Context {
                    node_label: NodeId(i),
                    node_activity: &activities[i],
                    neighbourhood: topology.resolve(NodeId(i)),
                    timestep: 1,
                    activities: &activities,
                    past_activities: &past,
                    topology: &topology,
                    rule_table: None,
                };
                rule.apply(&ctx, &mut rng).unwrap()
            })
            .collect();
        assert_eq!(results, vec![1, 0]);
    }

    #[test]
    fn test_missing_prior_is_a_rule_error() {
        let identity = rule_fn("id", |ctx: &Context<'_, u8>, _: &mut SimRng| {
            Ok(*ctx.node_activity)
        });
        let rule = ReversibleRule::new(identity, Alphabet::Binary);
        let topology = Topology::new(1);
        let activities = vec![1u8];
        let past = PastConditions::empty();
        let ctx = Context {
            node_label: NodeId(0),
            node_activity: &activities[0],
            neighbourhood: topology.resolve(NodeId(0)),
            timestep: 1,
            activities: &activities,
            past_activities: &past,
            topology: &topology,
            rule_table: None,
        };
        assert!(rule.apply(&ctx, &mut seeded(0)).is_err());
    }
}
