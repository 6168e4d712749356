//! Common perturbations: forced values and injected noise.

use netomata_core::NodeId;
use rand::Rng;

use crate::error::RuleResult;
use crate::random::SimRng;
use crate::rule::{Perturbation, PerturbationContext};

/// What a [`FixedNode`] forces its nodes to.
#[derive(Debug, Clone, PartialEq)]
pub enum Forced<A> {
    /// A constant, e.g. a boundary condition.
    Value(A),
    /// A fair coin flip between 0 and 1 at every timestep.
    RandomBit,
}

/// Overrides selected nodes on every timestep; other nodes pass through.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedNode<A> {
    nodes: Vec<NodeId>,
    forced: Forced<A>,
}

impl<A> FixedNode<A> {
    pub fn new(nodes: Vec<NodeId>, forced: Forced<A>) -> Self {
        Self { nodes, forced }
    }

    /// Pin one node to a constant.
    pub fn value(node: NodeId, value: A) -> Self {
        Self::new(vec![node], Forced::Value(value))
    }

    /// Flip a coin for one node.
    pub fn random_bit(node: NodeId) -> Self {
        Self::new(vec![node], Forced::RandomBit)
    }
}

impl<A> Perturbation<A> for FixedNode<A>
where
    A: Clone + From<u8>,
{
    fn perturb(&self, ctx: PerturbationContext<'_, A>, rng: &mut SimRng) -> RuleResult<A> {
        if !self.nodes.contains(&ctx.node_label) {
            return Ok(ctx.candidate);
        }
        Ok(match &self.forced {
            Forced::Value(v) => v.clone(),
            Forced::RandomBit => A::from(u8::from(rng.random_bool(0.5))),
        })
    }
}

/// Continuous noise pushing values away from one half.
///
/// Each candidate `v` becomes `v + sign(v - 1/2) * U * amount` with `U`
/// uniform on `[0, 1)`. At exactly `1/2` the value is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignedNoise {
    amount: f64,
}

impl SignedNoise {
    pub fn new(amount: f64) -> Self {
        Self { amount }
    }
}

impl Perturbation<f64> for SignedNoise {
    fn perturb(&self, ctx: PerturbationContext<'_, f64>, rng: &mut SimRng) -> RuleResult<f64> {
        let v = ctx.candidate;
        let u: f64 = rng.random();
        let sign = if v > 0.5 {
            1.0
        } else if v < 0.5 {
            -1.0
        } else {
            0.0
        };
        Ok(v + sign * u * self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded;

    fn ctx(node: usize, candidate: f64) -> PerturbationContext<'static, f64> {
        PerturbationContext {
            node_label: NodeId(node),
            candidate,
            previous: &0.0,
            timestep: 1,
        }
    }

    #[test]
    fn test_fixed_value_only_touches_listed_nodes() {
        let fixed = FixedNode::value(NodeId(1), 5.0);
        let mut rng = seeded(0);
        assert_eq!(fixed.perturb(ctx(0, 0.25), &mut rng).unwrap(), 0.25);
        assert_eq!(fixed.perturb(ctx(1, 0.25), &mut rng).unwrap(), 5.0);
    }

    #[test]
    fn test_random_bit_yields_both_values() {
        let fixed: FixedNode<u8> = FixedNode::random_bit(NodeId(0));
        let mut rng = seeded(1);
        let bits: Vec<u8> = (0..64)
            .map(|_| {
                let ctx = PerturbationContext {
                    node_label: NodeId(0),
                    candidate: 0u8,
                    previous: &0,
                    timestep: 1,
                };
                fixed.perturb(ctx, &mut rng).unwrap()
            })
            .collect();
        assert!(bits.contains(&0) && bits.contains(&1));
    }

    #[test]
    fn test_signed_noise_moves_away_from_half() {
        let noise = SignedNoise::new(0.02);
        let mut rng = seeded(2);
        let up = noise.perturb(ctx(0, 0.9), &mut rng).unwrap();
        let down = noise.perturb(ctx(0, 0.1), &mut rng).unwrap();
        assert!((0.9..0.92).contains(&up));
        assert!((0.08..=0.1).contains(&down));
        assert_eq!(noise.perturb(ctx(0, 0.5), &mut rng).unwrap(), 0.5);
    }
}
