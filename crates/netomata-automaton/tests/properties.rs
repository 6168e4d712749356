//! Property tests for the evolution engine.

use netomata_automaton::perturbation::SignedNoise;
use netomata_automaton::rules::ElementaryRule;
use netomata_automaton::{
    init, rule_fn, seeded, Alphabet, Context, Evolution, HistoryError, RandomSequential,
    ReversibleRule, RuleResult, SimRng,
};
use netomata_core::{ring, Boundary};
use proptest::prelude::*;

fn arb_boundary() -> impl Strategy<Value = Boundary> {
    prop_oneof![Just(Boundary::Periodic), Just(Boundary::Open)]
}

/// Rule 30 written as a polynomial so it extends to values in `[0, 1]`.
fn continuous_rule_30(ctx: &Context<'_, f64>, _rng: &mut SimRng) -> RuleResult<f64> {
    let n: Vec<f64> = ctx.neighbourhood_activities().copied().collect();
    let [p, q, r] = n[..] else {
        return Ok(*ctx.node_activity);
    };
    let either = q + r - q * r;
    Ok((p + either - 2.0 * p * either).clamp(0.0, 1.0))
}

proptest! {
    #[test]
    fn history_has_one_entry_per_timestep(
        n in 3usize..40,
        rule in any::<u8>(),
        timesteps in 0usize..30,
        boundary in arb_boundary(),
    ) {
        let eca = ElementaryRule::new(rule);
        let trajectory = Evolution::new(
            init::simple(n, 1u8, 0),
            ring(n, 1, boundary).unwrap(),
            &eca,
        )
        .timesteps(timesteps)
        .run();
        // open rings leave edge cells with two neighbours, which the rule rejects
        match (boundary, trajectory) {
            (_, Ok(t)) => prop_assert_eq!(t.activities.len(), timesteps + 1),
            (Boundary::Open, Err(_)) => prop_assert!(timesteps > 0),
            (Boundary::Periodic, Err(e)) => prop_assert!(false, "periodic run failed: {e}"),
        }
    }

    #[test]
    fn same_seed_same_trajectory(
        n in 3usize..30,
        rule in any::<u8>(),
        seed in any::<u64>(),
    ) {
        let eca = ElementaryRule::new(rule);
        let topology = ring(n, 1, Boundary::Periodic).unwrap();
        let initial = init::random(n, 2, &mut seeded(seed));
        let run = || {
            Evolution::new(initial.clone(), topology.clone(), &eca)
                .update_order(RandomSequential)
                .timesteps(15)
                .seed(seed)
                .run()
                .unwrap()
        };
        prop_assert_eq!(run(), run());
    }

    #[test]
    fn noisy_continuous_run_is_reproducible(
        n in 3usize..25,
        amount in 0.0f64..0.2,
        seed in any::<u64>(),
    ) {
        let rule = rule_fn("continuous_rule_30", continuous_rule_30);
        let noise = SignedNoise::new(amount);
        let run = || {
            Evolution::new(
                init::simple(n, 1.0f64, 0.0),
                ring(n, 1, Boundary::Periodic).unwrap(),
                &rule,
            )
            .perturbation(&noise)
            .timesteps(20)
            .seed(seed)
            .run()
            .unwrap()
        };
        let first = run();
        prop_assert!(first.activities.rows().flatten().all(|v| v.is_finite()));
        prop_assert_eq!(first, run());
    }

    #[test]
    fn reversible_runs_retrace_their_steps(
        rule in any::<u8>(),
        n in 4usize..40,
        timesteps in 2usize..25,
        seed in any::<u64>(),
    ) {
        let mut rng = seeded(seed);
        let initial = init::random(n, 2, &mut rng);
        let past = init::random(n, 2, &mut rng);
        let topology = ring(n, 1, Boundary::Periodic).unwrap();
        let reversible = ReversibleRule::new(ElementaryRule::new(rule), Alphabet::Binary);

        let forward = Evolution::new(initial, topology.clone(), &reversible)
            .past_conditions(vec![past])
            .timesteps(timesteps)
            .run()
            .unwrap()
            .activities;
        let backward = Evolution::new(forward[timesteps - 1].to_vec(), topology, &reversible)
            .past_conditions(vec![forward[timesteps].to_vec()])
            .timesteps(timesteps - 1)
            .run()
            .unwrap()
            .activities;

        for k in 0..timesteps {
            prop_assert_eq!(&backward[k], &forward[timesteps - 1 - k]);
        }
    }

    #[test]
    fn compression_keeps_a_bounded_window(
        n in 3usize..20,
        rule in any::<u8>(),
        timesteps in 2usize..200,
    ) {
        let eca = ElementaryRule::new(rule);
        let topology = ring(n, 1, Boundary::Periodic).unwrap();
        let initial = init::simple(n, 1u8, 0);

        let full = Evolution::new(initial.clone(), topology.clone(), &eca)
            .timesteps(timesteps)
            .run()
            .unwrap();
        let compressed = Evolution::new(initial, topology, &eca)
            .timesteps(timesteps)
            .compression(true)
            .run()
            .unwrap();

        let history = &compressed.activities;
        prop_assert!(history.is_compressed());
        prop_assert_eq!(history.len(), timesteps + 1);
        prop_assert!(history.retained() <= 2);
        prop_assert_eq!(history.last(), full.activities.last());
        prop_assert!(history.get(0).is_none());
        let evicted = matches!(history.try_get(0), Err(HistoryError::Evicted { .. }));
        prop_assert!(evicted);
        prop_assert!(compressed.connectivities.len() <= 1);
    }

    #[test]
    fn compressed_reversible_run_keeps_its_past_window(
        rule in any::<u8>(),
        n in 4usize..30,
        timesteps in 2usize..120,
        seed in any::<u64>(),
    ) {
        let mut rng = seeded(seed);
        let initial = init::random(n, 2, &mut rng);
        let past = init::random(n, 2, &mut rng);
        let topology = ring(n, 1, Boundary::Periodic).unwrap();
        let reversible = ReversibleRule::new(ElementaryRule::new(rule), Alphabet::Binary);

        let run = |compression: bool| {
            Evolution::new(initial.clone(), topology.clone(), &reversible)
                .past_conditions(vec![past.clone()])
                .timesteps(timesteps)
                .compression(compression)
                .run()
                .unwrap()
                .activities
        };
        let full = run(false);
        let compressed = run(true);

        prop_assert!(compressed.is_compressed());
        prop_assert_eq!(compressed.len(), timesteps + 1);
        prop_assert_eq!(compressed.retained(), 2);
        prop_assert_eq!(compressed.last(), full.last());
        prop_assert_eq!(compressed.get(timesteps - 1), full.get(timesteps - 1));
    }
}
