//! Reference runs checked against precomputed traces.

use netomata_automaton::models::HopfieldNet;
use netomata_automaton::rules::{ElementaryRule, TotalisticRule};
use netomata_automaton::{init, Alphabet, Evolution, ReversibleRule};
use netomata_core::{ring, Boundary};

const TOTALISTIC_K3_R777: &str = include_str!("fixtures/totalistic_k3_r777.txt");

fn parse_trace(trace: &str) -> Vec<Vec<u8>> {
    trace
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| line.bytes().map(|b| b - b'0').collect())
        .collect()
}

#[test]
fn test_totalistic_k3_rule_777_matches_reference_trace() {
    let expected = parse_trace(TOTALISTIC_K3_R777);
    assert_eq!(expected.len(), 101);

    let rule = TotalisticRule::new(3, 777).unwrap();
    let trajectory = Evolution::new(
        init::simple(200, 1u8, 0),
        ring(200, 1, Boundary::Periodic).unwrap(),
        &rule,
    )
    .timesteps(100)
    .run()
    .unwrap();

    assert_eq!(trajectory.activities.len(), 101);
    for (t, row) in trajectory.activities.iter() {
        assert_eq!(row, expected[t].as_slice(), "timestep {t} differs");
    }
    assert_eq!(&trajectory.activities[1][98..103], &[0, 1, 1, 1, 0]);
    let total: u32 = trajectory
        .activities
        .rows()
        .flatten()
        .map(|c| u32::from(*c))
        .sum();
    assert_eq!(total, 9080);
}

#[test]
fn test_reversible_rule_214_replays_backwards() {
    let topology = ring(63, 1, Boundary::Periodic).unwrap();
    let rule = ReversibleRule::new(ElementaryRule::new(214), Alphabet::Binary);
    let initial = init::simple(63, 1u8, 0);

    let forward = Evolution::new(initial.clone(), topology.clone(), &rule)
        .past_conditions(vec![initial.clone()])
        .timesteps(32)
        .run()
        .unwrap()
        .activities;
    assert_eq!(forward.len(), 33);
    let sums: Vec<u32> = forward
        .rows()
        .take(10)
        .map(|row| row.iter().map(|c| u32::from(*c)).sum())
        .collect();
    assert_eq!(sums, vec![1, 2, 5, 4, 6, 4, 9, 9, 8, 7]);

    let backward = Evolution::new(forward[31].to_vec(), topology, &rule)
        .past_conditions(vec![forward[32].to_vec()])
        .timesteps(62)
        .run()
        .unwrap()
        .activities;
    assert_eq!(backward.len(), 63);

    for k in 0..=31 {
        assert_eq!(&backward[k], &forward[31 - k], "backward step {k}");
    }
    // having passed the start, the replay runs forward again
    for j in 0..=30 {
        assert_eq!(&backward[32 + j], &forward[j], "replay step {j}");
    }
}

#[test]
fn test_reversible_without_past_conditions_fails_fast() {
    let rule = ReversibleRule::new(ElementaryRule::new(214), Alphabet::Binary);
    let err = Evolution::new(
        init::simple(9, 1u8, 0),
        ring(9, 1, Boundary::Periodic).unwrap(),
        &rule,
    )
    .timesteps(4)
    .run()
    .unwrap_err();
    assert!(matches!(
        err,
        netomata_automaton::EvolveError::MissingPastConditions {
            required: 1,
            supplied: 0,
            ..
        }
    ));
}

const ZERO: [u8; 30] = [
    0, 1, 1, 1, 0, //
    1, 0, 0, 0, 1, //
    1, 0, 0, 0, 1, //
    1, 0, 0, 0, 1, //
    1, 0, 0, 0, 1, //
    0, 1, 1, 1, 0,
];
const ONE: [u8; 30] = [
    0, 1, 1, 0, 0, //
    0, 0, 1, 0, 0, //
    0, 0, 1, 0, 0, //
    0, 0, 1, 0, 0, //
    0, 0, 1, 0, 0, //
    0, 0, 1, 0, 0,
];
const TWO: [u8; 30] = [
    1, 1, 1, 0, 0, //
    0, 0, 0, 1, 0, //
    0, 0, 0, 1, 0, //
    0, 1, 1, 0, 0, //
    1, 0, 0, 0, 0, //
    1, 1, 1, 1, 1,
];

const HALF_ZERO: [u8; 30] = [
    0, 1, 1, 1, 0, //
    1, 0, 0, 0, 1, //
    1, 0, 0, 0, 1, //
    0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0,
];
const HALF_ONE: [u8; 30] = [
    0, 0, 1, 0, 0, //
    0, 0, 1, 0, 0, //
    0, 0, 1, 0, 0, //
    0, 0, 1, 0, 0, //
    0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0,
];
const HALF_TWO: [u8; 30] = [
    0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, //
    0, 1, 1, 0, 0, //
    1, 0, 0, 0, 0, //
    1, 1, 1, 1, 1,
];

#[test]
fn test_hopfield_completes_half_masked_patterns() {
    let mut net = HopfieldNet::new(30);
    net.train(&[
        init::to_bipolar(&ZERO),
        init::to_bipolar(&ONE),
        init::to_bipolar(&TWO),
    ])
    .unwrap();

    let cases = [
        (HALF_ZERO, ZERO, 29),
        (HALF_ONE, ONE, 28),
        (HALF_TWO, TWO, 14),
    ];
    for (probe, pattern, settled_at) in cases {
        let expected = init::to_bipolar(&pattern);
        let trajectory = net.recall(init::to_bipolar(&probe), 155).unwrap();
        assert_eq!(trajectory.activities.len(), 156);
        for t in settled_at..=155 {
            assert_eq!(&trajectory.activities[t], expected.as_slice(), "timestep {t}");
        }
        assert_ne!(&trajectory.activities[settled_at - 1], expected.as_slice());
    }
}
