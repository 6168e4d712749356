//! Pattern completion with a Hopfield network.
//!
//! Three 5x6 digit bitmaps are stored; the network is then shown the top
//! half of each and left to settle.
//!
//! Run with:
//! ```bash
//! cargo run --example hopfield_recall -p netomata-automaton
//! ```

use netomata_automaton::init;
use netomata_automaton::models::HopfieldNet;

const COLS: usize = 5;

const DIGITS: [(&str, [u8; 30]); 3] = [
    (
        "zero",
        [
            0, 1, 1, 1, 0, 1, 0, 0, 0, 1, 1, 0, 0, 0, 1, 1, 0, 0, 0, 1, 1, 0, 0, 0, 1, 0, 1, 1, 1, 0,
        ],
    ),
    (
        "one",
        [
            0, 1, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0,
        ],
    ),
    (
        "two",
        [
            1, 1, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0, 1, 0, 0, 0, 0, 1, 1, 1, 1, 1,
        ],
    ),
];

fn render(cells: &[i8]) -> Vec<String> {
    cells
        .chunks(COLS)
        .map(|row| row.iter().map(|c| if *c > 0 { '#' } else { '.' }).collect())
        .collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let patterns: Vec<Vec<i8>> = DIGITS.iter().map(|(_, p)| init::to_bipolar(p)).collect();
    let mut net = HopfieldNet::new(COLS * 6);
    net.train(&patterns)?;

    for ((name, bits), stored) in DIGITS.iter().zip(&patterns) {
        let mut masked = *bits;
        masked[bits.len() / 2..].fill(0);
        let trajectory = net.recall(init::to_bipolar(&masked), 5 * net.size())?;
        let recalled = trajectory.activities.last();

        println!("{name}: probe -> recalled");
        for (probe, settled) in render(&trajectory.activities[0])
            .iter()
            .zip(render(recalled))
        {
            println!("  {probe}  {settled}");
        }
        println!("  recovered: {}\n", recalled == stored.as_slice());
    }
    Ok(())
}
