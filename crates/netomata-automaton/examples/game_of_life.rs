//! Conway's Game of Life as a network automaton.
//!
//! Every cell of a toroidal lattice is a node fed by its eight Moore
//! neighbours. A glider is placed in the top-left corner and followed until
//! it has crossed the board.
//!
//! Run with:
//! ```bash
//! cargo run --example game_of_life -p netomata-automaton
//! ```

use netomata_automaton::{rule_fn, Context, Evolution, RuleResult, SimRng};
use netomata_core::{Boundary, Lattice2d};

const SIZE: usize = 12;
const GENERATIONS: usize = 8;

/// Survive with two or three live neighbours, be born with exactly three.
fn life(ctx: &Context<'_, u8>, _rng: &mut SimRng) -> RuleResult<u8> {
    let live = ctx.neighbourhood_activities().filter(|c| **c == 1).count();
    Ok(match (*ctx.node_activity, live) {
        (1, 2) | (_, 3) => 1,
        _ => 0,
    })
}

fn render(lattice: &Lattice2d, cells: &[u8], generation: usize) {
    println!("generation {generation}");
    for row in 0..lattice.rows() {
        let line: String = (0..lattice.cols())
            .map(|col| match cells[lattice.index(row, col).index()] {
                1 => '#',
                _ => '.',
            })
            .collect();
        println!("  {line}");
    }
    println!();
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let lattice = Lattice2d::new(SIZE, SIZE)
        .boundary(Boundary::Periodic)
        .include_centre(false);
    let topology = lattice.build()?;

    let mut initial = vec![0u8; lattice.node_count()];
    for (row, col) in [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)] {
        initial[lattice.index(row, col).index()] = 1;
    }

    let rule = rule_fn("game_of_life", life);
    let trajectory = Evolution::new(initial, topology, &rule)
        .timesteps(GENERATIONS)
        .run()?;

    for (generation, cells) in trajectory.activities.iter() {
        render(&lattice, cells, generation);
    }

    let population: Vec<usize> = trajectory
        .activities
        .rows()
        .map(|cells| cells.iter().filter(|c| **c == 1).count())
        .collect();
    println!("population per generation: {population:?}");
    Ok(())
}
