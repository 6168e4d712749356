//! Initial-condition helpers.

use rand::Rng;

use crate::random::SimRng;

/// `n` cells of `background` with `value` at the centre cell `n / 2`.
pub fn simple<A: Clone>(n: usize, value: A, background: A) -> Vec<A> {
    let mut cells = vec![background; n];
    if let Some(centre) = cells.get_mut(n / 2) {
        *centre = value;
    }
    cells
}

/// Row-major `rows x cols` grid with `value` at `(rows / 2, cols / 2)`.
pub fn simple_2d<A: Clone>(rows: usize, cols: usize, value: A, background: A) -> Vec<A> {
    let mut cells = vec![background; rows * cols];
    if let Some(centre) = cells.get_mut((rows / 2) * cols + cols / 2) {
        *centre = value;
    }
    cells
}

/// `n` cells drawn uniformly from `0..k`.
pub fn random(n: usize, k: u8, rng: &mut SimRng) -> Vec<u8> {
    (0..n).map(|_| rng.random_range(0..k.max(1))).collect()
}

/// `n` cells of 0 with a centred span of `span` random cells drawn from `0..k`.
pub fn random_span(n: usize, k: u8, span: usize, rng: &mut SimRng) -> Vec<u8> {
    let span = span.min(n);
    let start = (n - span) / 2;
    let mut cells = vec![0u8; n];
    for cell in &mut cells[start..start + span] {
        *cell = rng.random_range(0..k.max(1));
    }
    cells
}

/// Map `{0, 1}` to `{-1, +1}`.
pub fn to_bipolar(bits: &[u8]) -> Vec<i8> {
    bits.iter().map(|b| if *b == 0 { -1 } else { 1 }).collect()
}
