#![allow(dead_code)]

use phase_engines::{build_engine, EngineKind, EngineOptions};
use phase_runtime::{Backend, Key};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// `n` keys drawn from `[-range, range]`.
pub fn random_keys(rng: &mut ChaCha8Rng, n: usize, range: Key) -> Vec<Key> {
    (0..n).map(|_| rng.gen_range(-range..=range)).collect()
}

/// Sequential inclusive scan with wrapping addition.
pub fn sequential_scan(input: &[Key]) -> Vec<Key> {
    let mut acc: Key = 0;
    input
        .iter()
        .map(|&x| {
            acc = acc.wrapping_add(x);
            acc
        })
        .collect()
}

pub fn is_sorted(data: &[Key]) -> bool {
    data.windows(2).all(|w| w[0] <= w[1])
}

/// Whether `output` holds the same multiset of keys as `input`.
pub fn is_permutation(input: &[Key], output: &[Key]) -> bool {
    if input.len() != output.len() {
        return false;
    }
    let mut a = input.to_vec();
    let mut b = output.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// Run `kind` to completion and return `(result, passes)`.
pub fn run_engine<B: Backend>(
    kind: EngineKind,
    backend: &mut B,
    input: &[Key],
    options: EngineOptions,
) -> (Vec<Key>, usize) {
    let mut engine = build_engine(kind, backend, input, options).unwrap();
    let passes = engine.run().unwrap();
    (engine.result().unwrap(), passes)
}

/// Index of the first differing element, for assertion messages.
pub fn first_diff(actual: &[Key], expected: &[Key]) -> usize {
    actual
        .iter()
        .zip(expected.iter())
        .position(|(a, b)| a != b)
        .unwrap_or(actual.len().min(expected.len()))
}
