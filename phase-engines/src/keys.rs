//! Deterministic self-test keys.

use phase_runtime::Key;
use rayon::prelude::*;

/// Key for index `i` of an `n`-element array.
///
/// `n - i * (1 + [i%3==0] + [i%5==0] + [i%7==0] + [i%11==0])`, in wrapping
/// 32-bit arithmetic. Descending with irregular gaps, so both sort engines have
/// real work to do.
pub fn key_at(i: usize, n: usize) -> Key {
    let factor = 1 + [3, 5, 7, 11].iter().filter(|&&d| i % d == 0).count() as Key;
    (n as Key).wrapping_sub((i as Key).wrapping_mul(factor))
}

/// Fill an `n`-element array with [`key_at`] in parallel.
pub fn generate_keys(n: usize) -> Vec<Key> {
    (0..n).into_par_iter().map(|i| key_at(i, n)).collect()
}

/// Scan input: `n` ones, whose prefix sum is `1..=n`.
pub fn ones(n: usize) -> Vec<Key> {
    vec![1; n]
}
