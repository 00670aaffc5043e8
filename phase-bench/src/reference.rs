//! Host reference results, used both to validate engine output and as the
//! CPU comparison point in the results table.

use phase_engines::EngineKind;
use phase_runtime::Key;
use rayon::prelude::*;

/// Sequential inclusive scan with wrapping 32-bit addition.
pub fn sequential_scan(data: &[Key]) -> Vec<Key> {
    let mut result = Vec::with_capacity(data.len());
    let mut acc: Key = 0;
    for &val in data {
        acc = acc.wrapping_add(val);
        result.push(acc);
    }
    result
}

/// Parallel sort using rayon's par_sort_unstable. Does not modify the input.
pub fn par_sort(data: &[Key]) -> Vec<Key> {
    let mut sorted = data.to_vec();
    sorted.par_sort_unstable();
    sorted
}

/// Expected final array for `kind` run over `input`.
pub fn expected_output(kind: EngineKind, input: &[Key]) -> Vec<Key> {
    match kind {
        EngineKind::Scan => sequential_scan(input),
        EngineKind::Bitonic | EngineKind::Merge => par_sort(input),
    }
}
