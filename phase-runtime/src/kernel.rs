//! Pass kernels: launch descriptors plus their host implementations.
//!
//! Each kernel is a pure function of `current` and the pass parameters. The
//! host functions here mirror the device functions in `shaders/passes.metal`
//! one for one and are what the CPU backend evaluates per work item.
//!
//! | Kernel         | Work item       | Writes                          |
//! |----------------|-----------------|---------------------------------|
//! | `scan_combine` | one index       | `next[i]`                       |
//! | `bitonic_step` | one index pair  | `next[lower]`, `next[upper]`    |
//! | `merge_runs`   | one pair of runs| `next[left_start..right_end]`   |

use std::fmt;

use crate::error::BackendError;
use crate::types::Key;

/// One pass worth of work, with the loop parameters it was launched with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kernel {
    /// Chunk-doubling combine step of the inclusive scan.
    ScanCombine { chunk_size: usize },
    /// One compare-exchange step of the bitonic network.
    BitonicStep { stage: usize, step: usize },
    /// Two-way merge of adjacent sorted runs.
    MergeRuns { run_length: usize },
}

impl Kernel {
    /// Name of the device function implementing this kernel.
    pub fn function_name(&self) -> &'static str {
        match self {
            Kernel::ScanCombine { .. } => "scan_combine",
            Kernel::BitonicStep { .. } => "bitonic_step",
            Kernel::MergeRuns { .. } => "merge_runs",
        }
    }

    /// Check that the parameters describe a well-formed pass over `len` elements.
    ///
    /// Bitonic steps must tile the array exactly into pairs of `step`-sized halves.
    pub fn validate(&self, len: usize) -> Result<(), BackendError> {
        let ok = match *self {
            Kernel::ScanCombine { chunk_size } => chunk_size > 0,
            Kernel::BitonicStep { stage, step } => {
                step > 0 && step.is_power_of_two() && step <= stage && len % (2 * step) == 0
            }
            Kernel::MergeRuns { run_length } => run_length > 0,
        };
        if ok {
            Ok(())
        } else {
            Err(BackendError::InvalidLaunch {
                kernel: self.to_string(),
                len,
            })
        }
    }

    /// Number of work items a launch over `len` elements dispatches.
    pub fn work_items(&self, len: usize) -> usize {
        match *self {
            Kernel::ScanCombine { .. } | Kernel::BitonicStep { .. } => len,
            Kernel::MergeRuns { run_length } => len.div_ceil(2 * run_length),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kernel::ScanCombine { chunk_size } => write!(f, "scan_combine(chunk={chunk_size})"),
            Kernel::BitonicStep { stage, step } => {
                write!(f, "bitonic_step(stage={stage}, step={step})")
            }
            Kernel::MergeRuns { run_length } => write!(f, "merge_runs(run={run_length})"),
        }
    }
}

/// Value of `next[i]` after one scan combine pass with the given chunk size.
///
/// Elements of even blocks pass through. Elements of odd blocks add the last
/// value of the preceding block, which already holds that block's total.
pub fn scan_combine(current: &[Key], chunk_size: usize, i: usize) -> Key {
    let block = i / chunk_size;
    if block % 2 == 0 {
        return current[i];
    }
    match (block * chunk_size).checked_sub(1) {
        Some(boundary) => current[i].wrapping_add(current[boundary]),
        None => current[i],
    }
}

/// Whether the bitonic block containing `index` sorts ascending at `stage`.
pub fn is_ascending(stage: usize, index: usize) -> bool {
    (index / (2 * stage)) % 2 == 0
}

/// Compare-exchange of the pair `(lower, lower ^ step)`.
///
/// Returns the values to write at `next[lower]` and `next[lower ^ step]`.
/// `lower` must be the lower index of its pair (`lower & step == 0`).
pub fn bitonic_pair(current: &[Key], stage: usize, step: usize, lower: usize) -> (Key, Key) {
    debug_assert_eq!(lower & step, 0, "index {lower} is not the lower element for step {step}");
    let upper = lower ^ step;
    let (a, b) = (current[lower], current[upper]);
    let ascending = is_ascending(stage, lower);
    if (ascending && a > b) || (!ascending && a < b) {
        (b, a)
    } else {
        (a, b)
    }
}

/// Merge the `pair`-th pair of sorted runs of `current` into `out`.
///
/// The left run is `[2·pair·run, 2·pair·run + run)` and the right run follows
/// it; both are clamped to `current.len()`. `out` covers exactly the merged
/// range. Ties take the left element first, so the merge is stable.
pub fn merge_runs_by_key<T, K, F>(current: &[T], run_length: usize, pair: usize, out: &mut [T], key: F)
where
    T: Copy,
    K: Ord,
    F: Fn(&T) -> K,
{
    let n = current.len();
    let left_start = pair * 2 * run_length;
    let right_start = (left_start + run_length).min(n);
    let right_end = (right_start + run_length).min(n);
    debug_assert_eq!(out.len(), right_end - left_start);

    let (mut l, mut r) = (left_start, right_start);
    for slot in out.iter_mut() {
        let take_left =
            l < right_start && (r >= right_end || key(&current[l]) <= key(&current[r]));
        if take_left {
            *slot = current[l];
            l += 1;
        } else {
            *slot = current[r];
            r += 1;
        }
    }
}

/// [`merge_runs_by_key`] on plain keys.
pub fn merge_runs(current: &[Key], run_length: usize, pair: usize, out: &mut [Key]) {
    merge_runs_by_key(current, run_length, pair, out, |k| *k);
}
