//! Rayon-backed CPU backend.
//!
//! Each pass runs on a dedicated thread pool. Work items receive disjoint
//! `&mut` slices of the destination array, so no synchronization is needed
//! inside a pass; the pool join at the end of `launch` is what `wait`
//! observes.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::trace;

use crate::backend::{check_index, check_lengths, Backend, SubmissionStats};
use crate::error::BackendError;
use crate::kernel::{bitonic_pair, merge_runs, scan_combine, Kernel};
use crate::types::Key;

/// Backend evaluating pass kernels on the host with rayon.
pub struct CpuBackend {
    pool: ThreadPool,
    stats: SubmissionStats,
    in_flight: bool,
}

impl CpuBackend {
    /// Create a backend using rayon's default thread count.
    pub fn new() -> Result<Self, BackendError> {
        Self::with_threads(None)
    }

    /// Create a backend with an explicit worker count (`None` = rayon default).
    pub fn with_threads(threads: Option<usize>) -> Result<Self, BackendError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("phase-cpu-{i}"));
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| BackendError::ThreadPool(e.to_string()))?;
        Ok(Self {
            pool,
            stats: SubmissionStats::default(),
            in_flight: false,
        })
    }

    /// Number of worker threads in the pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn submit(&mut self) {
        debug_assert!(
            !self.in_flight,
            "submission issued before the previous one was awaited"
        );
        self.in_flight = true;
    }
}

impl Backend for CpuBackend {
    type Array = Vec<Key>;

    fn name(&self) -> String {
        format!("CPU ({} threads)", self.threads())
    }

    fn alloc(&mut self, len: usize) -> Result<Vec<Key>, BackendError> {
        Ok(vec![0; len])
    }

    fn upload(&mut self, data: &[Key]) -> Result<Vec<Key>, BackendError> {
        Ok(data.to_vec())
    }

    fn download(&self, array: &Vec<Key>) -> Result<Vec<Key>, BackendError> {
        Ok(array.clone())
    }

    fn read_at(&self, array: &Vec<Key>, index: usize) -> Result<Key, BackendError> {
        check_index(index, array.len())?;
        Ok(array[index])
    }

    fn launch(
        &mut self,
        kernel: Kernel,
        src: &Vec<Key>,
        dst: &mut Vec<Key>,
    ) -> Result<(), BackendError> {
        check_lengths(dst.len(), src.len())?;
        kernel.validate(src.len())?;
        self.submit();
        trace!(%kernel, len = src.len(), "cpu launch");
        self.pool.install(|| run_kernel(kernel, src, dst));
        self.stats.launches += 1;
        Ok(())
    }

    fn copy(&mut self, dst: &mut Vec<Key>, src: &Vec<Key>) -> Result<(), BackendError> {
        check_lengths(dst.len(), src.len())?;
        self.submit();
        trace!(len = src.len(), "cpu copy");
        self.pool.install(|| {
            dst.par_iter_mut()
                .zip(src.par_iter())
                .for_each(|(d, s)| *d = *s)
        });
        self.stats.copies += 1;
        Ok(())
    }

    fn wait(&mut self) -> Result<(), BackendError> {
        self.in_flight = false;
        self.stats.waits += 1;
        Ok(())
    }

    fn stats(&self) -> SubmissionStats {
        self.stats
    }
}

/// Evaluate one pass. `dst` is fully overwritten.
fn run_kernel(kernel: Kernel, src: &[Key], dst: &mut [Key]) {
    match kernel {
        Kernel::ScanCombine { chunk_size } => {
            dst.par_iter_mut()
                .enumerate()
                .for_each(|(i, out)| *out = scan_combine(src, chunk_size, i));
        }
        Kernel::BitonicStep { stage, step } => {
            // Each 2*step block holds `step` pairs (k, k + step); the lower
            // half and upper half are handed out as separate &mut slices.
            dst.par_chunks_mut(2 * step)
                .enumerate()
                .for_each(|(block, pairs)| {
                    let base = block * 2 * step;
                    let (lower, upper) = pairs.split_at_mut(step);
                    lower
                        .par_iter_mut()
                        .zip(upper.par_iter_mut())
                        .enumerate()
                        .for_each(|(k, (lo, hi))| {
                            (*lo, *hi) = bitonic_pair(src, stage, step, base + k);
                        });
                });
        }
        Kernel::MergeRuns { run_length } => {
            dst.par_chunks_mut(2 * run_length)
                .enumerate()
                .for_each(|(pair, out)| merge_runs(src, run_length, pair, out));
        }
    }
}
