//! Bottom-up merge sort: each pass merges adjacent sorted runs of length `s`.
//!
//! Run bounds are clamped to `N`, so a trailing run without a partner is
//! copied through and lengths need not be powers of two.

use phase_runtime::{Backend, Kernel, Key, SubmissionStats};
use tracing::debug;

use crate::double_buffer::{CommitMode, DoubleBuffer};
use crate::engine::{EngineKind, PassEngine};
use crate::error::EngineError;

/// Passes a merge sort of `n` elements commits: `⌈log₂n⌉`, zero for `n <= 1`.
pub fn expected_passes(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        n.next_power_of_two().trailing_zeros() as usize
    }
}

pub struct MergeEngine<'b, B: Backend> {
    buffers: DoubleBuffer<'b, B>,
    run_length: usize,
}

impl<'b, B: Backend> MergeEngine<'b, B> {
    pub fn new(backend: &'b mut B, input: &[Key], mode: CommitMode) -> Result<Self, EngineError> {
        Ok(Self {
            buffers: DoubleBuffer::new(backend, input, mode)?,
            run_length: 1,
        })
    }

    /// Length of the sorted runs the next pass merges.
    pub fn run_length(&self) -> usize {
        self.run_length
    }
}

impl<B: Backend> PassEngine for MergeEngine<'_, B> {
    fn kind(&self) -> EngineKind {
        EngineKind::Merge
    }

    fn len(&self) -> usize {
        self.buffers.len()
    }

    fn is_done(&self) -> bool {
        self.run_length >= self.buffers.len()
    }

    fn step(&mut self) -> Result<bool, EngineError> {
        if self.is_done() {
            return Ok(true);
        }
        debug!(
            engine = "merge",
            pass = self.buffers.passes(),
            run_length = self.run_length,
            "pass"
        );
        self.buffers.step(Kernel::MergeRuns {
            run_length: self.run_length,
        })?;
        self.run_length *= 2;
        Ok(self.is_done())
    }

    fn passes(&self) -> usize {
        self.buffers.passes()
    }

    fn result(&self) -> Result<Vec<Key>, EngineError> {
        self.buffers.read()
    }

    fn checksum(&self) -> Result<Option<Key>, EngineError> {
        self.buffers.checksum()
    }

    fn stats(&self) -> SubmissionStats {
        self.buffers.stats()
    }
}
