//! Inclusive prefix sum by chunk doubling.
//!
//! After the pass with chunk size `s` is committed, every aligned block of
//! `2s` elements holds its own inclusive scan. The last element of each odd
//! block's predecessor is that predecessor's total, so one pass per doubling
//! suffices: `⌈log₂N⌉` passes in all.

use phase_runtime::{Backend, Kernel, Key, SubmissionStats};
use tracing::debug;

use crate::double_buffer::{CommitMode, DoubleBuffer};
use crate::engine::{EngineKind, PassEngine};
use crate::error::EngineError;

/// Passes a scan over `n` elements commits: `⌈log₂n⌉`, zero for `n <= 1`.
pub fn expected_passes(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        n.next_power_of_two().trailing_zeros() as usize
    }
}

pub struct ScanEngine<'b, B: Backend> {
    buffers: DoubleBuffer<'b, B>,
    chunk_size: usize,
}

impl<'b, B: Backend> ScanEngine<'b, B> {
    pub fn new(backend: &'b mut B, input: &[Key], mode: CommitMode) -> Result<Self, EngineError> {
        Ok(Self {
            buffers: DoubleBuffer::new(backend, input, mode)?,
            chunk_size: 1,
        })
    }

    /// Chunk size of the next pass.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn buffers(&self) -> &DoubleBuffer<'b, B> {
        &self.buffers
    }
}

impl<B: Backend> PassEngine for ScanEngine<'_, B> {
    fn kind(&self) -> EngineKind {
        EngineKind::Scan
    }

    fn len(&self) -> usize {
        self.buffers.len()
    }

    fn is_done(&self) -> bool {
        self.chunk_size >= self.buffers.len()
    }

    fn step(&mut self) -> Result<bool, EngineError> {
        if self.is_done() {
            return Ok(true);
        }
        debug!(
            engine = "scan",
            pass = self.buffers.passes(),
            chunk_size = self.chunk_size,
            "pass"
        );
        self.buffers.step(Kernel::ScanCombine {
            chunk_size: self.chunk_size,
        })?;
        self.chunk_size *= 2;
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
