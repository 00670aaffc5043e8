//! Bitonic sorting network, one compare-exchange step per pass.
//!
//! Stage `k` doubles from 1 while `k < N`; within a stage the step halves
//! from `k` down to 1. Blocks of `2k` alternate direction so that each stage
//! leaves bitonic sequences for the next one to merge.

use phase_runtime::{Backend, Kernel, Key, SubmissionStats};
use tracing::debug;

use crate::double_buffer::{CommitMode, DoubleBuffer};
use crate::engine::{EngineKind, PassEngine};
use crate::error::EngineError;

/// Passes a bitonic sort of `n` elements commits:
/// `Σ (log₂stage + 1)` over `stage = 1, 2, 4, .. < n`.
pub fn expected_passes(n: usize) -> usize {
    let mut total = 0;
    let mut stage = 1usize;
    while stage < n {
        total += stage.trailing_zeros() as usize + 1;
        stage *= 2;
    }
    total
}

pub struct BitonicEngine<'b, B: Backend> {
    buffers: DoubleBuffer<'b, B>,
    stage: usize,
    step: usize,
}

impl<'b, B: Backend> BitonicEngine<'b, B> {
    /// Lengths other than 0, 1 and powers of two are rejected.
    pub fn new(backend: &'b mut B, input: &[Key], mode: CommitMode) -> Result<Self, EngineError> {
        let len = input.len();
        if len > 1 && !len.is_power_of_two() {
            return Err(EngineError::NotPowerOfTwo { len });
        }
        Ok(Self {
            buffers: DoubleBuffer::new(backend, input, mode)?,
            stage: 1,
            step: 1,
        })
    }

    /// `(stage, step)` of the next pass.
    pub fn position(&self) -> (usize, usize) {
        (self.stage, self.step)
    }
}

impl<B: Backend> PassEngine for BitonicEngine<'_, B> {
    fn kind(&self) -> EngineKind {
        EngineKind::Bitonic
    }

    fn len(&self) -> usize {
        self.buffers.len()
    }

    fn is_done(&self) -> bool {
        self.stage >= self.buffers.len()
    }

    fn step(&mut self) -> Result<bool, EngineError> {
        if self.is_done() {
            return Ok(true);
        }
        debug!(
            engine = "bitonic",
            pass = self.buffers.passes(),
            stage = self.stage,
            step = self.step,
            "pass"
        );
        self.buffers.step(Kernel::BitonicStep {
            stage: self.stage,
            step: self.step,
        })?;

        if self.step > 1 {
            self.step /= 2;
        } else {
            self.stage *= 2;
            self.step = self.stage;
        }
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
