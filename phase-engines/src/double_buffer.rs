//! Double-buffer manager: owns `current` and `next` and sequences passes.
//!
//! Every pass reads only `current` and writes only `next`. A pass is always
//! followed by a blocking wait, and so is every commit, so no submission can
//! overlap another and `next` is never observed half-written.

use std::fmt;
use std::str::FromStr;

use phase_runtime::{Backend, DeviceArray, Kernel, Key, SubmissionStats};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::EngineError;

/// How a finished pass is made authoritative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitMode {
    /// Bulk-copy `next` into `current` on the backend.
    #[default]
    Copy,
    /// Exchange the two array handles; no device work.
    Swap,
}

impl CommitMode {
    pub fn name(&self) -> &'static str {
        match self {
            CommitMode::Copy => "copy",
            CommitMode::Swap => "swap",
        }
    }
}

impl fmt::Display for CommitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CommitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "copy" => Ok(CommitMode::Copy),
            "swap" => Ok(CommitMode::Swap),
            other => Err(format!(
                "unknown commit mode '{other}' (expected copy or swap)"
            )),
        }
    }
}

/// The `current` / `next` array pair for one engine run.
pub struct DoubleBuffer<'b, B: Backend> {
    backend: &'b mut B,
    current: B::Array,
    next: B::Array,
    mode: CommitMode,
    passes: usize,
}

impl<'b, B: Backend> DoubleBuffer<'b, B> {
    /// Upload `initial` as `current` and allocate `next` of the same length.
    pub fn new(backend: &'b mut B, initial: &[Key], mode: CommitMode) -> Result<Self, EngineError> {
        let current = backend.upload(initial)?;
        let next = backend.alloc(initial.len())?;
        Self::from_arrays(backend, current, next, mode)
    }

    /// Wrap two existing arrays. Their lengths must match.
    pub fn from_arrays(
        backend: &'b mut B,
        current: B::Array,
        next: B::Array,
        mode: CommitMode,
    ) -> Result<Self, EngineError> {
        if current.len() != next.len() {
            return Err(EngineError::LengthMismatch {
                current: current.len(),
                next: next.len(),
            });
        }
        Ok(Self {
            backend,
            current,
            next,
            mode,
            passes: 0,
        })
    }

    /// Evaluate `kernel` over every index, reading `current` and writing
    /// `next`, and block until it completes.
    pub fn run_pass(&mut self, kernel: Kernel) -> Result<(), EngineError> {
        self.backend.launch(kernel, &self.current, &mut self.next)?;
        self.backend.wait()?;
        Ok(())
    }

    /// Make `next` the authoritative contents of `current`.
    pub fn commit(&mut self) -> Result<(), EngineError> {
        match self.mode {
            CommitMode::Copy => {
                self.backend.copy(&mut self.current, &self.next)?;
                self.backend.wait()?;
            }
            CommitMode::Swap => std::mem::swap(&mut self.current, &mut self.next),
        }
        trace!(mode = %self.mode, pass = self.passes, "committed");
        Ok(())
    }

    /// One pass followed by its commit.
    pub fn step(&mut self, kernel: Kernel) -> Result<(), EngineError> {
        self.run_pass(kernel)?;
        self.commit()?;
        self.passes += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Number of committed passes.
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn mode(&self) -> CommitMode {
        self.mode
    }

    /// The authoritative array.
    pub fn current(&self) -> &B::Array {
        &self.current
    }

    /// Download `current` to the host.
    pub fn read(&self) -> Result<Vec<Key>, EngineError> {
        Ok(self.backend.download(&self.current)?)
    }

    /// Last element of `current`, or `None` for an empty array.
    pub fn checksum(&self) -> Result<Option<Key>, EngineError> {
        match self.len() {
            0 => Ok(None),
            n => Ok(Some(self.backend.read_at(&self.current, n - 1)?)),
        }
    }

    pub fn stats(&self) -> SubmissionStats {
        self.backend.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phase_runtime::CpuBackend;

    #[test]
    fn test_commit_mode_parse() {
        assert_eq!("copy".parse::<CommitMode>().unwrap(), CommitMode::Copy);
        assert_eq!(" SWAP ".parse::<CommitMode>().unwrap(), CommitMode::Swap);
        assert!("move".parse::<CommitMode>().is_err());
        assert_eq!(CommitMode::default(), CommitMode::Copy);
        assert_eq!(CommitMode::Swap.to_string(), "swap");
    }

    #[test]
    fn test_from_arrays_rejects_mismatched_lengths() {
        let mut backend = CpuBackend::with_threads(Some(2)).unwrap();
        let result = DoubleBuffer::from_arrays(&mut backend, vec![0; 4], vec![0; 3], CommitMode::Copy);
        assert!(matches!(
            result,
            Err(EngineError::LengthMismatch {
                current: 4,
                next: 3
            })
        ));
    }

    #[test]
    fn test_run_pass_leaves_current_untouched() {
        let mut backend = CpuBackend::with_threads(Some(2)).unwrap();
        let mut buffers = DoubleBuffer::new(&mut backend, &[1, 1, 1, 1], CommitMode::Copy).unwrap();
        buffers.run_pass(Kernel::ScanCombine { chunk_size: 1 }).unwrap();
        assert_eq!(buffers.read().unwrap(), vec![1, 1, 1, 1]);
        assert_eq!(buffers.passes(), 0);

        buffers.commit().unwrap();
        assert_eq!(buffers.read().unwrap(), vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_step_counts_and_synchronizes() {
        for mode in [CommitMode::Copy, CommitMode::Swap] {
            let mut backend = CpuBackend::with_threads(Some(2)).unwrap();
            let mut buffers = DoubleBuffer::new(&mut backend, &[1; 8], mode).unwrap();
            buffers.step(Kernel::ScanCombine { chunk_size: 1 }).unwrap();
            buffers.step(Kernel::ScanCombine { chunk_size: 2 }).unwrap();
            buffers.step(Kernel::ScanCombine { chunk_size: 4 }).unwrap();
            assert_eq!(buffers.passes(), 3);
            assert_eq!(buffers.read().unwrap(), (1..=8).collect::<Vec<Key>>());

            let stats = buffers.stats();
            assert_eq!(stats.launches, 3);
            match mode {
                CommitMode::Copy => {
                    assert_eq!(stats.copies, 3);
                    assert_eq!(stats.waits, 6);
                }
                CommitMode::Swap => {
                    assert_eq!(stats.copies, 0);
                    assert_eq!(stats.waits, 3);
                }
            }
        }
    }

    #[test]
    fn test_checksum() {
        let mut backend = CpuBackend::with_threads(Some(1)).unwrap();
        let buffers = DoubleBuffer::new(&mut backend, &[4, 5, 6], CommitMode::Copy).unwrap();
        assert_eq!(buffers.checksum().unwrap(), Some(6));
        drop(buffers);

        let empty = DoubleBuffer::new(&mut backend, &[], CommitMode::Copy).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.checksum().unwrap(), None);
    }
}
