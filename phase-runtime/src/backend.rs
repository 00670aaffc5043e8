//! The execution substrate seen by the engines.
//!
//! A backend needs exactly three operations beyond allocation: `launch` a
//! pass, `copy` one array into another, and `wait` for the last submission.
//! Submissions may complete asynchronously; callers must `wait` before
//! reading anything a submission wrote or submitting work that depends on it.

use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::kernel::Kernel;
use crate::types::Key;

/// A fixed-length array resident on a backend.
pub trait DeviceArray {
    /// Number of keys in the array.
    fn len(&self) -> usize;

    /// Whether the array holds zero keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DeviceArray for Vec<Key> {
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// Running totals of work submitted to a backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionStats {
    pub launches: u64,
    pub copies: u64,
    pub waits: u64,
}

impl SubmissionStats {
    /// Difference between two snapshots (`self` taken after `earlier`).
    pub fn since(&self, earlier: &SubmissionStats) -> SubmissionStats {
        SubmissionStats {
            launches: self.launches - earlier.launches,
            copies: self.copies - earlier.copies,
            waits: self.waits - earlier.waits,
        }
    }
}

/// Parallel execution substrate for pass kernels.
pub trait Backend {
    /// Device-resident array type.
    type Array: DeviceArray;

    /// Human-readable device name.
    fn name(&self) -> String;

    /// Allocate an array of `len` keys. Contents are unspecified.
    fn alloc(&mut self, len: usize) -> Result<Self::Array, BackendError>;

    /// Allocate an array initialized with `data`.
    fn upload(&mut self, data: &[Key]) -> Result<Self::Array, BackendError>;

    /// Copy an array back to the host.
    fn download(&self, array: &Self::Array) -> Result<Vec<Key>, BackendError>;

    /// Read one key back to the host.
    fn read_at(&self, array: &Self::Array, index: usize) -> Result<Key, BackendError>;

    /// Submit one pass reading `src` and writing `dst`.
    fn launch(
        &mut self,
        kernel: Kernel,
        src: &Self::Array,
        dst: &mut Self::Array,
    ) -> Result<(), BackendError>;

    /// Submit a bulk copy of `src` into `dst`.
    fn copy(&mut self, dst: &mut Self::Array, src: &Self::Array) -> Result<(), BackendError>;

    /// Block until the most recent submission has completed.
    fn wait(&mut self) -> Result<(), BackendError>;

    /// Submission counters since the backend was created.
    fn stats(&self) -> SubmissionStats;
}

/// Validate that `launch` was handed two arrays of equal length.
pub(crate) fn check_lengths(dst: usize, src: usize) -> Result<(), BackendError> {
    if dst != src {
        return Err(BackendError::LengthMismatch { dst, src });
    }
    Ok(())
}

/// Validate a single-element read.
pub(crate) fn check_index(index: usize, len: usize) -> Result<(), BackendError> {
    if index >= len {
        return Err(BackendError::IndexOutOfRange { index, len });
    }
    Ok(())
}
