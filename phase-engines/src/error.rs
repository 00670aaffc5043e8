//! Engine-level errors.

use phase_runtime::BackendError;

/// Error type for engine construction and execution.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("double buffer length mismatch: current={current}, next={next}")]
    LengthMismatch { current: usize, next: usize },
    #[error("bitonic sort requires a power-of-two length, got {len}")]
    NotPowerOfTwo { len: usize },
    #[error("unknown engine '{0}' (expected scan, bitonic or merge)")]
    UnknownEngine(String),
}
