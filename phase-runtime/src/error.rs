//! Error type for the execution substrate.

/// Failures reported by a [`Backend`](crate::Backend).
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("no Metal GPU device found")]
    DeviceNotFound,
    #[error("shader compilation failed: {0}")]
    ShaderCompilation(String),
    #[error("device execution failed: {0}")]
    Execution(String),
    #[error("failed to allocate {bytes} bytes of device memory")]
    Allocation { bytes: usize },
    #[error("length mismatch: dst={dst}, src={src}")]
    LengthMismatch { dst: usize, src: usize },
    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("invalid launch of {kernel} over {len} elements")]
    InvalidLaunch { kernel: String, len: usize },
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}
