pub mod backend;
pub mod cpu;
pub mod error;
pub mod kernel;
#[cfg(target_os = "macos")]
pub mod metal;
pub mod timing;
pub mod types;

pub use backend::{Backend, DeviceArray, SubmissionStats};
pub use cpu::CpuBackend;
pub use error::BackendError;
pub use kernel::Kernel;
#[cfg(target_os = "macos")]
pub use metal::{MetalArray, MetalBackend};
pub use timing::{time_ms, BenchTimer};
pub use types::{BitonicParams, Key, MergeParams, ScanParams};
