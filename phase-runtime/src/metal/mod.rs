//! Metal GPU backend (macOS only).

pub mod backend;
pub mod context;
pub mod dispatch;
pub mod pso_cache;

pub use backend::{MetalArray, MetalBackend};
pub use context::MetalContext;
pub use pso_cache::PsoCache;
