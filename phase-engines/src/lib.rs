//! Phase-doubling array transforms over a double-buffered backend.
//!
//! Three engines share one control pattern: a chunk size doubling from 1,
//! one parallel pass per step reading `current` and writing `next`, and a
//! blocking commit before the next pass.
//!
//! ```no_run
//! use phase_engines::{build_engine, initial_input, EngineKind, EngineOptions};
//! use phase_runtime::CpuBackend;
//!
//! let mut backend = CpuBackend::new().unwrap();
//! let input = initial_input(EngineKind::Merge, 1 << 16);
//! let mut engine = build_engine(EngineKind::Merge, &mut backend, &input, EngineOptions::default()).unwrap();
//! engine.run().unwrap();
//! println!("checksum: {:?}", engine.checksum().unwrap());
//! ```

pub mod bitonic;
pub mod double_buffer;
pub mod engine;
pub mod error;
pub mod keys;
pub mod merge;
pub mod scan;

pub use bitonic::BitonicEngine;
pub use double_buffer::{CommitMode, DoubleBuffer};
pub use engine::{build_engine, initial_input, EngineKind, EngineOptions, PassEngine};
pub use error::EngineError;
pub use keys::{generate_keys, key_at, ones};
pub use merge::MergeEngine;
pub use scan::ScanEngine;
