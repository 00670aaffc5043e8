//! Output modules for rendering run results.
//!
//! Supports table (comfy-table), JSON, and progress spinner output.

pub mod json;
pub mod progress;
pub mod table;
