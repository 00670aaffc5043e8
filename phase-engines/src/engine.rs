//! Engine state machine trait and the engine registry.

use std::fmt;
use std::str::FromStr;

use phase_runtime::{Backend, Key, SubmissionStats};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bitonic::{self, BitonicEngine};
use crate::double_buffer::CommitMode;
use crate::error::EngineError;
use crate::keys::{generate_keys, ones};
use crate::merge::{self, MergeEngine};
use crate::scan::{self, ScanEngine};

/// A phase-doubling computation advanced one committed pass at a time.
pub trait PassEngine {
    fn kind(&self) -> EngineKind;

    /// Number of elements being transformed.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the termination predicate holds.
    fn is_done(&self) -> bool;

    /// Run and commit one pass. Returns whether the engine is now done.
    /// A finished engine does no further work.
    fn step(&mut self) -> Result<bool, EngineError>;

    /// Committed passes so far.
    fn passes(&self) -> usize;

    /// Step until done and return the total pass count.
    fn run(&mut self) -> Result<usize, EngineError> {
        while !self.is_done() {
            self.step()?;
        }
        info!(
            engine = self.kind().name(),
            len = self.len(),
            passes = self.passes(),
            "engine finished"
        );
        Ok(self.passes())
    }

    /// Download the current array.
    fn result(&self) -> Result<Vec<Key>, EngineError>;

    /// Last element of the current array.
    fn checksum(&self) -> Result<Option<Key>, EngineError>;

    fn stats(&self) -> SubmissionStats;
}

/// The available engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Scan,
    Bitonic,
    Merge,
}

impl EngineKind {
    pub const ALL: [EngineKind; 3] = [EngineKind::Scan, EngineKind::Bitonic, EngineKind::Merge];

    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Scan => "scan",
            EngineKind::Bitonic => "bitonic",
            EngineKind::Merge => "merge",
        }
    }

    /// Whether the engine sorts (as opposed to scanning).
    pub fn is_sort(&self) -> bool {
        !matches!(self, EngineKind::Scan)
    }

    /// Passes the engine commits for an `n`-element input.
    pub fn expected_passes(&self, n: usize) -> usize {
        match self {
            EngineKind::Scan => scan::expected_passes(n),
            EngineKind::Bitonic => bitonic::expected_passes(n),
            EngineKind::Merge => merge::expected_passes(n),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scan" => Ok(EngineKind::Scan),
            "bitonic" => Ok(EngineKind::Bitonic),
            "merge" => Ok(EngineKind::Merge),
            other => Err(EngineError::UnknownEngine(other.to_string())),
        }
    }
}

/// Knobs shared by every engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    pub commit: CommitMode,
}

/// Self-test input for `kind`: all ones for the scan, generated keys for the sorts.
pub fn initial_input(kind: EngineKind, n: usize) -> Vec<Key> {
    match kind {
        EngineKind::Scan => ones(n),
        EngineKind::Bitonic | EngineKind::Merge => generate_keys(n),
    }
}

/// Construct the engine for `kind` over `input`.
pub fn build_engine<'b, B: Backend + 'b>(
    kind: EngineKind,
    backend: &'b mut B,
    input: &[Key],
    options: EngineOptions,
) -> Result<Box<dyn PassEngine + 'b>, EngineError> {
    let engine: Box<dyn PassEngine + 'b> = match kind {
        EngineKind::Scan => Box::new(ScanEngine::new(backend, input, options.commit)?),
        EngineKind::Bitonic => Box::new(BitonicEngine::new(backend, input, options.commit)?),
        EngineKind::Merge => Box::new(MergeEngine::new(backend, input, options.commit)?),
    };
    Ok(engine)
}
