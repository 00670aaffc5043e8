//! Measurement harness: validates each engine once, then runs warmup and
//! measured loops and returns structured DataPoint results.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use phase_engines::{build_engine, initial_input, EngineError, EngineKind, EngineOptions};
use phase_runtime::{time_ms, Backend, Key, SubmissionStats};

use crate::config::RunConfig;
use crate::reference::expected_output;
use crate::stats::{compute_stats, melem_per_sec, Stats};

/// Results for one engine at one size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPoint {
    pub engine: EngineKind,
    pub size: usize,
    pub passes: usize,
    pub expected_passes: usize,
    pub checksum: Option<Key>,
    pub validated: bool,
    pub device_stats: Stats,
    pub cpu_stats: Stats,
    pub speedup: f64,
    pub melem_per_sec: f64,
    /// Backend submissions for a single engine run.
    pub submissions: SubmissionStats,
}

/// Outcome of one complete engine run.
struct EngineRun {
    output: Vec<Key>,
    passes: usize,
    checksum: Option<Key>,
    submissions: SubmissionStats,
}

fn run_once<B: Backend>(
    kind: EngineKind,
    backend: &mut B,
    input: &[Key],
    options: EngineOptions,
) -> Result<EngineRun, EngineError> {
    let mut engine = build_engine(kind, backend, input, options)?;
    let before = engine.stats();
    let passes = engine.run()?;
    Ok(EngineRun {
        output: engine.result()?,
        passes,
        checksum: engine.checksum()?,
        submissions: engine.stats().since(&before),
    })
}

/// Time one engine run end to end, upload included.
fn timed_run<B: Backend>(
    kind: EngineKind,
    backend: &mut B,
    input: &[Key],
    options: EngineOptions,
) -> Result<f64, EngineError> {
    let (result, ms) = time_ms(|| -> Result<(), EngineError> {
        let mut engine = build_engine(kind, &mut *backend, input, options)?;
        engine.run()?;
        Ok(())
    });
    result?;
    Ok(ms)
}

/// Run `kind` across all configured sizes.
///
/// For each size:
/// 1. one validated run against the host reference (checksum printed)
/// 2. warmup loop (discard timings)
/// 3. measured loop on the backend, then on the CPU reference
/// 4. compute_stats -> DataPoint
pub fn run_engine_bench<B: Backend>(
    kind: EngineKind,
    backend: &mut B,
    config: &RunConfig,
    options: EngineOptions,
    progress_cb: Option<&dyn Fn(&str)>,
) -> Result<Vec<DataPoint>, EngineError> {
    let mut results = Vec::new();

    for &size in &config.sizes {
        let size_label = format_size(size);
        let report = |stage: &str| {
            if let Some(cb) = progress_cb {
                cb(&format!("{} @ {}: {}", kind, size_label, stage));
            }
        };

        report("validate");
        let input = initial_input(kind, size);
        let expected = expected_output(kind, &input);
        let first = run_once(kind, backend, &input, options)?;
        let validated = first.output == expected;
        if !validated {
            let index = first
                .output
                .iter()
                .zip(expected.iter())
                .position(|(a, b)| a != b)
                .unwrap_or(size);
            warn!(
                engine = kind.name(),
                size, index, "validation failed: output differs from host reference"
            );
        }
        let expected_passes = kind.expected_passes(size);
        if first.passes != expected_passes {
            warn!(
                engine = kind.name(),
                size,
                passes = first.passes,
                expected_passes,
                "unexpected pass count"
            );
        }

        report(&format!("warmup ({} runs)", config.warmup));
        for _ in 0..config.warmup {
            timed_run(kind, backend, &input, options)?;
        }

        report(&format!("measuring device ({} runs)", config.runs));
        let device_times = (0..config.runs)
            .map(|_| timed_run(kind, &mut *backend, &input, options))
            .collect::<Result<Vec<f64>, EngineError>>()?;

        report(&format!("measuring CPU ({} runs)", config.runs));
        let cpu_times: Vec<f64> = (0..config.runs)
            .map(|_| time_ms(|| expected_output(kind, &input)).1)
            .collect();

        let device_stats = compute_stats(&device_times);
        let cpu_stats = compute_stats(&cpu_times);

        // Speedup = CPU_mean / device_mean
        let speedup = if device_stats.mean > 0.0 {
            cpu_stats.mean / device_stats.mean
        } else {
            0.0
        };

        info!(
            engine = kind.name(),
            size,
            passes = first.passes,
            mean_ms = device_stats.mean,
            validated,
            "measured"
        );

        results.push(DataPoint {
            engine: kind,
            size,
            passes: first.passes,
            expected_passes,
            checksum: first.checksum,
            validated,
            melem_per_sec: melem_per_sec(size, device_stats.mean),
            device_stats,
            cpu_stats,
            speedup,
            submissions: first.submissions,
        });

        report(&format!("done (speedup={:.1}x)", speedup));
    }

    Ok(results)
}

/// Format an element count for display (e.g. 1048576 -> "1M", 1000 -> "1000").
pub fn format_size(size: usize) -> String {
    const M: usize = 1 << 20;
    const K: usize = 1 << 10;
    if size >= M && size % M == 0 {
        format!("{}M", size / M)
    } else if size >= K && size % K == 0 {
        format!("{}K", size / K)
    } else {
        format!("{}", size)
    }
}
