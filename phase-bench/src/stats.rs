use serde::{Deserialize, Serialize};

/// Summary of a set of timing samples (milliseconds).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
    pub cv_percent: f64,
    pub sample_count: usize,
    pub outliers_removed: usize,
}

/// Summarize timing samples.
///
/// Samples outside `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]` are dropped first, unless
/// fewer than two would remain.
pub fn compute_stats(samples: &[f64]) -> Stats {
    let mut sorted: Vec<f64> = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    match sorted.len() {
        0 => return Stats::default(),
        1 => return summarize(&sorted, 0),
        _ => {}
    }

    let q1 = percentile(&sorted, 25.0);
    let q3 = percentile(&sorted, 75.0);
    let fence = 1.5 * (q3 - q1);
    let kept: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|&v| v >= q1 - fence && v <= q3 + fence)
        .collect();

    if kept.len() >= 2 {
        summarize(&kept, sorted.len() - kept.len())
    } else {
        summarize(&sorted, 0)
    }
}

/// Statistics of an already sorted, non-empty slice.
fn summarize(sorted: &[f64], outliers_removed: usize) -> Stats {
    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let stddev = if n > 1 {
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };

    Stats {
        mean,
        median: percentile(sorted, 50.0),
        min: sorted[0],
        max: sorted[n - 1],
        stddev,
        cv_percent: if mean > 0.0 { stddev / mean * 100.0 } else { 0.0 },
        sample_count: n,
        outliers_removed,
    }
}

/// Linear-interpolated percentile (0-100) of a sorted slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Millions of elements processed per second.
pub fn melem_per_sec(elements: usize, ms: f64) -> f64 {
    if ms > 0.0 {
        elements as f64 / (ms * 1e3)
    } else {
        0.0
    }
}
