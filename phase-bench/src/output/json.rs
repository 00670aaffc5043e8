//! JSON output for run results.
//!
//! Serializes the data points with a device and run-settings header.

use std::fs;
use std::path::Path;

use serde::Serialize;

use phase_engines::CommitMode;

use crate::harness::DataPoint;

/// JSON report wrapper with run metadata.
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub device: &'a str,
    pub commit: CommitMode,
    pub runs: u32,
    pub warmup: u32,
    pub timestamp: String,
    pub all_validated: bool,
    pub results: &'a [DataPoint],
}

impl<'a> JsonReport<'a> {
    pub fn new(
        device: &'a str,
        commit: CommitMode,
        runs: u32,
        warmup: u32,
        results: &'a [DataPoint],
    ) -> Self {
        Self {
            device,
            commit,
            runs,
            warmup,
            timestamp: chrono::Utc::now().to_rfc3339(),
            all_validated: results.iter().all(|dp| dp.validated),
            results,
        }
    }
}

/// Write the report to a JSON file, creating parent directories.
pub fn write_json(path: &str, report: &JsonReport<'_>) -> Result<(), String> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| format!("JSON serialization failed: {}", e))?;

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
        }
    }

    fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path, e))?;

    println!("JSON results written to: {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Stats;
    use phase_engines::EngineKind;
    use phase_runtime::SubmissionStats;

    #[test]
    fn test_report_serializes() {
        let results = vec![DataPoint {
            engine: EngineKind::Bitonic,
            size: 8,
            passes: 6,
            expected_passes: 6,
            checksum: Some(9),
            validated: true,
            device_stats: Stats::default(),
            cpu_stats: Stats::default(),
            speedup: 0.5,
            melem_per_sec: 1.0,
            submissions: SubmissionStats {
                launches: 6,
                copies: 0,
                waits: 6,
            },
        }];
        let report = JsonReport::new("CPU (4 threads)", CommitMode::Swap, 10, 3, &results);
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&report).unwrap()).unwrap();

        assert_eq!(value["device"], "CPU (4 threads)");
        assert_eq!(value["commit"], "swap");
        assert_eq!(value["all_validated"], true);
        assert_eq!(value["results"][0]["engine"], "bitonic");
        assert_eq!(value["results"][0]["checksum"], 9);
        assert_eq!(value["results"][0]["submissions"]["launches"], 6);
    }
}
