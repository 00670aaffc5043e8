use phase_engines::EngineKind;
use serde::{Deserialize, Serialize};

use crate::cli::BenchArgs;

pub const DEFAULT_SIZE: usize = 1 << 20;
pub const DEFAULT_RUNS: u32 = 10;
pub const DEFAULT_WARMUP: u32 = 3;

/// A run profile with preset sizes, runs, and warmup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunProfile {
    pub name: String,
    pub sizes: Vec<usize>,
    pub runs: u32,
    pub warmup: u32,
}

/// Returns the "quick" profile: 64K / 3 runs / 1 warmup.
pub fn quick_profile() -> RunProfile {
    RunProfile {
        name: "quick".to_string(),
        sizes: vec![1 << 16],
        runs: 3,
        warmup: 1,
    }
}

/// Returns the "standard" profile: 1M+4M / 10 runs / 3 warmup.
pub fn standard_profile() -> RunProfile {
    RunProfile {
        name: "standard".to_string(),
        sizes: vec![1 << 20, 1 << 22],
        runs: 10,
        warmup: 3,
    }
}

/// Returns the "thorough" profile: 1M+4M+16M / 30 runs / 3 warmup.
pub fn thorough_profile() -> RunProfile {
    RunProfile {
        name: "thorough".to_string(),
        sizes: vec![1 << 20, 1 << 22, 1 << 24],
        runs: 30,
        warmup: 3,
    }
}

/// Lookup a profile by name.
pub fn get_profile(name: &str) -> Option<RunProfile> {
    match name {
        "quick" => Some(quick_profile()),
        "standard" => Some(standard_profile()),
        "thorough" => Some(thorough_profile()),
        _ => None,
    }
}

/// Parse an element count.
///
/// Supports:
/// - "2^20" -> 1_048_576
/// - "64K" or "64k" -> 65_536
/// - "1M" -> 1_048_576, "0.5M" -> 524_288
/// - "1G" -> 1_073_741_824
/// - "1_000_000" -> 1_000_000
pub fn parse_size(s: &str) -> Result<usize, String> {
    let trimmed = s.trim();
    let cleaned = trimmed.replace('_', "");

    if let Some(exp) = cleaned.strip_prefix("2^") {
        let exp: u32 = exp
            .parse()
            .map_err(|e| format!("Invalid size '{}': {}", trimmed, e))?;
        if exp >= usize::BITS {
            return Err(format!("Invalid size '{}': exponent too large", trimmed));
        }
        return Ok(1usize << exp);
    }

    let shift = match cleaned.chars().last() {
        Some('K' | 'k') => Some(10),
        Some('M' | 'm') => Some(20),
        Some('G' | 'g') => Some(30),
        _ => None,
    };
    if let Some(shift) = shift {
        let num: f64 = cleaned[..cleaned.len() - 1]
            .parse()
            .map_err(|e| format!("Invalid size '{}': {}", trimmed, e))?;
        if !num.is_finite() || num < 0.0 {
            return Err(format!("Invalid size '{}': must be non-negative", trimmed));
        }
        return Ok((num * (1u64 << shift) as f64) as usize);
    }

    cleaned
        .parse::<usize>()
        .map_err(|e| format!("Invalid size '{}': {}", trimmed, e))
}

/// Parse a comma-separated list of size strings.
pub fn parse_sizes(raw: &[String]) -> Result<Vec<usize>, String> {
    raw.iter().map(|s| parse_size(s)).collect()
}

/// Resolve engine names; empty or "all" selects every engine.
pub fn parse_engines(raw: &[String]) -> Result<Vec<EngineKind>, String> {
    if raw.is_empty() || raw.iter().any(|name| name.eq_ignore_ascii_case("all")) {
        return Ok(EngineKind::ALL.to_vec());
    }
    let mut engines = Vec::new();
    for name in raw {
        let kind: EngineKind = name.parse().map_err(|e| format!("{e}"))?;
        if !engines.contains(&kind) {
            engines.push(kind);
        }
    }
    Ok(engines)
}

/// Fully resolved run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub engines: Vec<EngineKind>,
    pub sizes: Vec<usize>,
    pub runs: u32,
    pub warmup: u32,
}

impl RunConfig {
    /// Resolve CLI arguments against the selected profile.
    ///
    /// `--sizes` beats the profile's sizes; explicit `--runs` / `--warmup`
    /// beat the profile's counts.
    pub fn from_args(args: &BenchArgs) -> Result<Self, String> {
        let profile = match args.profile.as_deref() {
            Some(name) => Some(get_profile(name).ok_or_else(|| {
                format!("Unknown profile '{}'. Valid: quick, standard, thorough", name)
            })?),
            None => None,
        };

        let sizes = match (&args.sizes, &profile) {
            (Some(raw), _) => parse_sizes(raw)?,
            (None, Some(p)) => p.sizes.clone(),
            (None, None) => vec![DEFAULT_SIZE],
        };
        let runs = args
            .runs
            .or(profile.as_ref().map(|p| p.runs))
            .unwrap_or(DEFAULT_RUNS);
        let warmup = args
            .warmup
            .or(profile.as_ref().map(|p| p.warmup))
            .unwrap_or(DEFAULT_WARMUP);

        let config = Self {
            engines: parse_engines(&args.engines)?,
            sizes,
            runs: runs.max(1),
            warmup,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the engines cannot run.
    pub fn validate(&self) -> Result<(), String> {
        if self.sizes.is_empty() {
            return Err("No sizes given".to_string());
        }
        if self.engines.contains(&EngineKind::Bitonic) {
            if let Some(&bad) = self
                .sizes
                .iter()
                .find(|&&n| n > 1 && !n.is_power_of_two())
            {
                return Err(format!(
                    "bitonic requires power-of-two sizes, got {} (try 2^{})",
                    bad,
                    usize::BITS - 1 - bad.leading_zeros()
                ));
            }
        }
        Ok(())
    }
}
