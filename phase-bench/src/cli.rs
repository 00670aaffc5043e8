use clap::{ArgAction, Parser, ValueEnum};
use phase_engines::CommitMode;

/// Execution substrate to run the passes on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendChoice {
    /// Rayon thread pool on the host
    Cpu,
    /// System default Metal GPU (macOS only)
    Metal,
}

/// Phase-doubling scan and sort engines: self-test and benchmark driver
#[derive(Parser, Debug)]
#[command(name = "phase-bench", version, about)]
pub struct BenchArgs {
    /// Engines to run (scan, bitonic, merge). Use "all" or omit for every engine.
    #[arg(value_name = "ENGINES")]
    pub engines: Vec<String>,

    /// Element counts to run (e.g. 2^20, 64K, 1M, 1_000_000). K/M/G are binary.
    #[arg(long, value_delimiter = ',')]
    pub sizes: Option<Vec<String>>,

    /// Number of measured runs per size [default: 10, or the profile's]
    #[arg(long)]
    pub runs: Option<u32>,

    /// Number of warmup runs before measurement [default: 3, or the profile's]
    #[arg(long)]
    pub warmup: Option<u32>,

    /// Run profile: quick (64K/3/1), standard (1M+4M/10/3), thorough (1M+4M+16M/30/3)
    #[arg(long)]
    pub profile: Option<String>,

    /// Backend executing the passes
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    pub backend: BackendChoice,

    /// Worker threads for the CPU backend (default: one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// How a finished pass is committed: copy (next -> current) or swap
    #[arg(long, default_value_t = CommitMode::Copy)]
    pub commit: CommitMode,

    /// Write JSON results to file
    #[arg(long)]
    pub json_file: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl BenchArgs {
    /// Default log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = BenchArgs::try_parse_from(["phase-bench"]).unwrap();
        assert!(args.engines.is_empty());
        assert!(args.sizes.is_none());
        assert_eq!(args.runs, None);
        assert_eq!(args.backend, BackendChoice::Cpu);
        assert_eq!(args.commit, CommitMode::Copy);
        assert_eq!(args.log_filter(), "info");
    }

    #[test]
    fn test_full_command_line() {
        let args = BenchArgs::try_parse_from([
            "phase-bench",
            "scan",
            "merge",
            "--sizes",
            "2^10,64K",
            "--runs",
            "5",
            "--backend",
            "metal",
            "--commit",
            "swap",
            "--threads",
            "4",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.engines, vec!["scan", "merge"]);
        assert_eq!(
            args.sizes,
            Some(vec!["2^10".to_string(), "64K".to_string()])
        );
        assert_eq!(args.runs, Some(5));
        assert_eq!(args.backend, BackendChoice::Metal);
        assert_eq!(args.commit, CommitMode::Swap);
        assert_eq!(args.threads, Some(4));
        assert_eq!(args.log_filter(), "trace");
    }

    #[test]
    fn test_rejects_unknown_commit_mode() {
        assert!(BenchArgs::try_parse_from(["phase-bench", "--commit", "move"]).is_err());
    }
}
