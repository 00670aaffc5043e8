mod cli;
mod config;
mod harness;
mod output;
mod reference;
mod stats;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{BackendChoice, BenchArgs};
use config::RunConfig;
use harness::{format_size, run_engine_bench, DataPoint};
use output::json::{write_json, JsonReport};
use output::progress::RunProgress;
use output::table::render_all_tables;
use phase_engines::EngineOptions;
use phase_runtime::{Backend, CpuBackend};

fn main() -> Result<()> {
    let args = BenchArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = RunConfig::from_args(&args).map_err(|e| anyhow!(e))?;
    let options = EngineOptions {
        commit: args.commit,
    };

    match args.backend {
        BackendChoice::Cpu => {
            let mut backend = CpuBackend::with_threads(args.threads)
                .context("failed to create CPU backend")?;
            run_all(&mut backend, &args, &config, options)
        }
        #[cfg(target_os = "macos")]
        BackendChoice::Metal => {
            let mut backend =
                phase_runtime::MetalBackend::new().context("failed to create Metal backend")?;
            run_all(&mut backend, &args, &config, options)
        }
        #[cfg(not(target_os = "macos"))]
        BackendChoice::Metal => bail!("the Metal backend is only available on macOS"),
    }
}

fn run_all<B: Backend>(
    backend: &mut B,
    args: &BenchArgs,
    config: &RunConfig,
    options: EngineOptions,
) -> Result<()> {
    let device = backend.name();
    println!("Selected device: {}", device);
    println!(
        "  Engines: {}",
        config
            .engines
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  Sizes: {}",
        config
            .sizes
            .iter()
            .map(|&n| format_size(n))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  Runs: {}, Warmup: {}, Commit: {}",
        config.runs, config.warmup, options.commit
    );
    println!();

    let progress = RunProgress::new();
    let mut all_results: Vec<DataPoint> = Vec::new();

    for &kind in &config.engines {
        let cb = progress.callback();
        let results = run_engine_bench(kind, backend, config, options, Some(&cb))
            .with_context(|| format!("{} engine failed", kind))?;
        for dp in &results {
            let checksum = dp
                .checksum
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string());
            progress.println(format!(
                "{} N={}: passes={} checksum current[N-1]={}",
                kind, dp.size, dp.passes, checksum
            ));
        }
        all_results.extend(results);
    }

    progress.finish();

    render_all_tables(&all_results);

    if let Some(ref path) = args.json_file {
        let report = JsonReport::new(&device, options.commit, config.runs, config.warmup, &all_results);
        if let Err(e) = write_json(path, &report) {
            eprintln!("Error writing JSON: {}", e);
        }
    }

    let failures = all_results.iter().filter(|dp| !dp.validated).count();
    if failures > 0 {
        bail!("{} of {} results failed validation", failures, all_results.len());
    }
    Ok(())
}
