//! CLI for the matrix multiply crossover benchmark.
//!
//! Usage:
//!   matbench                      # Default sizes on the default backend
//!   matbench --list               # List backends and kernels
//!   matbench --sizes 64,512       # Custom sizes
//!   matbench --help               # Show help

use anyhow::{bail, Context};
use matmul_crossover::config::BenchConfig;
use matmul_crossover::orchestrator::{BenchmarkOrchestrator, BenchmarkState};
use matmul_crossover::registry::build_registry;
use matmul_crossover::{tui, utils};
use std::env;
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> anyhow::Result<&'a str> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .with_context(|| format!("{} needs a value", flag))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let registry = build_registry();
    let mut config = BenchConfig::from_env();

    // Parse arguments
    let mut show_list = false;
    let mut show_help = false;
    let mut sizes: Vec<usize> = vec![64, 128, 256, 512];
    let mut csv_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--list" | "-l" => show_list = true,
            "--help" | "-h" => show_help = true,
            "--sizes" => {
                sizes = next_value(&args, &mut i, "--sizes")?
                    .split(',')
                    .map(|s| s.trim().parse())
                    .collect::<Result<_, _>>()
                    .context("--sizes expects comma-separated integers")?;
            }
            "--seed" => {
                let raw = next_value(&args, &mut i, "--seed")?;
                config.seed = Some(raw.parse().context("--seed expects an integer")?);
            }
            "--backend" => {
                config.backend = next_value(&args, &mut i, "--backend")?.to_string();
            }
            "--threads" => {
                let raw = next_value(&args, &mut i, "--threads")?;
                config.backend_threads = raw.parse().context("--threads expects an integer")?;
            }
            "--transpose" => {
                config.transpose = next_value(&args, &mut i, "--transpose")?.parse()?;
            }
            "--no-pin" => config.pin_general = false,
            "--csv" => {
                csv_path = Some(next_value(&args, &mut i, "--csv")?.to_string());
            }
            other => bail!("Unknown option: {} (try --help)", other),
        }
        i += 1;
    }

    if show_help {
        tui::print_help();
        return Ok(());
    }

    if show_list {
        tui::print_backends(&registry);
        return Ok(());
    }

    if registry.find(&config.backend).is_none() {
        bail!(
            "Backend '{}' not found. Available: {:?}",
            config.backend,
            registry.list_names()
        );
    }

    tui::print_header();
    println!(
        "  Backend: {}  |  Cores: {}  |  Transpose: {:?}  |  Seed: {}",
        config.backend,
        utils::online_cpus(),
        config.transpose,
        config
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "fresh".to_string())
    );
    println!();

    let orchestrator = BenchmarkOrchestrator::from_config(Handle::current(), &config)?;

    for &size in &sizes {
        match orchestrator.run_to_completion(size).await {
            BenchmarkState::Success { result, .. } => tui::print_result_breakdown(&result),
            BenchmarkState::Error {
                message,
                matrix_size,
            } => eprintln!("  N = {}: {}\n", matrix_size, message),
            other => eprintln!("  N = {}: run ended in unexpected state {:?}\n", size, other),
        }
    }

    let history = orchestrator.history();
    tui::print_scalability_table(&history);
    tui::print_repeat_summary(&history);

    if let Some(path) = csv_path {
        utils::export_csv(&path, &config.backend, &history)
            .with_context(|| format!("writing {}", path))?;
        println!("  Exported {} runs to {}", history.len(), path);
    }

    Ok(())
}
