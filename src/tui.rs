//! Text User Interface (TUI) utilities.
//!
//! Handles formatted output for the CLI.

use crate::accelerated::Phase;
use crate::analysis::{summarize, ScalabilitySeries};
use crate::general::code::available_variants;
use crate::registry::BackendRegistry;
use crate::result::BenchmarkResult;
use crate::utils::format_duration;
use std::time::Duration;
use terminal_size::{terminal_size, Width};

/// Get the current terminal width, constrained to a reasonable range
fn get_term_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() {
        (w as usize).clamp(40, 200)
    } else {
        80
    }
}

/// Truncate string with ellipsis if it exceeds width (character-wise)
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut result: String = s.chars().take(width.saturating_sub(3)).collect();
        result.push_str("...");
        result
    }
}

fn ms(value: f64) -> String {
    format_duration(Duration::from_secs_f64(value.max(0.0) / 1000.0))
}

/// Print the application header
pub fn print_header() {
    let term_width = get_term_width().min(80);
    let title = " Matrix Multiply Crossover Benchmark ";
    let padding = term_width.saturating_sub(title.len() + 2) / 2;
    let right_padding = term_width.saturating_sub(padding + title.len());

    let border = "═".repeat(term_width);

    println!("╔{}╗", border);
    println!(
        "║{}{}{}║",
        " ".repeat(padding),
        title,
        " ".repeat(right_padding)
    );
    println!("╚{}╝", border);
    println!();
}

/// Print the help message
pub fn print_help() {
    println!("Usage: matbench [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --list, -l          List accelerator backends and general kernels");
    println!("  --help, -h          Show this help message");
    println!("  --sizes SIZES       Comma-separated matrix sizes (default: 64,128,256,512)");
    println!("  --seed N            Seed for reproducible input matrices (default: fresh)");
    println!("  --backend NAME      Accelerator backend (default: rayon)");
    println!("  --threads N         Backend worker threads, 0 = all cores (default: 0)");
    println!("  --transpose POLICY  never | always | minimum size N (default: always)");
    println!("  --no-pin            Do not pin the general path to one core");
    println!("  --csv FILE          Export the run history to CSV");
    println!();
    println!("Environment:");
    println!("  MATBENCH_SEED, MATBENCH_BACKEND, MATBENCH_THREADS  same as the flags");
    println!("  RUST_LOG                                           log filter (default: warn)");
    println!();
    println!("Examples:");
    println!("  matbench                          # Default sizes on rayon");
    println!("  matbench --sizes 32,1024          # Custom sizes");
    println!("  matbench --backend scalar         # Single-threaded baseline");
    println!("  matbench --seed 42 --csv out.csv  # Reproducible run with export");
}

/// Print registered accelerator backends and the general-path kernels.
pub fn print_backends(registry: &BackendRegistry) {
    let term_width = get_term_width();
    let desc_width = term_width.saturating_sub(26).max(20);

    println!("Accelerator backends:");
    println!();
    for info in registry.all() {
        println!(
            "  {:<20} - {}",
            info.name,
            truncate(info.description, desc_width)
        );
    }
    println!();
    println!("General-path kernels:");
    println!();
    for variant in available_variants() {
        println!(
            "  {:<20} - {}",
            variant.name,
            truncate(variant.description, desc_width)
        );
    }
}

/// Print the phase breakdown of one run.
pub fn print_result_breakdown(result: &BenchmarkResult) {
    let table_width = 44;
    let phases = result.phases();

    println!(
        "  N = {} ({:.2} MB estimated)",
        result.matrix_size(),
        result.memory_allocated_mb()
    );
    println!("  {}", "─".repeat(table_width));
    println!("  {:<28} {:>15}", "General path", ms(result.general_time_ms()));
    for phase in Phase::ALL {
        println!(
            "  {:<28} {:>15}",
            format!("  {}", phase),
            format_duration(phases.get(phase))
        );
    }
    println!(
        "  {:<28} {:>15}",
        "Accelerated total",
        ms(result.accelerated_total_ms())
    );
    println!(
        "  {:<28} {:>14.1}%",
        "Transfer overhead",
        result.transfer_overhead_percent()
    );
    println!("  {}", "─".repeat(table_width));
    println!("  {}", result.speedup_message());
    println!();
}

/// Print every run sorted by size, plus the crossover if one was observed.
pub fn print_scalability_table(history: &[BenchmarkResult]) {
    if history.is_empty() {
        return;
    }

    let series = ScalabilitySeries::from_history(history);
    let table_width = 64;

    println!("  Scalability");
    println!("  {}", "─".repeat(table_width));
    println!(
        "  {:>8} {:>14} {:>14} {:>12} {:>10}",
        "Size", "General", "Accelerated", "Overhead", "Speedup"
    );
    println!("  {}", "─".repeat(table_width));

    let mut sorted: Vec<&BenchmarkResult> = history.iter().collect();
    sorted.sort_by_key(|r| r.matrix_size());
    for r in sorted {
        let marker = if series.crossover == Some(r.matrix_size()) {
            " <"
        } else {
            ""
        };
        println!(
            "  {:>8} {:>14} {:>14} {:>11.1}% {:>9.2}x{}",
            r.matrix_size(),
            ms(r.general_time_ms()),
            ms(r.accelerated_total_ms()),
            r.transfer_overhead_percent(),
            r.speedup(),
            marker
        );
    }
    println!("  {}", "─".repeat(table_width));

    match series.crossover {
        Some(size) => println!("  Crossover: accelerated path first wins at N = {}", size),
        None => println!("  Crossover: general path won at every measured size"),
    }
    println!();
}

/// Print per-size medians when some size was measured more than once.
pub fn print_repeat_summary(history: &[BenchmarkResult]) {
    let summaries = summarize(history);
    if summaries.iter().all(|s| s.general_ms.count < 2) {
        return;
    }

    println!("  Repeated sizes (median)");
    println!(
        "  {:>8} {:>6} {:>14} {:>14} {:>10}",
        "Size", "Runs", "General", "Accelerated", "Speedup"
    );
    for s in summaries.iter().filter(|s| s.general_ms.count > 1) {
        println!(
            "  {:>8} {:>6} {:>14} {:>14} {:>9.2}x",
            s.matrix_size,
            s.general_ms.count,
            ms(s.general_ms.median),
            ms(s.accelerated_ms.median),
            s.median_speedup()
        );
    }
    println!();
}
