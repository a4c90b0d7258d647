//! CSV export of a run history.

use crate::result::BenchmarkResult;
use std::io::Write;
use std::path::Path;

const HEADER: &str = "timestamp_ms,matrix_size,backend,general_ms,accelerated_total_ms,\
accelerated_compute_ms,transfer_ms,transfer_overhead_ms,transfer_overhead_percent,speedup,memory_mb";

/// Write one row per result, in history order.
pub fn export_csv(
    path: impl AsRef<Path>,
    backend: &str,
    history: &[BenchmarkResult],
) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(std::io::BufWriter::new(file), backend, history)
}

/// Same rows as [`export_csv`], to any writer.
pub fn write_csv(
    mut out: impl Write,
    backend: &str,
    history: &[BenchmarkResult],
) -> std::io::Result<()> {
    writeln!(out, "{}", HEADER)?;

    for r in history {
        writeln!(
            out,
            "{},{},{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.3},{:.4},{:.4}",
            r.timestamp_millis(),
            r.matrix_size(),
            backend,
            r.general_time_ms(),
            r.accelerated_total_ms(),
            r.accelerated_compute_ms(),
            r.transfer_ms(),
            r.transfer_overhead_ms(),
            r.transfer_overhead_percent(),
            r.speedup(),
            r.memory_allocated_mb()
        )?;
    }

    out.flush()
}
