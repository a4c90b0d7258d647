//! Outcome of one completed benchmark run.

use crate::accelerated::PhaseTimings;
use crate::utils::as_millis_f64;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Immutable record of one run at one matrix size.
///
/// Only the measured inputs are stored; transfer overhead, its percentage and
/// the speedup are always derived from them, so they cannot drift apart.
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkResult {
    matrix_size: usize,
    general_time: Duration,
    phases: PhaseTimings,
    memory_allocated_mb: f64,
    timestamp: SystemTime,
}

impl BenchmarkResult {
    pub fn new(
        matrix_size: usize,
        general_time: Duration,
        phases: PhaseTimings,
        memory_allocated_mb: f64,
    ) -> Self {
        Self {
            matrix_size,
            general_time,
            phases,
            memory_allocated_mb,
            timestamp: SystemTime::now(),
        }
    }

    /// Same result with an explicit timestamp.
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn matrix_size(&self) -> usize {
        self.matrix_size
    }

    pub fn general_time_ms(&self) -> f64 {
        as_millis_f64(self.general_time)
    }

    pub fn accelerated_total_ms(&self) -> f64 {
        self.phases.total_ms()
    }

    pub fn accelerated_compute_ms(&self) -> f64 {
        self.phases.compute_ms()
    }

    /// Transfer-in plus transfer-out, without the configure step.
    pub fn transfer_ms(&self) -> f64 {
        as_millis_f64(self.phases.transfer())
    }

    pub fn phases(&self) -> &PhaseTimings {
        &self.phases
    }

    /// Estimated, not measured; see the orchestrator's memory accounting.
    pub fn memory_allocated_mb(&self) -> f64 {
        self.memory_allocated_mb
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    pub fn timestamp_millis(&self) -> u128 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0)
    }

    /// `accelerated_total_ms - accelerated_compute_ms`
    pub fn transfer_overhead_ms(&self) -> f64 {
        self.accelerated_total_ms() - self.accelerated_compute_ms()
    }

    /// Share of the accelerated total not spent computing, in percent.
    /// Zero when the accelerated total is zero.
    pub fn transfer_overhead_percent(&self) -> f64 {
        let total = self.accelerated_total_ms();
        if total == 0.0 {
            0.0
        } else {
            100.0 * self.transfer_overhead_ms() / total
        }
    }

    /// How many times faster the accelerated path was end to end.
    /// Zero when the accelerated total is zero.
    pub fn speedup(&self) -> f64 {
        let total = self.accelerated_total_ms();
        if total == 0.0 {
            0.0
        } else {
            self.general_time_ms() / total
        }
    }

    /// True when the accelerated path beat the general path outright.
    pub fn accelerated_wins(&self) -> bool {
        self.phases.total() < self.general_time
    }

    pub fn speedup_message(&self) -> String {
        let speedup = self.speedup();
        if speedup > 1.0 {
            format!("Accelerated path is {:.2}x faster", speedup)
        } else if speedup > 0.0 && speedup < 1.0 {
            format!("General path is {:.2}x faster", 1.0 / speedup)
        } else {
            "Same performance".to_string()
        }
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[{}] Benchmark N={} completed.",
            self.timestamp_millis(),
            self.matrix_size
        )?;
        writeln!(f, "General time: {:.3}ms", self.general_time_ms())?;
        writeln!(
            f,
            "Accelerated time: {:.3}ms (compute: {:.3}ms, transfer: {:.3}ms)",
            self.accelerated_total_ms(),
            self.accelerated_compute_ms(),
            self.transfer_ms()
        )?;
        write!(f, "Speedup: {:.2}x", self.speedup())
    }
}
