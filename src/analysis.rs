//! Scalability analysis over a run history.
//!
//! Everything here is a pure function of a history snapshot. The crossover is
//! advisory: it names the smallest *observed* size where the accelerated path
//! won, not a continuous threshold.

use crate::result::BenchmarkResult;
use crate::utils::stats::{compute_stats, SampleStats};
use std::collections::BTreeMap;

/// Smallest matrix size at which the accelerated total beat the general time.
pub fn crossover(history: &[BenchmarkResult]) -> Option<usize> {
    let mut sorted: Vec<&BenchmarkResult> = history.iter().collect();
    sorted.sort_by_key(|r| r.matrix_size());
    sorted
        .into_iter()
        .find(|r| r.accelerated_wins())
        .map(|r| r.matrix_size())
}

/// Points for a two-line scalability chart, sorted by size.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScalabilitySeries {
    /// `(matrix_size, general_time_ms)`
    pub general_points: Vec<(usize, f64)>,
    /// `(matrix_size, accelerated_total_ms)`
    pub accelerated_points: Vec<(usize, f64)>,
    pub crossover: Option<usize>,
}

impl ScalabilitySeries {
    pub fn from_history(history: &[BenchmarkResult]) -> Self {
        let mut sorted: Vec<&BenchmarkResult> = history.iter().collect();
        sorted.sort_by_key(|r| r.matrix_size());

        Self {
            general_points: sorted
                .iter()
                .map(|r| (r.matrix_size(), r.general_time_ms()))
                .collect(),
            accelerated_points: sorted
                .iter()
                .map(|r| (r.matrix_size(), r.accelerated_total_ms()))
                .collect(),
            crossover: crossover(history),
        }
    }
}

/// Aggregate of every run recorded at one matrix size.
#[derive(Clone, Debug, PartialEq)]
pub struct SizeSummary {
    pub matrix_size: usize,
    pub general_ms: SampleStats,
    pub accelerated_ms: SampleStats,
}

impl SizeSummary {
    /// Median general time over median accelerated time; zero when the latter is zero.
    pub fn median_speedup(&self) -> f64 {
        if self.accelerated_ms.median == 0.0 {
            0.0
        } else {
            self.general_ms.median / self.accelerated_ms.median
        }
    }
}

/// Group repeated sizes and summarize both paths, ascending by size.
pub fn summarize(history: &[BenchmarkResult]) -> Vec<SizeSummary> {
    let mut by_size: BTreeMap<usize, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for r in history {
        let entry = by_size.entry(r.matrix_size()).or_default();
        entry.0.push(r.general_time_ms());
        entry.1.push(r.accelerated_total_ms());
    }
    by_size
        .into_iter()
        .map(|(matrix_size, (general, accelerated))| SizeSummary {
            matrix_size,
            general_ms: compute_stats(&general),
            accelerated_ms: compute_stats(&accelerated),
        })
        .collect()
}
