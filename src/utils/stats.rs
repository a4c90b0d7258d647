//! Summary statistics over repeated millisecond samples.

/// Min, max, mean, median and sample standard deviation of a sample set.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SampleStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

/// Compute statistics; all fields are zero for an empty slice.
pub fn compute_stats(samples: &[f64]) -> SampleStats {
    if samples.is_empty() {
        return SampleStats::default();
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let variance = if count < 2 {
        0.0
    } else {
        sorted.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / (count - 1) as f64
    };

    SampleStats {
        count,
        min: sorted[0],
        max: sorted[count - 1],
        mean,
        median: median_of_sorted(&sorted),
        std_dev: variance.sqrt(),
    }
}

/// Median of an already-sorted slice; averages the middle pair for even sizes.
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
