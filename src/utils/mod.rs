//! Utility modules for timing, pinning, statistics and export.

pub mod cpu_affinity;
pub mod export;
pub mod stats;
pub mod timer;

// Re-export commonly used items
pub use cpu_affinity::{online_cpus, CpuPinGuard};
pub use export::export_csv;
pub use stats::{compute_stats, SampleStats};
pub use timer::{as_millis_f64, format_duration, timed};

/// Information about a kernel implementation variant.
/// Generic over F which is the function signature.
pub struct VariantInfo<F> {
    /// Unique identifier for this variant (e.g., "original", "transposed")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// The specific implementation function
    pub function: F,
}
