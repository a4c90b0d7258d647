//! One synchronous benchmark run: generate, measure both paths, assemble.

use crate::accelerated::AcceleratedStrategy;
use crate::error::{BenchError, Result};
use crate::general::GeneralStrategy;
use crate::matrix::MatrixGenerator;
use crate::result::BenchmarkResult;
use tracing::debug;

const BYTES_PER_F32: usize = 4;
const MATRICES_PER_RUN: usize = 3;

/// Footprint of `A`, `B` and `C` as `f32` at `size×size`, in MiB.
///
/// An accounting estimate from the formula alone; codec buffers, the
/// transposed copy and allocator overhead are not counted, and nothing is
/// measured.
pub fn estimate_memory_mb(size: usize) -> f64 {
    (size * size * BYTES_PER_F32 * MATRICES_PER_RUN) as f64 / (1024.0 * 1024.0)
}

/// Both strategies, ready to be driven one run at a time.
pub struct BenchmarkEngine {
    general: GeneralStrategy,
    accelerated: AcceleratedStrategy,
}

impl BenchmarkEngine {
    pub fn new(general: GeneralStrategy, accelerated: AcceleratedStrategy) -> Self {
        Self {
            general,
            accelerated,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.accelerated.backend_name()
    }

    /// Generate one input pair and time it on the general path, then on the
    /// accelerated path. Any failure discards everything measured so far.
    /// A size the accelerator cannot encode is rejected before any allocation.
    pub fn run(&mut self, size: usize, seed: Option<u64>) -> Result<BenchmarkResult> {
        let max_dimension = self.accelerated.max_dimension();
        if size > max_dimension {
            return Err(BenchError::encode(format!(
                "matrix size {} exceeds accelerator maximum {}",
                size, max_dimension
            )));
        }

        let mut generator = MatrixGenerator::new(seed);
        let a = generator.next_matrix(size)?;
        let b = generator.next_matrix(size)?;
        let memory_mb = estimate_memory_mb(size);

        let (general_product, general_time) = self.general.multiply(&a, &b)?;
        let (accelerated_product, phases) = self.accelerated.multiply(&a, &b)?;

        if let Ok(diff) = general_product.max_abs_diff(&accelerated_product) {
            debug!(size, max_abs_diff = diff, "accelerated result divergence");
        }

        Ok(BenchmarkResult::new(size, general_time, phases, memory_mb))
    }
}
