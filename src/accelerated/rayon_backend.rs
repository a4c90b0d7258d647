//! Thread-pool backend: one rayon task per output cell.

use super::backend::ParallelComputeBackend;
use super::program::Bindings;
use crate::codec::AcceleratorBuffer;
use crate::error::{BenchError, Result};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Runs the program on a dedicated rayon pool, built on first `initialize`.
pub struct RayonBackend {
    threads: usize,
    pool: Option<ThreadPool>,
    bindings: Option<Bindings>,
}

impl RayonBackend {
    /// `threads == 0` lets rayon pick (one per logical CPU).
    pub fn new(threads: usize) -> Self {
        Self {
            threads,
            pool: None,
            bindings: None,
        }
    }

    pub fn current_num_threads(&self) -> Option<usize> {
        self.pool.as_ref().map(|p| p.current_num_threads())
    }
}

impl Default for RayonBackend {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ParallelComputeBackend for RayonBackend {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn initialize(&mut self) -> Result<()> {
        if self.pool.is_some() {
            return Ok(());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("matbench-accel-{}", i))
            .build()
            .map_err(|e| BenchError::unavailable(self.name(), e.to_string()))?;
        tracing::debug!(threads = pool.current_num_threads(), "rayon backend ready");
        self.pool = Some(pool);
        Ok(())
    }

    fn bind_buffers(
        &mut self,
        a: AcceleratorBuffer,
        b: AcceleratorBuffer,
        size: usize,
    ) -> Result<()> {
        self.bindings = Some(Bindings::new(a, b, size)?);
        Ok(())
    }

    fn dispatch(&mut self, size_x: usize, size_y: usize) -> Result<()> {
        let pool = self
            .pool
            .as_ref()
            .ok_or_else(|| BenchError::unavailable("rayon", "dispatch before initialize"))?;
        let bindings = self
            .bindings
            .as_mut()
            .ok_or_else(|| BenchError::RunFailure("dispatch before bind_buffers".into()))?;
        let (program, output) = bindings.targets()?;
        program.check_grid(size_x, size_y)?;

        pool.install(|| {
            output
                .texels_mut()
                .par_iter_mut()
                .enumerate()
                .for_each(|(idx, texel)| program.invoke(idx, size_x, texel));
        });
        Ok(())
    }

    fn read_output(&mut self) -> Result<AcceleratorBuffer> {
        self.bindings
            .as_mut()
            .ok_or_else(|| BenchError::RunFailure("read_output before bind_buffers".into()))?
            .take_output()
    }

    fn release(&mut self) {
        self.bindings = None;
    }
}
