//! Single-threaded backend. Same program, same codec, no parallelism; useful
//! as a baseline for how much of the accelerated cost is pure format overhead.

use super::backend::ParallelComputeBackend;
use super::program::Bindings;
use crate::codec::AcceleratorBuffer;
use crate::error::{BenchError, Result};

#[derive(Default)]
pub struct ScalarBackend {
    bindings: Option<Bindings>,
}

impl ScalarBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParallelComputeBackend for ScalarBackend {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn initialize(&mut self) -> Result<()> {
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
        let bindings = self
            .bindings
            .as_mut()
            .ok_or_else(|| BenchError::RunFailure("dispatch before bind_buffers".into()))?;
        let (program, output) = bindings.targets()?;
        program.check_grid(size_x, size_y)?;

        for (idx, texel) in output.texels_mut().iter_mut().enumerate() {
            program.invoke(idx, size_x, texel);
        }
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
