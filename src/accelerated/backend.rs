//! Pluggable parallel compute backends.
//!
//! A backend is anything that can run [`MatMulProgram`] over an `N×N` grid:
//! a thread pool, a SIMD engine, a GPU queue. The strategy drives it through
//! a fixed protocol:
//!
//! 1. [`initialize`](ParallelComputeBackend::initialize) (idempotent)
//! 2. [`bind_buffers`](ParallelComputeBackend::bind_buffers)
//! 3. [`dispatch`](ParallelComputeBackend::dispatch), blocking until every cell is written
//! 4. [`read_output`](ParallelComputeBackend::read_output)
//! 5. [`release`](ParallelComputeBackend::release), always, even after a failure
//!
//! [`MatMulProgram`]: super::program::MatMulProgram

use crate::codec::AcceleratorBuffer;
use crate::error::Result;

pub trait ParallelComputeBackend: Send {
    /// Short identifier, e.g. `"rayon"`.
    fn name(&self) -> &'static str;

    /// Bring up execution resources. Fails with `AcceleratorUnavailable`.
    fn initialize(&mut self) -> Result<()>;

    /// Bind both operand buffers and the dimension; allocates the output target.
    fn bind_buffers(
        &mut self,
        a: AcceleratorBuffer,
        b: AcceleratorBuffer,
        size: usize,
    ) -> Result<()>;

    /// Run the program over a `size_x × size_y` grid and wait for completion.
    fn dispatch(&mut self, size_x: usize, size_y: usize) -> Result<()>;

    /// Hand back the output buffer written by the last dispatch.
    fn read_output(&mut self) -> Result<AcceleratorBuffer>;

    /// Drop every bound buffer. Must be safe to call in any state.
    fn release(&mut self);
}

/// Scope of one bind/dispatch/read cycle; releases the backend on drop.
pub(crate) struct BackendSession<'a> {
    backend: &'a mut dyn ParallelComputeBackend,
}

impl<'a> BackendSession<'a> {
    pub(crate) fn open(backend: &'a mut dyn ParallelComputeBackend) -> Self {
        Self { backend }
    }

    pub(crate) fn bind_buffers(
        &mut self,
        a: AcceleratorBuffer,
        b: AcceleratorBuffer,
        size: usize,
    ) -> Result<()> {
        self.backend.bind_buffers(a, b, size)
    }

    pub(crate) fn dispatch(&mut self, size_x: usize, size_y: usize) -> Result<()> {
        self.backend.dispatch(size_x, size_y)
    }

    pub(crate) fn read_output(&mut self) -> Result<AcceleratorBuffer> {
        self.backend.read_output()
    }
}

impl Drop for BackendSession<'_> {
    fn drop(&mut self) {
        self.backend.release();
        tracing::trace!(backend = self.backend.name(), "backend buffers released");
    }
}
