//! # Accelerated Path
//!
//! Multiplies by handing a fixed compute program to a
//! [`ParallelComputeBackend`], going through the half-precision
//! [`BufferCodec`] on the way in and out. Each step is timed on its own:
//!
//! | Phase        | Work                                             |
//! |--------------|--------------------------------------------------|
//! | transfer-in  | encode `A` and `B` into accelerator buffers      |
//! | configure    | bind both buffers and `N` to the program         |
//! | compute      | dispatch `N×N` invocations, block until finished |
//! | transfer-out | read the output buffer back and decode it        |
//!
//! The sum of the four is the accelerated cost that gets compared with the
//! general path; compute alone would hide the format and setup overhead.

pub mod backend;
pub mod phases;
pub mod program;
pub mod rayon_backend;
pub mod scalar_backend;
#[cfg(test)]
mod test;

pub use backend::ParallelComputeBackend;
pub use phases::{Phase, PhaseRecorder, PhaseTimings};
pub use rayon_backend::RayonBackend;
pub use scalar_backend::ScalarBackend;

use crate::codec::{half_ulp, BufferCodec};
use crate::error::Result;
use crate::matrix::{ensure_same_size, Matrix};
use crate::utils::timed;
use backend::BackendSession;
use tracing::debug;

/// Largest difference between the accelerated and general results for an
/// output cell whose exact value is `expected`, assuming non-negative operands.
///
/// Both inputs lose up to one half-precision rounding on encode and the sum
/// loses one more on the way out; four half-precision ulps of the result
/// covers all of it with room to spare.
pub fn accelerated_tolerance(expected: f32) -> f32 {
    4.0 * half_ulp(expected) + f32::EPSILON
}

pub struct AcceleratedStrategy {
    backend: Box<dyn ParallelComputeBackend>,
    codec: BufferCodec,
}

impl AcceleratedStrategy {
    pub fn new(backend: Box<dyn ParallelComputeBackend>, codec: BufferCodec) -> Self {
        Self { backend, codec }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Largest matrix dimension the codec will encode for this backend.
    pub fn max_dimension(&self) -> usize {
        self.codec.max_dimension()
    }

    /// Multiply `a × b` on the backend. Backend buffers are released before
    /// this returns, whether it succeeds or not.
    pub fn multiply(&mut self, a: &Matrix, b: &Matrix) -> Result<(Matrix, PhaseTimings)> {
        ensure_same_size(a, b)?;
        let size = a.size();
        self.backend.initialize()?;

        let codec = self.codec;
        let mut phases = PhaseRecorder::default();

        let (elapsed, encoded) = timed(|| -> Result<_> { Ok((codec.encode(a)?, codec.encode(b)?)) });
        let (buf_a, buf_b) = encoded?;
        phases.record(Phase::TransferIn, elapsed)?;

        let mut session = BackendSession::open(self.backend.as_mut());

        let (elapsed, bound) = timed(|| session.bind_buffers(buf_a, buf_b, size));
        bound?;
        phases.record(Phase::Configure, elapsed)?;

        let (elapsed, dispatched) = timed(|| session.dispatch(size, size));
        dispatched?;
        phases.record(Phase::Compute, elapsed)?;

        let (elapsed, decoded) = timed(|| -> Result<_> {
            let output = session.read_output()?;
            codec.decode(&output, size)
        });
        let product = decoded?;
        phases.record(Phase::TransferOut, elapsed)?;

        drop(session);
        let timings = phases.finish()?;
        debug!(
            size,
            backend = self.backend.name(),
            transfer_in_ms = crate::utils::as_millis_f64(timings.transfer_in),
            configure_ms = crate::utils::as_millis_f64(timings.configure),
            compute_ms = timings.compute_ms(),
            transfer_out_ms = crate::utils::as_millis_f64(timings.transfer_out),
            "accelerated multiply finished"
        );
        Ok((product, timings))
    }

    /// Compare this backend with the general path on a seeded input, cell by
    /// cell, within [`accelerated_tolerance`].
    pub fn verify(&mut self) -> std::result::Result<(), String> {
        let size = 33;
        let a = crate::matrix::generate(size, Some(0xACCE1)).map_err(|e| e.to_string())?;
        let b = crate::matrix::generate(size, Some(0xACCE2)).map_err(|e| e.to_string())?;

        let reference = crate::general::code::multiply_original(&a, &b);
        let (product, _) = self.multiply(&a, &b).map_err(|e| e.to_string())?;

        for (idx, (&got, &expected)) in product
            .as_slice()
            .iter()
            .zip(reference.as_slice())
            .enumerate()
        {
            let diff = (got - expected).abs();
            if diff > accelerated_tolerance(expected) {
                return Err(format!(
                    "Backend '{}' failed verification at ({}, {}). Expected {}, got {}, diff {}",
                    self.backend.name(),
                    idx / size,
                    idx % size,
                    expected,
                    got,
                    diff
                ));
            }
        }
        Ok(())
    }
}
