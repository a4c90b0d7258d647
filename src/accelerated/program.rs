//! The fixed compute program every backend runs.
//!
//! One invocation per output cell `(row, col)`; each reads a row of `A` and a
//! column of `B` from their value channels and accumulates in `f32`. Cells
//! share nothing, so backends may evaluate them in any order or all at once.

use crate::codec::{store_value, AcceleratorBuffer};
use crate::error::{BenchError, Result};

/// Bound inputs of the matrix-multiply program.
#[derive(Debug)]
pub struct MatMulProgram {
    a: AcceleratorBuffer,
    b: AcceleratorBuffer,
    size: usize,
}

impl MatMulProgram {
    /// Bind two `size×size` buffers and the scalar dimension.
    pub fn new(a: AcceleratorBuffer, b: AcceleratorBuffer, size: usize) -> Result<Self> {
        for buffer in [&a, &b] {
            let (width, height) = buffer.dimensions();
            if width != size || height != size {
                return Err(BenchError::DimensionMismatch {
                    expected: size,
                    actual: width.max(height),
                });
            }
        }
        Ok(Self { a, b, size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The dispatch grid must cover exactly one invocation per output cell.
    pub fn check_grid(&self, size_x: usize, size_y: usize) -> Result<()> {
        if size_x != self.size || size_y != self.size {
            return Err(BenchError::DimensionMismatch {
                expected: self.size,
                actual: if size_x != self.size { size_x } else { size_y },
            });
        }
        Ok(())
    }

    /// Output value for cell `(row, col)`.
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> f32 {
        let mut sum = 0.0f32;
        for k in 0..self.size {
            sum += self.a.value(row, k) * self.b.value(k, col);
        }
        sum
    }

    /// Evaluate grid index `idx` (row-major over `size_x` columns) into `texel`.
    #[inline]
    pub fn invoke(&self, idx: usize, size_x: usize, texel: &mut [half::f16; 4]) {
        store_value(texel, self.cell(idx / size_x, idx % size_x));
    }
}

/// Program plus the output target it writes into, as held by a backend
/// between `bind_buffers` and `release`.
#[derive(Debug)]
pub struct Bindings {
    pub program: MatMulProgram,
    pub output: Option<AcceleratorBuffer>,
}

impl Bindings {
    pub fn new(a: AcceleratorBuffer, b: AcceleratorBuffer, size: usize) -> Result<Self> {
        Ok(Self {
            program: MatMulProgram::new(a, b, size)?,
            output: Some(AcceleratorBuffer::blank(size)),
        })
    }

    /// Split into the read-only program and the writable output target.
    pub fn targets(&mut self) -> Result<(&MatMulProgram, &mut AcceleratorBuffer)> {
        let output = self
            .output
            .as_mut()
            .ok_or_else(|| BenchError::RunFailure("output buffer already read back".into()))?;
        Ok((&self.program, output))
    }

    pub fn take_output(&mut self) -> Result<AcceleratorBuffer> {
        self.output
            .take()
            .ok_or_else(|| BenchError::RunFailure("output buffer already read back".into()))
    }
}
