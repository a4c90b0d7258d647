//! # Buffer Codec
//!
//! Converts square `f32` matrices to and from the accelerator's native buffer:
//! a grid of RGBA texels with half-precision channels. Element `(row, col)` is
//! stored in the red channel of texel `(x = col, y = row)`; green and blue are
//! written as `0`, alpha as `1`, and none of them are ever read back.
//!
//! ## Precision contract
//!
//! The boundary is lossy. Each value is rounded to the nearest `f16`, so
//! `decode(encode(m))` differs from `m` by at most one half-precision unit in
//! the last place per element (see [`half_ulp`]). Anyone porting the
//! accelerated path to another backend must preserve this bound, not bit
//! equality.


use crate::error::{BenchError, Result};
use crate::matrix::Matrix;
use half::f16;

/// Largest matrix dimension the default codec accepts.
pub const DEFAULT_MAX_DIMENSION: usize = 16384;

/// Channel holding the matrix value.
pub const VALUE_CHANNEL: usize = 0;

/// Fixed contents of a texel before its value channel is written.
const SENTINEL_TEXEL: [f16; 4] = [f16::ZERO, f16::ZERO, f16::ZERO, f16::ONE];

/// Opaque half-precision texel grid in the accelerator's layout.
#[derive(Clone, Debug, PartialEq)]
pub struct AcceleratorBuffer {
    width: usize,
    height: usize,
    texels: Vec<[f16; 4]>,
}

impl AcceleratorBuffer {
    /// Output target for the compute program: every texel holds the sentinel.
    pub(crate) fn blank(size: usize) -> Self {
        Self {
            width: size,
            height: size,
            texels: vec![SENTINEL_TEXEL; size * size],
        }
    }

    /// `(width, height)` in texels.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Raw texel at `(x, y)`.
    pub fn texel(&self, x: usize, y: usize) -> [f16; 4] {
        self.texels[y * self.width + x]
    }

    /// Value channel at `(row, col)` widened to `f32`.
    #[inline]
    pub(crate) fn value(&self, row: usize, col: usize) -> f32 {
        self.texels[row * self.width + col][VALUE_CHANNEL].to_f32()
    }

    /// Texels in row-major order, for backends that fill them in parallel.
    pub(crate) fn texels_mut(&mut self) -> &mut [[f16; 4]] {
        &mut self.texels
    }
}

/// Write `value` into a texel, restoring the sentinel channels.
#[inline]
pub(crate) fn store_value(texel: &mut [f16; 4], value: f32) {
    *texel = SENTINEL_TEXEL;
    texel[VALUE_CHANNEL] = f16::from_f32(value);
}

/// Encoder/decoder bounded by the accelerator's maximum dimension.
#[derive(Clone, Copy, Debug)]
pub struct BufferCodec {
    max_dimension: usize,
}

impl Default for BufferCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIMENSION)
    }
}

impl BufferCodec {
    pub fn new(max_dimension: usize) -> Self {
        Self { max_dimension }
    }

    pub fn max_dimension(&self) -> usize {
        self.max_dimension
    }

    fn check_dimension(&self, size: usize) -> Result<()> {
        if size > self.max_dimension {
            return Err(BenchError::encode(format!(
                "matrix size {} exceeds accelerator maximum {}",
                size, self.max_dimension
            )));
        }
        Ok(())
    }

    /// Encode `matrix` into a fresh accelerator buffer.
    pub fn encode(&self, matrix: &Matrix) -> Result<AcceleratorBuffer> {
        let size = matrix.size();
        self.check_dimension(size)?;

        let max = f16::MAX.to_f32();
        let mut buffer = AcceleratorBuffer::blank(size);
        for (idx, (texel, &value)) in buffer
            .texels
            .iter_mut()
            .zip(matrix.as_slice())
            .enumerate()
        {
            if !value.is_finite() || value.abs() > max {
                return Err(BenchError::encode(format!(
                    "value {} at ({}, {}) is outside the half-precision range",
                    value,
                    idx / size,
                    idx % size
                )));
            }
            store_value(texel, value);
        }
        Ok(buffer)
    }

    /// Read the value channel of `buffer` back into an `f32` matrix.
    pub fn decode(&self, buffer: &AcceleratorBuffer, size: usize) -> Result<Matrix> {
        if size == 0 {
            return Err(BenchError::InvalidSize(size));
        }
        self.check_dimension(size)?;
        if buffer.dimensions() != (size, size) {
            return Err(BenchError::encode(format!(
                "buffer is {}x{}, expected {}x{}",
                buffer.width, buffer.height, size, size
            )));
        }
        let data = buffer
            .texels
            .iter()
            .map(|texel| texel[VALUE_CHANNEL].to_f32())
            .collect();
        Matrix::from_vec(size, data)
    }
}

/// Spacing between the half-precision value nearest to `value` and the next
/// representable magnitude above it. This is the per-element error bound of a
/// codec round trip.
pub fn half_ulp(value: f32) -> f32 {
    let rounded = f16::from_f32(value.abs());
    if rounded.is_infinite() || rounded.is_nan() {
        return f32::INFINITY;
    }
    let next = f16::from_bits(rounded.to_bits() + 1);
    next.to_f32() - rounded.to_f32()
}
