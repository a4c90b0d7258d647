//! # Square Matrices
//!
//! Row-major `N×N` matrices of `f32` plus the pseudo-random generator used to
//! build benchmark inputs.
//!
//! Values are drawn uniformly from `[0, 1)`. Passing a seed makes the output
//! reproducible; tests must always pass one.

use crate::error::{BenchError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A square, row-major matrix of single-precision floats.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    size: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Build a matrix from row-major data. `data.len()` must equal `size²`.
    pub fn from_vec(size: usize, data: Vec<f32>) -> Result<Self> {
        if size == 0 {
            return Err(BenchError::InvalidSize(size));
        }
        if data.len() != size * size {
            return Err(BenchError::DimensionMismatch {
                expected: size * size,
                actual: data.len(),
            });
        }
        Ok(Self { size, data })
    }

    /// Build a matrix from nested rows, rejecting anything that isn't square.
    ///
    /// ```
    /// use matmul_crossover::matrix::Matrix;
    ///
    /// let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    /// assert_eq!(m.get(1, 0), 3.0);
    /// ```
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(BenchError::InvalidSize(0));
        }
        let mut data = Vec::with_capacity(size * size);
        for row in rows {
            if row.len() != size {
                return Err(BenchError::DimensionMismatch {
                    expected: size,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self { size, data })
    }

    pub(crate) fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    /// Dimension `N` of this `N×N` matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total element count, always `size²`.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.size + col]
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.size..(row + 1) * self.size]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Copy of this matrix with rows and columns swapped.
    pub fn transposed(&self) -> Self {
        let n = self.size;
        let mut out = Self::zeros(n);
        for i in 0..n {
            for j in 0..n {
                out.data[j * n + i] = self.data[i * n + j];
            }
        }
        out
    }

    /// Largest absolute element-wise difference between two equal-sized matrices.
    pub fn max_abs_diff(&self, other: &Matrix) -> Result<f32> {
        ensure_same_size(self, other)?;
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f32::max))
    }
}

/// Fail with `DimensionMismatch` unless both operands have the same dimension.
pub fn ensure_same_size(a: &Matrix, b: &Matrix) -> Result<()> {
    if a.size() != b.size() {
        return Err(BenchError::DimensionMismatch {
            expected: a.size(),
            actual: b.size(),
        });
    }
    Ok(())
}

/// Stateful generator; successive calls draw fresh matrices from one stream.
pub struct MatrixGenerator {
    rng: StdRng,
}

impl MatrixGenerator {
    /// Reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Non-reproducible generator seeded from the thread-local RNG.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Next `size×size` matrix with values uniform in `[0, 1)`.
    pub fn next_matrix(&mut self, size: usize) -> Result<Matrix> {
        fill_random(&mut self.rng, size)
    }
}

/// Generate one matrix of uniform `[0, 1)` values.
pub fn generate(size: usize, seed: Option<u64>) -> Result<Matrix> {
    match seed {
        Some(seed) => fill_random(&mut StdRng::seed_from_u64(seed), size),
        None => fill_random(&mut rand::rng(), size),
    }
}

fn fill_random<R: Rng + ?Sized>(rng: &mut R, size: usize) -> Result<Matrix> {
    if size == 0 {
        return Err(BenchError::InvalidSize(size));
    }
    let data = (0..size * size).map(|_| rng.random::<f32>()).collect();
    Ok(Matrix { size, data })
}
