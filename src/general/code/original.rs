//! Reference triple loop.

use crate::matrix::Matrix;

/// `C = A × B` with the textbook `i, j, k` loop nest.
///
/// The inner loop walks `B` down a column, one stride of `n` floats per step.
/// Callers guarantee both operands share a dimension.
pub fn multiply_original(a: &Matrix, b: &Matrix) -> Matrix {
    let n = a.size();
    let (a, b_data) = (a.as_slice(), b.as_slice());
    let mut out = Matrix::zeros(n);
    let c = out.as_mut_slice();

    for i in 0..n {
        for j in 0..n {
            let mut sum = 0.0f32;
            for k in 0..n {
                sum += a[i * n + k] * b_data[k * n + j];
            }
            c[i * n + j] = sum;
        }
    }
    out
}
