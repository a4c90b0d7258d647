//! Cache-friendly variant: transpose `B` first so both inner-loop reads are
//! sequential.
//!
//! The accumulation still runs `k = 0..n` into a single `f32`, so the output
//! is bit-identical to [`super::multiply_original`].

use crate::matrix::Matrix;

pub fn multiply_transposed(a: &Matrix, b: &Matrix) -> Matrix {
    let n = a.size();
    let bt = b.transposed();
    let mut out = Matrix::zeros(n);
    let c = out.as_mut_slice();

    for (i, c_row) in c.chunks_exact_mut(n).enumerate() {
        let a_row = a.row(i);
        for (j, cell) in c_row.iter_mut().enumerate() {
            let bt_row = bt.row(j);
            let mut sum = 0.0f32;
            for k in 0..n {
                sum += a_row[k] * bt_row[k];
            }
            *cell = sum;
        }
    }
    out
}
