//! General-path kernel variants.

mod original;
mod transposed;

pub use original::multiply_original;
pub use transposed::multiply_transposed;

use crate::matrix::Matrix;
use crate::utils::VariantInfo;

/// Kernel signature shared by all variants. Operands are pre-validated.
pub type KernelFn = fn(&Matrix, &Matrix) -> Matrix;

pub fn available_variants() -> Vec<VariantInfo<KernelFn>> {
    vec![
        VariantInfo {
            name: "original",
            description: "Textbook i-j-k loop, column-wise reads of B",
            function: multiply_original,
        },
        VariantInfo {
            name: "transposed",
            description: "Pre-transposed B, sequential reads of both operands",
            function: multiply_transposed,
        },
    ]
}
