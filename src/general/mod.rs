//! # General-Purpose Path
//!
//! Dense product on ordinary CPU instructions:
//!
//! `C[i][j] = Σ_{k=0..N-1} A[i][k] * B[k][j]`
//!
//! accumulated in `f32` in that exact `k` order.
//!
//! ## Access order
//!
//! The textbook loop nest reads `B` column-wise, which misses the cache on
//! every step once rows stop fitting in L1. Pre-transposing `B` turns both
//! inner-loop reads into sequential scans. [`TransposePolicy`] decides when
//! to pay for the transpose; the result bits are the same either way.

pub mod code;

use crate::error::Result;
use crate::matrix::{ensure_same_size, Matrix};
use crate::utils::CpuPinGuard;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// When the general path pre-transposes its second operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransposePolicy {
    /// Always use the textbook loop.
    Never,
    /// Always transpose first.
    #[default]
    Always,
    /// Transpose only for sizes at or above the threshold.
    MinSize(usize),
}

impl TransposePolicy {
    pub fn applies_to(&self, size: usize) -> bool {
        match *self {
            Self::Never => false,
            Self::Always => true,
            Self::MinSize(min) => size >= min,
        }
    }
}

/// A transpose policy string that is neither a keyword nor a size.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown transpose policy '{0}': expected never, always or a minimum size")]
pub struct ParsePolicyError(String);

impl std::str::FromStr for TransposePolicy {
    type Err = ParsePolicyError;

    /// Accepts `never`, `always`, or a minimum size such as `256`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "never" => Ok(Self::Never),
            "always" => Ok(Self::Always),
            other => other
                .parse()
                .map(Self::MinSize)
                .map_err(|_| ParsePolicyError(other.to_string())),
        }
    }
}

/// General-purpose multiplication strategy.
#[derive(Clone, Debug)]
pub struct GeneralStrategy {
    policy: TransposePolicy,
    pin_thread: bool,
}

impl Default for GeneralStrategy {
    fn default() -> Self {
        Self::new(TransposePolicy::default(), true)
    }
}

impl GeneralStrategy {
    pub fn new(policy: TransposePolicy, pin_thread: bool) -> Self {
        Self { policy, pin_thread }
    }

    pub fn policy(&self) -> TransposePolicy {
        self.policy
    }

    /// Multiply `a × b`, returning the product and the wall-clock time of the
    /// multiply alone (transpose included, input generation excluded).
    pub fn multiply(&self, a: &Matrix, b: &Matrix) -> Result<(Matrix, Duration)> {
        ensure_same_size(a, b)?;

        let transpose = self.policy.applies_to(a.size());
        let kernel: code::KernelFn = if transpose {
            code::multiply_transposed
        } else {
            code::multiply_original
        };

        let _pin = if self.pin_thread {
            CpuPinGuard::new()
        } else {
            CpuPinGuard::unpinned()
        };
        let (elapsed, product) = crate::measure!(kernel(a, b));

        debug!(
            size = a.size(),
            transpose,
            elapsed_ms = crate::utils::as_millis_f64(elapsed),
            "general multiply finished"
        );
        Ok((product, elapsed))
    }

    /// Check every kernel variant against `original`, bit for bit.
    pub fn verify() -> std::result::Result<(), String> {
        // Odd size to catch indexing slips.
        let size = 37;
        let a = crate::matrix::generate(size, Some(0xA11CE)).map_err(|e| e.to_string())?;
        let b = crate::matrix::generate(size, Some(0xB0B)).map_err(|e| e.to_string())?;

        let variants = code::available_variants();
        let original = variants
            .iter()
            .find(|v| v.name == "original")
            .ok_or("No 'original' variant found for reference")?;
        let expected = (original.function)(&a, &b);

        for variant in variants.iter().filter(|v| v.name != "original") {
            let result = (variant.function)(&a, &b);
            if result != expected {
                let diff = result.max_abs_diff(&expected).unwrap_or(f32::NAN);
                return Err(format!(
                    "Variant '{}' differs from original (max diff {})",
                    variant.name, diff
                ));
            }
        }
        Ok(())
    }
}
