//! Error taxonomy shared by every stage of a benchmark run.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors that can occur while preparing or executing a benchmark run.
///
/// None of these escape [`BenchmarkOrchestrator::run_benchmark`]; the
/// orchestrator turns them into [`BenchmarkState::Error`].
///
/// [`BenchmarkOrchestrator::run_benchmark`]: crate::orchestrator::BenchmarkOrchestrator::run_benchmark
/// [`BenchmarkState::Error`]: crate::orchestrator::BenchmarkState::Error
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BenchError {
    /// Matrix dimension must be at least 1.
    #[error("invalid matrix size {0}: size must be at least 1")]
    InvalidSize(usize),

    /// Operands are not equal-sized squares, or data does not fill N×N.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A matrix could not be converted to or from the accelerator format.
    #[error("encode error: {0}")]
    Encode(String),

    /// The parallel backend could not be initialized.
    #[error("accelerator unavailable ({backend}): {reason}")]
    AcceleratorUnavailable { backend: String, reason: String },

    /// Any other failure during a run, including a panicking worker.
    #[error("run failed: {0}")]
    RunFailure(String),
}

impl BenchError {
    pub(crate) fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub(crate) fn unavailable(backend: &str, reason: impl Into<String>) -> Self {
        Self::AcceleratorUnavailable {
            backend: backend.to_string(),
            reason: reason.into(),
        }
    }
}
