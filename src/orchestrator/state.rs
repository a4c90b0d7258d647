//! Observable lifecycle of the orchestrator.

use crate::result::BenchmarkResult;

/// Exactly one of these is current at any time.
///
/// `Idle → Computing → Success | Error`; `Success` and `Error` go back to
/// `Idle` on reset, or straight to `Computing` on the next run request.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum BenchmarkState {
    #[default]
    Idle,
    Computing {
        matrix_size: usize,
    },
    Success {
        result: BenchmarkResult,
        /// Snapshot of the full history, including `result` as its last entry.
        history: Vec<BenchmarkResult>,
    },
    Error {
        message: String,
        matrix_size: usize,
    },
}

impl BenchmarkState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_computing(&self) -> bool {
        matches!(self, Self::Computing { .. })
    }

    /// `Success` or `Error`.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Error { .. })
    }

    /// Size of the run this state refers to, if any.
    pub fn matrix_size(&self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Computing { matrix_size } | Self::Error { matrix_size, .. } => Some(*matrix_size),
            Self::Success { result, .. } => Some(result.matrix_size()),
        }
    }
}
