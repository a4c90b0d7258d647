//! # Matmul-Crossover
//!
//! Measures square `f32` matrix multiplication on two paths and finds the
//! size where the parallel accelerator path starts to beat the plain CPU
//! path once transfer costs are counted.
//!
//! - [`general`]: single-threaded kernel on a pinned core
//! - [`accelerated`]: half-precision encode, backend dispatch, decode, timed per phase
//! - [`orchestrator`]: non-blocking run lifecycle, observable state, history
//! - [`analysis`]: crossover and per-size summaries over a history

pub mod accelerated;
pub mod analysis;
pub mod codec;
pub mod config;
pub mod error;
pub mod general;
pub mod matrix;
pub mod orchestrator;
pub mod registry;
pub mod result;
pub mod tui;
pub mod utils;

pub use error::{BenchError, Result};

/// Re-export commonly used items
pub mod prelude {
    pub use crate::analysis::{crossover, ScalabilitySeries};
    pub use crate::config::BenchConfig;
    pub use crate::error::{BenchError, Result};
    pub use crate::matrix::Matrix;
    pub use crate::orchestrator::{BenchmarkOrchestrator, BenchmarkState};
    pub use crate::registry::build_registry;
    pub use crate::result::BenchmarkResult;
}
