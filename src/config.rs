//! Benchmark configuration.
//!
//! Defaults suit an interactive run; the CLI overrides fields from its
//! arguments and [`BenchConfig::from_env`] picks up `MATBENCH_*` variables.

use crate::accelerated::AcceleratedStrategy;
use crate::codec::{BufferCodec, DEFAULT_MAX_DIMENSION};
use crate::error::{BenchError, Result};
use crate::general::{GeneralStrategy, TransposePolicy};
use crate::orchestrator::BenchmarkEngine;
use crate::registry::build_registry;
use tracing::warn;

pub const ENV_SEED: &str = "MATBENCH_SEED";
pub const ENV_BACKEND: &str = "MATBENCH_BACKEND";
pub const ENV_THREADS: &str = "MATBENCH_THREADS";

#[derive(Clone, Debug, PartialEq)]
pub struct BenchConfig {
    /// Seed for input matrices. `None` draws fresh inputs every run.
    pub seed: Option<u64>,
    /// When the general path pre-transposes `B`.
    pub transpose: TransposePolicy,
    /// Pin the general-path thread to its core while measuring.
    pub pin_general: bool,
    /// Registered backend name (see [`crate::registry::build_registry`]).
    pub backend: String,
    /// Backend worker threads, `0` for the backend's default.
    pub backend_threads: usize,
    /// Largest dimension the codec accepts.
    pub max_dimension: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            seed: None,
            transpose: TransposePolicy::default(),
            pin_general: true,
            backend: "rayon".to_string(),
            backend_threads: 0,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl BenchConfig {
    /// Defaults overlaid with `MATBENCH_SEED`, `MATBENCH_BACKEND` and `MATBENCH_THREADS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Overlay values from `lookup`. Unparseable values are logged and ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(ENV_SEED) {
            match raw.trim().parse() {
                Ok(seed) => self.seed = Some(seed),
                Err(_) => warn!(value = %raw, "ignoring invalid {}", ENV_SEED),
            }
        }
        if let Some(raw) = lookup(ENV_BACKEND) {
            let name = raw.trim();
            if name.is_empty() {
                warn!("ignoring empty {}", ENV_BACKEND);
            } else {
                self.backend = name.to_string();
            }
        }
        if let Some(raw) = lookup(ENV_THREADS) {
            match raw.trim().parse() {
                Ok(threads) => self.backend_threads = threads,
                Err(_) => warn!(value = %raw, "ignoring invalid {}", ENV_THREADS),
            }
        }
    }

    /// Instantiate both strategies. An unknown backend name is reported as
    /// `AcceleratorUnavailable`.
    pub fn build_engine(&self) -> Result<BenchmarkEngine> {
        let backend = build_registry()
            .create(&self.backend, self.backend_threads)
            .ok_or_else(|| BenchError::unavailable(&self.backend, "no such backend registered"))?;

        Ok(BenchmarkEngine::new(
            GeneralStrategy::new(self.transpose, self.pin_general),
            AcceleratedStrategy::new(backend, BufferCodec::new(self.max_dimension)),
        ))
    }
}
