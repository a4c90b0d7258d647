//! # Benchmark Orchestrator
//!
//! Owns the run lifecycle and the result history.
//!
//! A run request returns immediately. The run itself executes on the Tokio
//! blocking pool and its only visible effect is the sequence of
//! [`BenchmarkState`] values it publishes on a `watch` channel. New
//! subscribers see the latest state immediately, not the transitions they
//! missed.
//!
//! ## Concurrency
//!
//! A request made while the visible state is `Computing` is dropped, not
//! queued. From any other state it moves to `Computing` at once. After a reset
//! the worker of the discarded run may still be busy; the new run's worker
//! waits on the engine lock, so two runs never share the accelerator backend.
//!
//! History is appended by the worker only. Readers get copies.

mod engine;
mod state;
#[cfg(test)]
mod test;

pub use engine::{estimate_memory_mb, BenchmarkEngine};
pub use state::BenchmarkState;

use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::result::BenchmarkResult;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

struct Shared {
    state: watch::Sender<BenchmarkState>,
    backend: &'static str,
    /// Also serializes every state publication, so epoch checks and
    /// transitions never interleave.
    history: Mutex<Vec<BenchmarkResult>>,
    engine: Mutex<BenchmarkEngine>,
    /// Workers spawned and not yet finished, discarded runs included.
    workers: AtomicUsize,
    /// Bumped by reset/clear; a run whose epoch is stale publishes nothing.
    epoch: AtomicU64,
    seed: Option<u64>,
}

impl Shared {
    fn lock_history(&self) -> MutexGuard<'_, Vec<BenchmarkResult>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Worker body: run, then publish the outcome if nobody reset meanwhile.
    fn execute(&self, size: usize, epoch: u64) {
        let outcome = {
            let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
            panic::catch_unwind(AssertUnwindSafe(|| engine.run(size, self.seed)))
                .unwrap_or_else(|payload| Err(BenchError::RunFailure(panic_message(payload))))
        };

        let mut history = self.lock_history();
        self.workers.fetch_sub(1, Ordering::SeqCst);

        if self.epoch.load(Ordering::SeqCst) != epoch {
            warn!(size, "discarding outcome of a run that was reset mid-flight");
            return;
        }

        match outcome {
            Ok(result) => {
                info!(
                    size,
                    general_ms = result.general_time_ms(),
                    accelerated_ms = result.accelerated_total_ms(),
                    speedup = result.speedup(),
                    "benchmark completed"
                );
                history.push(result.clone());
                self.state.send_replace(BenchmarkState::Success {
                    result,
                    history: history.clone(),
                });
            }
            Err(err) => {
                warn!(size, error = %err, "benchmark failed");
                self.state.send_replace(BenchmarkState::Error {
                    message: err.to_string(),
                    matrix_size: size,
                });
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("worker panicked: {}", detail)
}

/// Explicitly owned benchmark controller. Create one per consumer; dropping
/// it drops the history with it.
pub struct BenchmarkOrchestrator {
    shared: Arc<Shared>,
    runtime: Handle,
}

impl BenchmarkOrchestrator {
    /// Runs are spawned on `runtime`'s blocking pool. `seed` fixes the input
    /// matrices of every run; `None` draws fresh ones each time.
    pub fn new(runtime: Handle, engine: BenchmarkEngine, seed: Option<u64>) -> Self {
        let (state, _) = watch::channel(BenchmarkState::Idle);
        Self {
            shared: Arc::new(Shared {
                state,
                backend: engine.backend_name(),
                history: Mutex::new(Vec::new()),
                engine: Mutex::new(engine),
                workers: AtomicUsize::new(0),
                epoch: AtomicU64::new(0),
                seed,
            }),
            runtime,
        }
    }

    pub fn from_config(runtime: Handle, config: &BenchConfig) -> Result<Self> {
        Ok(Self::new(runtime, config.build_engine()?, config.seed))
    }

    /// Read-only view of the state; the current value is available at once.
    pub fn subscribe(&self) -> watch::Receiver<BenchmarkState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> BenchmarkState {
        self.shared.state.borrow().clone()
    }

    /// Snapshot copy of the history, oldest first.
    pub fn history(&self) -> Vec<BenchmarkResult> {
        self.shared.lock_history().clone()
    }

    /// True while any worker is busy, including one whose run a reset hid.
    pub fn is_running(&self) -> bool {
        self.shared.workers.load(Ordering::SeqCst) > 0
    }

    /// Request a run at `size`. Returns immediately; a no-op while the state
    /// is `Computing`. Failures surface only as [`BenchmarkState::Error`].
    pub fn run_benchmark(&self, size: usize) {
        let epoch = {
            let _publish = self.shared.lock_history();
            if self.shared.state.borrow().is_computing() {
                debug!(size, "run request dropped: another run is in flight");
                return;
            }
            self.shared.workers.fetch_add(1, Ordering::SeqCst);
            self.shared
                .state
                .send_replace(BenchmarkState::Computing { matrix_size: size });
            self.shared.epoch.load(Ordering::SeqCst)
        };
        info!(size, backend = self.shared.backend, "benchmark started");

        let shared = Arc::clone(&self.shared);
        self.runtime
            .spawn_blocking(move || shared.execute(size, epoch));
    }

    /// Force `Idle`. An in-flight run finishes but its outcome is dropped.
    pub fn reset_state(&self) {
        let _publish = self.shared.lock_history();
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        self.shared.state.send_replace(BenchmarkState::Idle);
    }

    /// Empty the history and force `Idle`.
    pub fn clear_history(&self) {
        let mut history = self.shared.lock_history();
        history.clear();
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        self.shared.state.send_replace(BenchmarkState::Idle);
    }

    /// Request a run and wait until it leaves `Computing`.
    pub async fn run_to_completion(&self, size: usize) -> BenchmarkState {
        let mut rx = self.subscribe();
        self.run_benchmark(size);
        rx.wait_for(|s| !s.is_computing())
            .await
            .map(|state| state.clone())
            .unwrap_or_else(|_| self.state())
    }
}
