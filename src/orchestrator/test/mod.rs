use super::*;
use crate::accelerated::{AcceleratedStrategy, ParallelComputeBackend, ScalarBackend};
use crate::codec::{AcceleratorBuffer, BufferCodec};
use crate::general::{GeneralStrategy, TransposePolicy};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::time::Duration;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(30);

/// Scalar backend whose dispatch can be held open, made to panic, or made to
/// refuse initialization.
struct TestBackend {
    inner: ScalarBackend,
    gate: Option<(SyncSender<()>, Receiver<()>)>,
    panic_once: bool,
    unavailable: bool,
}

impl TestBackend {
    fn plain() -> Self {
        Self {
            inner: ScalarBackend::new(),
            gate: None,
            panic_once: false,
            unavailable: false,
        }
    }

    /// Returns the backend, a receiver signalled when dispatch starts, and a
    /// sender that lets one dispatch proceed per message.
    fn gated() -> (Self, Receiver<()>, Sender<()>) {
        let (started_tx, started_rx) = mpsc::sync_channel(8);
        let (release_tx, release_rx) = mpsc::channel();
        let backend = Self {
            gate: Some((started_tx, release_rx)),
            ..Self::plain()
        };
        (backend, started_rx, release_tx)
    }
}

impl ParallelComputeBackend for TestBackend {
    fn name(&self) -> &'static str {
        "test"
    }

    fn initialize(&mut self) -> crate::error::Result<()> {
        if self.unavailable {
            return Err(BenchError::unavailable("test", "no device present"));
        }
        self.inner.initialize()
    }

    fn bind_buffers(
        &mut self,
        a: AcceleratorBuffer,
        b: AcceleratorBuffer,
        size: usize,
    ) -> crate::error::Result<()> {
        self.inner.bind_buffers(a, b, size)
    }

    fn dispatch(&mut self, size_x: usize, size_y: usize) -> crate::error::Result<()> {
        if self.panic_once {
            self.panic_once = false;
            panic!("kernel exploded");
        }
        if let Some((started, release)) = &self.gate {
            let _ = started.send(());
            let _ = release.recv();
        }
        self.inner.dispatch(size_x, size_y)
    }

    fn read_output(&mut self) -> crate::error::Result<AcceleratorBuffer> {
        self.inner.read_output()
    }

    fn release(&mut self) {
        self.inner.release();
    }
}

fn orchestrator(backend: TestBackend) -> BenchmarkOrchestrator {
    let engine = BenchmarkEngine::new(
        GeneralStrategy::new(TransposePolicy::Always, false),
        AcceleratedStrategy::new(Box::new(backend), BufferCodec::default()),
    );
    BenchmarkOrchestrator::new(Handle::current(), engine, Some(7))
}

async fn settle(orch: &BenchmarkOrchestrator) -> BenchmarkState {
    let mut rx = orch.subscribe();
    timeout(WAIT, rx.wait_for(|s| !s.is_computing()))
        .await
        .expect("run did not finish")
        .map(|state| state.clone())
        .expect("state channel closed")
}

async fn wait_idle_worker(orch: &BenchmarkOrchestrator) {
    timeout(WAIT, async {
        while orch.is_running() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("worker did not finish");
}

fn wait_started(started: &Receiver<()>) {
    started
        .recv_timeout(WAIT)
        .expect("dispatch never started");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_starts_idle_and_completes() {
    let orch = orchestrator(TestBackend::plain());
    assert!(orch.state().is_idle());
    assert!(orch.history().is_empty());

    let state = orch.run_to_completion(8).await;
    match state {
        BenchmarkState::Success { result, history } => {
            assert_eq!(result.matrix_size(), 8);
            assert_eq!(history, vec![result.clone()]);
            assert_eq!(
                result.transfer_overhead_ms(),
                result.accelerated_total_ms() - result.accelerated_compute_ms()
            );
        }
        other => panic!("expected Success, got {:?}", other),
    }
    assert_eq!(orch.history().len(), 1);
    assert!(!orch.is_running());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_request_during_run_is_ignored() {
    let (backend, started, release) = TestBackend::gated();
    let orch = orchestrator(backend);

    orch.run_benchmark(4);
    assert_eq!(orch.state(), BenchmarkState::Computing { matrix_size: 4 });
    wait_started(&started);

    orch.run_benchmark(16);
    assert_eq!(orch.state(), BenchmarkState::Computing { matrix_size: 4 });
    assert!(orch.history().is_empty());

    release.send(()).unwrap();
    let state = settle(&orch).await;
    assert_eq!(state.matrix_size(), Some(4));
    assert!(matches!(state, BenchmarkState::Success { .. }));
    wait_idle_worker(&orch).await;
    assert_eq!(orch.history().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_history_keeps_completion_order() {
    let orch = orchestrator(TestBackend::plain());
    for size in [6, 2, 9, 2] {
        let state = orch.run_to_completion(size).await;
        assert!(matches!(state, BenchmarkState::Success { .. }));
        wait_idle_worker(&orch).await;
    }

    let sizes: Vec<usize> = orch.history().iter().map(|r| r.matrix_size()).collect();
    assert_eq!(sizes, vec![6, 2, 9, 2]);

    match orch.state() {
        BenchmarkState::Success { history, .. } => assert_eq!(history, orch.history()),
        other => panic!("expected Success, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_zero_size_reports_error() {
    let orch = orchestrator(TestBackend::plain());
    let state = orch.run_to_completion(0).await;
    match state {
        BenchmarkState::Error {
            message,
            matrix_size,
        } => {
            assert_eq!(matrix_size, 0);
            assert!(message.contains("invalid matrix size"));
        }
        other => panic!("expected Error, got {:?}", other),
    }
    assert!(orch.history().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unavailable_backend_reports_error() {
    let orch = orchestrator(TestBackend {
        unavailable: true,
        ..TestBackend::plain()
    });
    orch.run_to_completion(3).await;
    wait_idle_worker(&orch).await;
    orch.run_to_completion(5).await;

    match orch.state() {
        BenchmarkState::Error {
            message,
            matrix_size,
        } => {
            assert_eq!(matrix_size, 5);
            assert!(message.contains("accelerator unavailable"));
        }
        other => panic!("expected Error, got {:?}", other),
    }
    assert!(orch.history().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_panic_becomes_error_and_next_run_works() {
    let orch = orchestrator(TestBackend {
        panic_once: true,
        ..TestBackend::plain()
    });

    match orch.run_to_completion(4).await {
        BenchmarkState::Error { message, .. } => {
            assert!(message.contains("kernel exploded"), "{}", message);
        }
        other => panic!("expected Error, got {:?}", other),
    }
    wait_idle_worker(&orch).await;

    let state = orch.run_to_completion(4).await;
    assert!(matches!(state, BenchmarkState::Success { .. }));
    assert_eq!(orch.history().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_finished_states_go_back_to_computing() {
    let (backend, started, release) = TestBackend::gated();
    let orch = orchestrator(backend);

    // Error -> Computing
    orch.run_to_completion(0).await;
    wait_idle_worker(&orch).await;
    assert!(matches!(orch.state(), BenchmarkState::Error { .. }));
    orch.run_benchmark(3);
    assert_eq!(orch.state(), BenchmarkState::Computing { matrix_size: 3 });
    wait_started(&started);
    release.send(()).unwrap();
    assert!(matches!(settle(&orch).await, BenchmarkState::Success { .. }));
    wait_idle_worker(&orch).await;

    // Success -> Computing
    orch.run_benchmark(5);
    assert_eq!(orch.state(), BenchmarkState::Computing { matrix_size: 5 });
    wait_started(&started);
    release.send(()).unwrap();
    assert!(matches!(settle(&orch).await, BenchmarkState::Success { .. }));
    wait_idle_worker(&orch).await;
    assert_eq!(orch.history().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reset_during_run_discards_outcome() {
    let (backend, started, release) = TestBackend::gated();
    let orch = orchestrator(backend);

    orch.run_benchmark(4);
    wait_started(&started);
    orch.reset_state();
    assert!(orch.state().is_idle());
    assert!(orch.is_running());

    release.send(()).unwrap();
    wait_idle_worker(&orch).await;
    assert!(orch.state().is_idle());
    assert!(orch.history().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_after_reset_starts_while_old_worker_is_busy() {
    let (backend, started, release) = TestBackend::gated();
    let orch = orchestrator(backend);

    orch.run_benchmark(4);
    wait_started(&started);
    orch.reset_state();

    orch.run_benchmark(8);
    assert_eq!(orch.state(), BenchmarkState::Computing { matrix_size: 8 });

    // visible Computing still drops requests
    orch.run_benchmark(16);
    assert_eq!(orch.state(), BenchmarkState::Computing { matrix_size: 8 });

    // discarded run 4 finishes first; run 8 waits for the engine
    release.send(()).unwrap();
    wait_started(&started);
    assert_eq!(orch.state(), BenchmarkState::Computing { matrix_size: 8 });
    release.send(()).unwrap();

    let state = settle(&orch).await;
    assert_eq!(state.matrix_size(), Some(8));
    assert!(matches!(state, BenchmarkState::Success { .. }));
    wait_idle_worker(&orch).await;

    let sizes: Vec<usize> = orch.history().iter().map(|r| r.matrix_size()).collect();
    assert_eq!(sizes, vec![8]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_clear_history_from_success() {
    let orch = orchestrator(TestBackend::plain());
    orch.run_to_completion(3).await;
    orch.run_to_completion(4).await;
    assert_eq!(orch.history().len(), 2);

    orch.clear_history();
    assert!(orch.state().is_idle());
    assert!(orch.history().is_empty());

    orch.reset_state();
    assert!(orch.state().is_idle());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_clear_history_from_error() {
    let orch = orchestrator(TestBackend::plain());
    orch.run_to_completion(3).await;
    assert!(matches!(orch.run_to_completion(0).await, BenchmarkState::Error { .. }));
    assert_eq!(orch.history().len(), 1);

    orch.clear_history();
    assert!(orch.state().is_idle());
    assert!(orch.history().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_clear_history_from_computing() {
    let (backend, started, release) = TestBackend::gated();
    let orch = orchestrator(backend);

    orch.run_benchmark(3);
    wait_started(&started);
    release.send(()).unwrap();
    settle(&orch).await;
    assert_eq!(orch.history().len(), 1);

    orch.run_benchmark(5);
    wait_started(&started);
    assert!(orch.state().is_computing());

    orch.clear_history();
    assert!(orch.state().is_idle());
    assert!(orch.history().is_empty());

    release.send(()).unwrap();
    wait_idle_worker(&orch).await;
    assert!(orch.state().is_idle());
    assert!(orch.history().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_late_subscriber_sees_current_state() {
    let orch = orchestrator(TestBackend::plain());
    assert!(orch.subscribe().borrow().is_idle());

    orch.run_to_completion(3).await;
    let rx = orch.subscribe();
    let current = rx.borrow().clone();
    assert_eq!(current, orch.state());
    assert!(current.is_finished());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_from_config_runs_registered_backend() {
    let config = BenchConfig {
        backend: "scalar".into(),
        seed: Some(3),
        pin_general: false,
        ..BenchConfig::default()
    };
    let orch = BenchmarkOrchestrator::from_config(Handle::current(), &config).unwrap();
    let first = orch.run_to_completion(5).await;
    wait_idle_worker(&orch).await;
    assert!(matches!(first, BenchmarkState::Success { .. }));
}
