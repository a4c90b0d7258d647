use super::*;
use crate::codec::AcceleratorBuffer;
use crate::error::BenchError;
use crate::matrix::generate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn strategy(backend: impl ParallelComputeBackend + 'static) -> AcceleratedStrategy {
    AcceleratedStrategy::new(Box::new(backend), BufferCodec::default())
}

/// Backend double that can fail at a chosen step and counts `release` calls.
struct ScriptedBackend {
    fail_init: bool,
    fail_dispatch: bool,
    inner: ScalarBackend,
    releases: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    fn new(fail_init: bool, fail_dispatch: bool) -> (Self, Arc<AtomicUsize>) {
        let releases = Arc::new(AtomicUsize::new(0));
        let backend = Self {
            fail_init,
            fail_dispatch,
            inner: ScalarBackend::new(),
            releases: Arc::clone(&releases),
        };
        (backend, releases)
    }
}

impl ParallelComputeBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn initialize(&mut self) -> Result<()> {
        if self.fail_init {
            return Err(BenchError::unavailable("scripted", "no device"));
        }
        self.inner.initialize()
    }

    fn bind_buffers(
        &mut self,
        a: AcceleratorBuffer,
        b: AcceleratorBuffer,
        size: usize,
    ) -> Result<()> {
        self.inner.bind_buffers(a, b, size)
    }

    fn dispatch(&mut self, size_x: usize, size_y: usize) -> Result<()> {
        if self.fail_dispatch {
            return Err(BenchError::RunFailure("device lost".into()));
        }
        self.inner.dispatch(size_x, size_y)
    }

    fn read_output(&mut self) -> Result<AcceleratorBuffer> {
        self.inner.read_output()
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.inner.release();
    }
}

#[test]
fn test_known_product_on_every_backend() {
    let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    let b = Matrix::from_rows(vec![vec![5.0, 6.0], vec![7.0, 8.0]]).unwrap();
    let expected = Matrix::from_rows(vec![vec![19.0, 22.0], vec![43.0, 50.0]]).unwrap();

    for mut s in [strategy(RayonBackend::new(2)), strategy(ScalarBackend::new())] {
        let (product, timings) = s.multiply(&a, &b).unwrap();
        assert_eq!(product, expected, "backend {}", s.backend_name());
        assert_eq!(
            timings.total(),
            timings.transfer_in + timings.configure + timings.compute + timings.transfer_out
        );
    }
}

#[test]
fn test_backends_verify_against_general_path() {
    assert_eq!(strategy(RayonBackend::default()).verify(), Ok(()));
    assert_eq!(strategy(ScalarBackend::new()).verify(), Ok(()));
}

#[test]
fn test_parallel_and_serial_dispatch_agree() {
    let a = generate(40, Some(5)).unwrap();
    let b = generate(40, Some(6)).unwrap();
    let (parallel, _) = strategy(RayonBackend::new(4)).multiply(&a, &b).unwrap();
    let (serial, _) = strategy(ScalarBackend::new()).multiply(&a, &b).unwrap();
    assert_eq!(parallel, serial);
}

#[test]
fn test_result_within_half_precision_tolerance() {
    let a = generate(50, Some(21)).unwrap();
    let b = generate(50, Some(22)).unwrap();
    let reference = crate::general::code::multiply_original(&a, &b);
    let (product, _) = strategy(RayonBackend::default()).multiply(&a, &b).unwrap();
    for (got, expected) in product.as_slice().iter().zip(reference.as_slice()) {
        assert!((got - expected).abs() <= accelerated_tolerance(*expected));
    }
}

#[test]
fn test_rayon_thread_count() {
    let mut backend = RayonBackend::new(2);
    assert_eq!(backend.current_num_threads(), None);
    backend.initialize().unwrap();
    backend.initialize().unwrap();
    assert_eq!(backend.current_num_threads(), Some(2));
}

#[test]
fn test_unavailable_backend_is_reported() {
    let (backend, releases) = ScriptedBackend::new(true, false);
    let a = generate(4, Some(1)).unwrap();
    let err = strategy(backend).multiply(&a, &a).unwrap_err();
    assert!(matches!(err, BenchError::AcceleratorUnavailable { .. }));
    assert_eq!(releases.load(Ordering::SeqCst), 0);
}

#[test]
fn test_buffers_released_on_success_and_failure() {
    let a = generate(6, Some(1)).unwrap();

    let (backend, releases) = ScriptedBackend::new(false, false);
    let mut ok = strategy(backend);
    ok.multiply(&a, &a).unwrap();
    assert_eq!(releases.load(Ordering::SeqCst), 1);

    let (backend, releases) = ScriptedBackend::new(false, true);
    let err = strategy(backend).multiply(&a, &a).unwrap_err();
    assert_eq!(err, BenchError::RunFailure("device lost".into()));
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_encode_error_propagates() {
    let mut s = AcceleratedStrategy::new(Box::new(ScalarBackend::new()), BufferCodec::new(8));
    let a = generate(9, Some(1)).unwrap();
    assert!(matches!(s.multiply(&a, &a), Err(BenchError::Encode(_))));
}

#[test]
fn test_dimension_mismatch() {
    let a = generate(3, Some(1)).unwrap();
    let b = generate(5, Some(2)).unwrap();
    let err = strategy(ScalarBackend::new()).multiply(&a, &b).unwrap_err();
    assert_eq!(err, BenchError::DimensionMismatch { expected: 3, actual: 5 });
}

#[test]
fn test_protocol_misuse_is_an_error() {
    let mut backend = ScalarBackend::new();
    assert!(backend.dispatch(2, 2).is_err());
    assert!(backend.read_output().is_err());

    let codec = BufferCodec::default();
    let m = generate(2, Some(1)).unwrap();
    backend
        .bind_buffers(codec.encode(&m).unwrap(), codec.encode(&m).unwrap(), 2)
        .unwrap();
    assert!(matches!(
        backend.dispatch(3, 2),
        Err(BenchError::DimensionMismatch { .. })
    ));
    backend.dispatch(2, 2).unwrap();
    backend.read_output().unwrap();
    assert!(backend.read_output().is_err());
    backend.release();
    backend.release();
}
