//! Backend registry for looking up accelerated backends by name.
//!
//! The CLI and configuration refer to backends by string; the registry turns
//! that into a fresh boxed [`ParallelComputeBackend`].

use crate::accelerated::{ParallelComputeBackend, RayonBackend, ScalarBackend};

/// Builds a backend given a worker thread count (`0` = backend default).
pub type BackendFactory = fn(usize) -> Box<dyn ParallelComputeBackend>;

/// A registered backend.
pub struct BackendInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub create: BackendFactory,
}

pub struct BackendRegistry {
    backends: Vec<BackendInfo>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    pub fn register(&mut self, info: BackendInfo) {
        self.backends.push(info);
    }

    pub fn all(&self) -> &[BackendInfo] {
        &self.backends
    }

    pub fn find(&self, name: &str) -> Option<&BackendInfo> {
        self.backends.iter().find(|b| b.name == name)
    }

    pub fn list_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name).collect()
    }

    /// Instantiate the named backend, if registered.
    pub fn create(&self, name: &str, threads: usize) -> Option<Box<dyn ParallelComputeBackend>> {
        self.find(name).map(|info| (info.create)(threads))
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn create_rayon(threads: usize) -> Box<dyn ParallelComputeBackend> {
    Box::new(RayonBackend::new(threads))
}

fn create_scalar(_threads: usize) -> Box<dyn ParallelComputeBackend> {
    Box::new(ScalarBackend::new())
}

/// Registry with every built-in backend. The first entry is the default.
pub fn build_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();

    registry.register(BackendInfo {
        name: "rayon",
        description: "Work-stealing thread pool, one task per output cell",
        create: create_rayon,
    });
    registry.register(BackendInfo {
        name: "scalar",
        description: "Single thread, same program and codec (overhead baseline)",
        create: create_scalar,
    });

    registry
}
