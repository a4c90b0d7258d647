//! Thread pinning for the general-purpose path.
//!
//! Pinning the measuring thread to the core it already runs on keeps the
//! scheduler from migrating it halfway through a multiply. Only Linux gets a
//! real implementation (via `libc`); elsewhere pinning reports failure and the
//! measurement simply runs unpinned.

#[cfg(target_os = "linux")]
mod platform {
    use std::mem;

    pub type Affinity = libc::cpu_set_t;

    pub fn current_cpu() -> Option<usize> {
        let cpu = unsafe { libc::sched_getcpu() };
        (cpu >= 0).then_some(cpu as usize)
    }

    pub fn online_cpus() -> usize {
        let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
        if n > 0 {
            n as usize
        } else {
            1
        }
    }

    pub fn save() -> Option<Affinity> {
        unsafe {
            let mut set: libc::cpu_set_t = mem::zeroed();
            (libc::sched_getaffinity(0, mem::size_of::<libc::cpu_set_t>(), &mut set) == 0)
                .then_some(set)
        }
    }

    pub fn pin(core: usize) -> bool {
        unsafe {
            let mut set: libc::cpu_set_t = mem::zeroed();
            libc::CPU_ZERO(&mut set);
            libc::CPU_SET(core, &mut set);
            libc::sched_setaffinity(0, mem::size_of::<libc::cpu_set_t>(), &set) == 0
        }
    }

    pub fn restore(saved: &Affinity) -> bool {
        unsafe { libc::sched_setaffinity(0, mem::size_of::<libc::cpu_set_t>(), saved) == 0 }
    }
}

#[cfg(not(target_os = "linux"))]
mod platform {
    pub type Affinity = ();

    pub fn current_cpu() -> Option<usize> {
        None
    }

    pub fn online_cpus() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    pub fn save() -> Option<Affinity> {
        None
    }

    pub fn pin(_core: usize) -> bool {
        false
    }

    pub fn restore(_saved: &Affinity) -> bool {
        true
    }
}

/// Number of online CPUs, at least 1.
pub fn online_cpus() -> usize {
    platform::online_cpus()
}

/// RAII guard: pins the calling thread on creation, restores its original
/// affinity mask on drop (including during unwinding).
pub struct CpuPinGuard {
    pinned_core: Option<usize>,
    saved: Option<platform::Affinity>,
}

impl CpuPinGuard {
    /// Pin to the core the thread is currently running on, falling back to core 0.
    pub fn new() -> Self {
        let saved = platform::save();
        if saved.is_none() {
            return Self::unpinned();
        }
        let core = platform::current_cpu().unwrap_or(0);
        if platform::pin(core) {
            tracing::trace!(core, "pinned measuring thread");
            Self {
                pinned_core: Some(core),
                saved,
            }
        } else {
            Self::unpinned()
        }
    }

    /// A guard that does nothing, used when pinning is disabled.
    pub fn unpinned() -> Self {
        Self {
            pinned_core: None,
            saved: None,
        }
    }

    pub fn core_id(&self) -> Option<usize> {
        self.pinned_core
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_core.is_some()
    }
}

impl Drop for CpuPinGuard {
    fn drop(&mut self) {
        if let (Some(_), Some(saved)) = (self.pinned_core, self.saved.as_ref()) {
            if !platform::restore(saved) {
                tracing::warn!("failed to restore thread affinity after measurement");
            }
        }
    }
}

impl Default for CpuPinGuard {
    fn default() -> Self {
        Self::new()
    }
}
