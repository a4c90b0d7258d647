//! Per-phase timing of one accelerated dispatch.

use crate::error::{BenchError, Result};
use crate::utils::as_millis_f64;
use std::fmt;
use std::time::Duration;

/// The four timed steps of an accelerated multiply, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    TransferIn,
    Configure,
    Compute,
    TransferOut,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::TransferIn,
        Phase::Configure,
        Phase::Compute,
        Phase::TransferOut,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::TransferIn => "transfer-in",
            Phase::Configure => "configure",
            Phase::Compute => "compute",
            Phase::TransferOut => "transfer-out",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Wall-clock duration of each phase. `total()` is the end-to-end
/// accelerated cost and the figure compared against the general path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    pub transfer_in: Duration,
    pub configure: Duration,
    pub compute: Duration,
    pub transfer_out: Duration,
}

impl PhaseTimings {
    pub fn new(
        transfer_in: Duration,
        configure: Duration,
        compute: Duration,
        transfer_out: Duration,
    ) -> Self {
        Self {
            transfer_in,
            configure,
            compute,
            transfer_out,
        }
    }

    pub fn get(&self, phase: Phase) -> Duration {
        match phase {
            Phase::TransferIn => self.transfer_in,
            Phase::Configure => self.configure,
            Phase::Compute => self.compute,
            Phase::TransferOut => self.transfer_out,
        }
    }

    pub fn total(&self) -> Duration {
        self.transfer_in + self.configure + self.compute + self.transfer_out
    }

    /// Transfer-in plus transfer-out.
    pub fn transfer(&self) -> Duration {
        self.transfer_in + self.transfer_out
    }

    pub fn total_ms(&self) -> f64 {
        as_millis_f64(self.total())
    }

    pub fn compute_ms(&self) -> f64 {
        as_millis_f64(self.compute)
    }
}

/// Collects phase durations, enforcing that each phase is recorded exactly once.
#[derive(Debug, Default)]
pub struct PhaseRecorder {
    slots: [Option<Duration>; 4],
}

impl PhaseRecorder {
    pub fn record(&mut self, phase: Phase, elapsed: Duration) -> Result<()> {
        let slot = &mut self.slots[phase.index()];
        if slot.is_some() {
            return Err(BenchError::RunFailure(format!(
                "phase {} recorded twice",
                phase
            )));
        }
        *slot = Some(elapsed);
        Ok(())
    }

    /// Complete timings, or `RunFailure` naming the first missing phase.
    pub fn finish(self) -> Result<PhaseTimings> {
        let mut durations = [Duration::ZERO; 4];
        for phase in Phase::ALL {
            durations[phase.index()] = self.slots[phase.index()].ok_or_else(|| {
                BenchError::RunFailure(format!("phase {} was never recorded", phase))
            })?;
        }
        let [transfer_in, configure, compute, transfer_out] = durations;
        Ok(PhaseTimings::new(transfer_in, configure, compute, transfer_out))
    }
}
