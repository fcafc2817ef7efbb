#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use serde::Serialize;

use crate::domain::StressError;
use crate::lib_cpu::CpuStressController;
use crate::lib_mem::{MemoryHold, MemoryStressController};
use crate::metrics::Metrics;

/// Aggregate view over both stressors. Field names match the wire format of
/// the status endpoint.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct StatusSnapshot {
    pub cpu_burn_active: bool,
    pub memory_alloc_active: bool,
    pub allocated_mb: usize,
}

/// Owns one instance of each stress controller. The two stressors are fully
/// independent; only status reads and stop-all span both.
#[derive(Clone)]
pub struct ChaosCoordinator {
    cpu: CpuStressController,
    memory: MemoryStressController,
    metrics: Metrics,
}

impl ChaosCoordinator {
    pub fn new(metrics: Metrics) -> Self {
        Self {
            cpu: CpuStressController::new(metrics.clone()),
            memory: MemoryStressController::new(metrics.clone()),
            metrics,
        }
    }

    pub fn start_cpu(&self, requested_seconds: i64) -> Result<u64, StressError> {
        self.cpu.start(requested_seconds)
    }

    pub fn start_memory(
        &self,
        requested_mb: i64,
        requested_hold_seconds: i64,
    ) -> Result<MemoryHold, StressError> {
        self.memory.start(requested_mb, requested_hold_seconds)
    }

    /// Composed from non-blocking flag reads and one short lock on the block
    /// set. Always succeeds.
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            cpu_burn_active: self.cpu.is_active(),
            memory_alloc_active: self.memory.is_active(),
            allocated_mb: self.memory.allocated_blocks(),
        }
    }

    /// Cancels any CPU burn and synchronously releases any held memory.
    /// Idempotent; calling with nothing active is a no-op.
    pub fn stop_all(&self) {
        self.metrics.stop_all_total.inc();
        self.cpu.stop();
        self.memory.stop();
    }
}
