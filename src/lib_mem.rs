#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use std::collections::TryReserveError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use crate::domain::StressError;
use crate::metrics::Metrics;
use crate::safety;

/// Effective magnitudes of a started hold, after clamping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryHold {
    pub megabytes: u64,
    pub hold_seconds: u64,
}

#[derive(Default)]
struct MemInner {
    active: AtomicBool,
    blocks: Mutex<Vec<Vec<u8>>>,
    release_timer: Mutex<Option<JoinHandle<()>>>,
}

/// Single-slot memory pressure: `idle -> holding -> idle`. The block set is
/// only ever mutated under its mutex, and every release route (hold expiry,
/// explicit stop, pre-allocation cleanup) runs the same flag-clearing path.
#[derive(Clone)]
pub struct MemoryStressController {
    inner: Arc<MemInner>,
    metrics: Metrics,
}

impl MemoryStressController {
    pub fn new(metrics: Metrics) -> Self {
        Self {
            inner: Arc::new(MemInner::default()),
            metrics,
        }
    }

    /// Clamps both magnitudes, allocates the block set synchronously, and
    /// schedules the auto-release. The allocation either fully succeeds or is
    /// fully rolled back; a partial set is never observable.
    pub fn start(
        &self,
        requested_mb: i64,
        requested_hold_seconds: i64,
    ) -> Result<MemoryHold, StressError> {
        let megabytes = safety::clamp_memory_megabytes(requested_mb);
        let hold_seconds = safety::clamp_memory_hold(requested_hold_seconds);
        {
            // Admission happens under the allocation lock, so a stop runs
            // either before this section or after it, never mid-allocation.
            let mut blocks = self.inner.blocks.lock();
            if self.inner.active.load(Ordering::SeqCst) {
                return Err(StressError::Conflict("Memory allocation"));
            }
            // Stale blocks cannot exist in idle state, but clearing here keeps
            // every entry into holding starting from an empty set.
            blocks.clear();
            for _ in 0..megabytes {
                match allocate_block() {
                    Ok(block) => blocks.push(block),
                    Err(_) => {
                        blocks.clear();
                        return Err(StressError::AllocationFailed);
                    }
                }
            }
            self.inner.active.store(true, Ordering::SeqCst);
            self.metrics.memory_hold_active.set(1);
            #[allow(clippy::cast_possible_wrap)]
            self.metrics.allocated_megabytes.set(megabytes as i64);
            self.metrics.memory_holds_total.inc();
        }
        let ctrl = self.clone();
        let handle = tokio::spawn(async move {
            sleep(Duration::from_secs(hold_seconds)).await;
            ctrl.release_blocks();
        });
        // A stale timer from an earlier hold must never be left armed, or it
        // would free this allocation early.
        if let Some(stale) = self.inner.release_timer.lock().replace(handle) {
            stale.abort();
        }
        Ok(MemoryHold {
            megabytes,
            hold_seconds,
        })
    }

    /// Releases everything synchronously: the blocks are freed and the state
    /// is idle before this returns. Safe to call at any time.
    pub fn stop(&self) {
        if let Some(timer) = self.inner.release_timer.lock().take() {
            timer.abort();
        }
        self.release_blocks();
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Count of held 1 MiB blocks, i.e. the coarse allocated-MiB signal.
    pub fn allocated_blocks(&self) -> usize {
        self.inner.blocks.lock().len()
    }

    fn release_blocks(&self) {
        let mut blocks = self.inner.blocks.lock();
        blocks.clear();
        self.inner.active.store(false, Ordering::SeqCst);
        self.metrics.memory_hold_active.set(0);
        self.metrics.allocated_megabytes.set(0);
    }
}

/// Builds one 1 MiB block without going through the infallible allocation
/// path, then fills it so the OS commits real pages rather than reservations.
fn allocate_block() -> Result<Vec<u8>, TryReserveError> {
    let mut block = Vec::new();
    block.try_reserve_exact(safety::BLOCK_BYTES)?;
    block.resize(safety::BLOCK_BYTES, safety::FILL_PATTERN);
    Ok(block)
}
