#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::StressError;
use crate::metrics::Metrics;
use crate::safety;

/// Floating-point operations performed between cancellation checks. Keeps
/// the stop latency in the low milliseconds while the loop stays hot.
const OPS_PER_CHECK: u32 = 20_000;

#[derive(Default)]
struct CpuInner {
    active: AtomicBool,
    cancel: AtomicBool,
}

/// Single-slot CPU burn: `idle -> running -> idle`. The `active` flag is the
/// occupancy gate, `cancel` is the signal an in-flight worker polls; only the
/// worker itself ever returns `active` to false.
#[derive(Clone)]
pub struct CpuStressController {
    inner: Arc<CpuInner>,
    metrics: Metrics,
}

impl CpuStressController {
    pub fn new(metrics: Metrics) -> Self {
        Self {
            inner: Arc::new(CpuInner::default()),
            metrics,
        }
    }

    /// Clamps the requested duration and launches the burn worker. Returns
    /// the effective duration without waiting for the burn to finish.
    pub fn start(&self, requested_seconds: i64) -> Result<u64, StressError> {
        let duration_seconds = safety::clamp_cpu_duration(requested_seconds);
        // The compare-exchange is the sole admission gate: of two racing
        // starts exactly one flips idle -> running.
        if self
            .inner
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(StressError::Conflict("CPU burn"));
        }
        self.inner.cancel.store(false, Ordering::SeqCst);
        self.metrics.cpu_burn_active.set(1);
        self.metrics.cpu_burns_total.inc();
        let inner = Arc::clone(&self.inner);
        let metrics = self.metrics.clone();
        tokio::task::spawn_blocking(move || {
            burn(&inner.cancel, duration_seconds);
            metrics.cpu_burn_active.set(0);
            // Releasing the occupancy flag is the worker's last action, so a
            // successor burn cannot be admitted while this one is draining.
            inner.active.store(false, Ordering::SeqCst);
        });
        Ok(duration_seconds)
    }

    /// Signals the worker to wind down. Idempotent and non-blocking; a burn
    /// in progress ends within one poll interval.
    pub fn stop(&self) {
        self.inner.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }
}

/// Busies one core with floating-point work until the deadline passes or the
/// cancel flag is raised.
fn burn(cancel: &AtomicBool, duration_seconds: u64) {
    let deadline = Instant::now() + Duration::from_secs(duration_seconds);
    let mut acc = 0.0_f64;
    while Instant::now() < deadline && !cancel.load(Ordering::Relaxed) {
        for i in 0..OPS_PER_CHECK {
            let x = f64::from(i);
            acc += (x.sin() * x.cos()).abs().sqrt();
        }
        // Keeps the accumulator observable so the loop is not optimized away.
        std::hint::black_box(acc);
    }
}
