#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use std::time::Duration;

use chaos_engine::domain::StressError;
use chaos_engine::lib_cpu::CpuStressController;
use chaos_engine::lib_mem::MemoryStressController;
use chaos_engine::metrics::Metrics;
use tokio::time::sleep;

async fn wait_until<F: Fn() -> bool>(cond: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        sleep(Duration::from_millis(20)).await;
    }
    cond()
}

#[tokio::test]
async fn cpu_start_clamps_and_rejects_second_start() {
    let cpu = CpuStressController::new(Metrics::new().expect("metrics"));
    let effective = cpu.start(999).expect("start");
    assert_eq!(effective, 30);
    assert!(cpu.is_active());
    assert_eq!(cpu.start(5).unwrap_err(), StressError::Conflict("CPU burn"));
    // The losing start must not have disturbed the running burn.
    assert!(cpu.is_active());
    cpu.stop();
    assert!(wait_until(|| !cpu.is_active(), Duration::from_secs(2)).await);
}

#[tokio::test]
async fn cpu_burn_expires_naturally() {
    let cpu = CpuStressController::new(Metrics::new().expect("metrics"));
    assert_eq!(cpu.start(1).expect("start"), 1);
    assert!(wait_until(|| !cpu.is_active(), Duration::from_secs(5)).await);
}

#[tokio::test]
async fn cpu_stop_when_idle_is_noop_and_does_not_poison() {
    let cpu = CpuStressController::new(Metrics::new().expect("metrics"));
    cpu.stop();
    assert!(!cpu.is_active());
    // A start after an idle stop must still run normally.
    assert_eq!(cpu.start(-7).expect("start"), 1);
    assert!(cpu.is_active());
    cpu.stop();
    assert!(wait_until(|| !cpu.is_active(), Duration::from_secs(2)).await);
}

#[tokio::test]
async fn memory_start_counts_blocks_and_rejects_second_start() {
    let mem = MemoryStressController::new(Metrics::new().expect("metrics"));
    let hold = mem.start(4, 30).expect("start");
    assert_eq!(hold.megabytes, 4);
    assert_eq!(hold.hold_seconds, 30);
    assert!(mem.is_active());
    assert_eq!(mem.allocated_blocks(), 4);
    assert_eq!(
        mem.start(8, 30).unwrap_err(),
        StressError::Conflict("Memory allocation")
    );
    // The existing block set is untouched by the rejected request.
    assert_eq!(mem.allocated_blocks(), 4);
    mem.stop();
    // Release is synchronous: no waiting needed.
    assert_eq!(mem.allocated_blocks(), 0);
    assert!(!mem.is_active());
}

#[tokio::test]
async fn memory_clamps_both_magnitudes() {
    let mem = MemoryStressController::new(Metrics::new().expect("metrics"));
    let hold = mem.start(-5, 0).expect("start");
    assert_eq!(hold.megabytes, 1);
    assert_eq!(hold.hold_seconds, 1);
    mem.stop();
    let hold = mem.start(4, 999).expect("start");
    assert_eq!(hold.hold_seconds, 60);
    mem.stop();
}

#[tokio::test]
async fn memory_auto_releases_after_hold() {
    let mem = MemoryStressController::new(Metrics::new().expect("metrics"));
    let hold = mem.start(2, 1).expect("start");
    assert_eq!(hold.hold_seconds, 1);
    assert_eq!(mem.allocated_blocks(), 2);
    assert!(
        wait_until(
            || !mem.is_active() && mem.allocated_blocks() == 0,
            Duration::from_secs(5)
        )
        .await
    );
}

#[tokio::test]
async fn memory_stop_is_idempotent_and_allows_restart() {
    let mem = MemoryStressController::new(Metrics::new().expect("metrics"));
    mem.stop();
    assert!(!mem.is_active());
    mem.start(3, 30).expect("start");
    mem.stop();
    mem.stop();
    assert_eq!(mem.allocated_blocks(), 0);
    let hold = mem.start(2, 30).expect("restart");
    assert_eq!(hold.megabytes, 2);
    assert_eq!(mem.allocated_blocks(), 2);
    mem.stop();
}

#[tokio::test]
async fn stale_release_timer_cannot_free_a_later_hold() {
    let mem = MemoryStressController::new(Metrics::new().expect("metrics"));
    mem.start(2, 1).expect("first hold");
    mem.stop();
    let hold = mem.start(3, 30).expect("second hold");
    assert_eq!(hold.megabytes, 3);
    // Ride out the first hold's expiry window; its timer was aborted by the
    // explicit stop, so the second hold must survive it.
    sleep(Duration::from_secs(2)).await;
    assert!(mem.is_active());
    assert_eq!(mem.allocated_blocks(), 3);
    mem.stop();
}
