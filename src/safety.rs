#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

//! Safety limits for stress operations. Every requested magnitude passes
//! through one of the clamps below before it reaches a controller, so a
//! hostile or fat-fingered request can never take the host down.

pub const MAX_CPU_BURN_SECONDS: i64 = 30;
pub const MAX_MEMORY_MB: i64 = 256;
pub const MAX_MEMORY_HOLD_SECONDS: i64 = 60;

/// One allocation block. The block count doubles as the allocated-MiB signal.
pub const BLOCK_BYTES: usize = 1024 * 1024;

/// Byte written into every allocated block to force physical backing.
pub const FILL_PATTERN: u8 = 0x58;

/// Saturates a requested burn duration into `[1, MAX_CPU_BURN_SECONDS]`.
#[allow(clippy::cast_sign_loss)]
pub fn clamp_cpu_duration(requested_seconds: i64) -> u64 {
    requested_seconds.clamp(1, MAX_CPU_BURN_SECONDS) as u64
}

/// Saturates a requested allocation size into `[1, MAX_MEMORY_MB]`.
#[allow(clippy::cast_sign_loss)]
pub fn clamp_memory_megabytes(requested_mb: i64) -> u64 {
    requested_mb.clamp(1, MAX_MEMORY_MB) as u64
}

/// Saturates a requested hold period into `[1, MAX_MEMORY_HOLD_SECONDS]`.
#[allow(clippy::cast_sign_loss)]
pub fn clamp_memory_hold(requested_seconds: i64) -> u64 {
    requested_seconds.clamp(1, MAX_MEMORY_HOLD_SECONDS) as u64
}
