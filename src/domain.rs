#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::service::ChaosCoordinator;

/// Errors the engine can hand back to a caller. All are local and
/// recoverable; none may escalate to a process crash.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StressError {
    #[error("Invalid JSON body")]
    InvalidInput,
    #[error("{0} already in progress")]
    Conflict(&'static str),
    #[error("Failed to allocate memory")]
    AllocationFailed,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct CpuStressRequest {
    #[serde(default = "default_cpu_duration")]
    pub duration_seconds: i64,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct MemoryStressRequest {
    #[serde(default = "default_memory_megabytes")]
    pub megabytes: i64,
    #[serde(default = "default_memory_hold")]
    pub hold_seconds: i64,
}

fn default_cpu_duration() -> i64 {
    10
}

fn default_memory_megabytes() -> i64 {
    64
}

fn default_memory_hold() -> i64 {
    10
}

/// Decodes a raw request body. A body that is not a JSON object of the
/// expected shape becomes `InvalidInput` before any controller is touched;
/// missing fields take their serde defaults.
pub fn parse_request<T: DeserializeOwned>(body: &[u8]) -> Result<T, StressError> {
    serde_json::from_slice(body).map_err(|_| StressError::InvalidInput)
}

#[derive(Clone)]
pub struct AppState {
    pub coordinator: ChaosCoordinator,
    pub metrics: crate::metrics::Metrics,
}
