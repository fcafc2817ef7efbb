#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

pub mod domain;
pub mod http;
pub mod lib_cpu;
pub mod lib_mem;
pub mod metrics;
pub mod safety;
pub mod service;

pub use domain::{parse_request, AppState, CpuStressRequest, MemoryStressRequest, StressError};
pub use http::serve;
pub use http::{burn_cpu, health, hold_memory, scrape_metrics, status, stop_all};
pub use lib_cpu::CpuStressController;
pub use lib_mem::MemoryStressController;
pub use metrics::Metrics;
pub use service::{ChaosCoordinator, StatusSnapshot};
