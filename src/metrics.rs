#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use anyhow::{Context, Result as AnyResult};
use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,
    pub cpu_burn_active: IntGauge,
    pub memory_hold_active: IntGauge,
    pub allocated_megabytes: IntGauge,
    pub cpu_burns_total: IntCounter,
    pub memory_holds_total: IntCounter,
    pub stop_all_total: IntCounter,
}

impl Metrics {
    pub fn new() -> AnyResult<Self> {
        let registry = Registry::new();
        let cpu_burn_active =
            IntGauge::with_opts(Opts::new("chaos_cpu_burn_active", "1 while a burn is running"))
                .context("create cpu_burn_active")?;
        let memory_hold_active = IntGauge::with_opts(Opts::new(
            "chaos_memory_hold_active",
            "1 while allocated blocks are held",
        ))
        .context("create memory_hold_active")?;
        let allocated_megabytes = IntGauge::with_opts(Opts::new(
            "chaos_allocated_megabytes",
            "currently held memory in MiB",
        ))
        .context("create allocated_megabytes")?;
        let cpu_burns_total =
            IntCounter::with_opts(Opts::new("chaos_cpu_burns_total", "burns started"))
                .context("create cpu_burns_total")?;
        let memory_holds_total =
            IntCounter::with_opts(Opts::new("chaos_memory_holds_total", "holds started"))
                .context("create memory_holds_total")?;
        let stop_all_total =
            IntCounter::with_opts(Opts::new("chaos_stop_all_total", "stop-all requests"))
                .context("create stop_all_total")?;
        registry
            .register(Box::new(cpu_burn_active.clone()))
            .context("register cpu_burn_active")?;
        registry
            .register(Box::new(memory_hold_active.clone()))
            .context("register memory_hold_active")?;
        registry
            .register(Box::new(allocated_megabytes.clone()))
            .context("register allocated_megabytes")?;
        registry
            .register(Box::new(cpu_burns_total.clone()))
            .context("register cpu_burns_total")?;
        registry
            .register(Box::new(memory_holds_total.clone()))
            .context("register memory_holds_total")?;
        registry
            .register(Box::new(stop_all_total.clone()))
            .context("register stop_all_total")?;
        Ok(Self {
            registry,
            cpu_burn_active,
            memory_hold_active,
            allocated_megabytes,
            cpu_burns_total,
            memory_holds_total,
            stop_all_total,
        })
    }

    pub fn encode_text(&self) -> AnyResult<Vec<u8>> {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        let mf = self.registry.gather();
        encoder.encode(&mf, &mut buf).context("encode metrics")?;
        Ok(buf)
    }
}
