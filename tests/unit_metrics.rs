#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use chaos_engine::metrics::Metrics;

#[test]
fn create_and_encode() {
    let m = Metrics::new().expect("metrics");
    let buf = m.encode_text().expect("encode");
    assert!(!buf.is_empty());
}

#[test]
fn gauges_appear_in_text_output() {
    let m = Metrics::new().expect("metrics");
    m.cpu_burn_active.set(1);
    m.allocated_megabytes.set(64);
    m.cpu_burns_total.inc();
    let text = String::from_utf8(m.encode_text().expect("encode")).expect("utf8");
    assert!(text.contains("chaos_cpu_burn_active 1"));
    assert!(text.contains("chaos_allocated_megabytes 64"));
    assert!(text.contains("chaos_cpu_burns_total 1"));
}
