//! Metrics collection and exposition.
//!
//! # Metrics
//! - `canary_decisions_total` (counter): decisions by app, outcome
//! - `canary_updates_total` (counter): record updates by app, result
//! - `canary_store_io_duration_seconds` (histogram): store load/save latency
//! - `canary_http_requests_total` (counter): requests by route, status

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::canary::types::Outcome;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(app: &str, outcome: Outcome) {
    counter!(
        "canary_decisions_total",
        "app" => app.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_update(app: &str, ok: bool) {
    counter!(
        "canary_updates_total",
        "app" => app.to_string(),
        "result" => if ok { "ok" } else { "error" }
    )
    .increment(1);
}

pub fn record_store_io(op: &'static str, start: Instant) {
    histogram!("canary_store_io_duration_seconds", "op" => op)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_request(route: &'static str, status: u16) {
    counter!(
        "canary_http_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
}
