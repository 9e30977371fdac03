//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by route and status
//! - `relay_upload_bytes` (histogram): size of accepted files
//! - `relay_upstream_duration_seconds` (histogram): upstream latency by outcome

use axum::http::StatusCode;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Serve Prometheus metrics on `addr`. Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(route: &str, status: StatusCode) {
    counter!(
        "relay_requests_total",
        "route" => route.to_owned(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
}

pub fn record_upload_size(bytes: usize) {
    histogram!("relay_upload_bytes").record(bytes as f64);
}

pub fn record_upstream(outcome: &'static str, started: Instant) {
    histogram!("relay_upstream_duration_seconds", "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}
