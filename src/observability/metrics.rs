//! Metrics collection and exposition.
//!
//! # Metrics
//! - `seikan_connections_accepted_total` (counter)
//! - `seikan_sessions_active` (gauge): sessions not yet closed
//! - `seikan_bytes_total` (counter): bytes relayed, by direction
//! - `seikan_session_outcomes_total` (counter): closed sessions, by outcome
//! - `seikan_session_duration_seconds` (histogram)
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and serve it on `addr`.
/// Must be called from within the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_accepted() {
    counter!("seikan_connections_accepted_total").increment(1);
}

pub fn session_opened() {
    gauge!("seikan_sessions_active").increment(1.0);
}

pub fn session_closed(outcome: &'static str, started: Instant) {
    gauge!("seikan_sessions_active").decrement(1.0);
    counter!("seikan_session_outcomes_total", "outcome" => outcome).increment(1);
    histogram!("seikan_session_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_bytes(direction: &'static str, bytes: usize) {
    counter!("seikan_bytes_total", "direction" => direction).increment(bytes as u64);
}
