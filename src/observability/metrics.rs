//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define honeypot metrics (connections, captures, session outcomes)
//! - Expose Prometheus-compatible metrics endpoint when enabled
//!
//! # Metrics
//! - `honeypot_connections_total` (counter): accepted connections
//! - `honeypot_active_connections` (gauge): handlers currently running
//! - `honeypot_credentials_captured_total` (counter): records appended
//! - `honeypot_sessions_total` (counter): finished sessions by `outcome`
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests and
//!   metrics-disabled runs pay nothing

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the global Prometheus recorder with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

pub fn record_connection_accepted() {
    counter!("honeypot_connections_total").increment(1);
}

pub fn record_active_connections(active: u64) {
    gauge!("honeypot_active_connections").set(active as f64);
}

pub fn record_credential_captured() {
    counter!("honeypot_credentials_captured_total").increment(1);
}

pub fn record_session_outcome(outcome: &'static str) {
    counter!("honeypot_sessions_total", "outcome" => outcome).increment(1);
}
