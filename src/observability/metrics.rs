//! Metrics collection and exposition.
//!
//! # Metrics
//! - `emulator_state_transitions_total` (counter): by `from`, `to`
//! - `emulator_connections_accepted_total` (counter)
//! - `emulator_handshakes_total` (counter): by `outcome`
//! - `emulator_ignored_requests_total` (counter): non-Hello or malformed reads
//! - `emulator_peer_lost_total` (counter): disconnects raised by the liveness monitor
//! - `emulator_connected` (gauge): 1 while a peer socket is held, else 0

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::lifecycle::ConnectionState;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_transition(from: ConnectionState, to: ConnectionState) {
    counter!(
        "emulator_state_transitions_total",
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
}

pub fn record_connection_accepted() {
    counter!("emulator_connections_accepted_total").increment(1);
}

pub fn record_handshake(outcome: &'static str) {
    counter!("emulator_handshakes_total", "outcome" => outcome).increment(1);
}

pub fn record_ignored_request() {
    counter!("emulator_ignored_requests_total").increment(1);
}

pub fn record_peer_lost() {
    counter!("emulator_peer_lost_total").increment(1);
}

pub fn set_connected(connected: bool) {
    gauge!("emulator_connected").set(if connected { 1.0 } else { 0.0 });
}
