//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_submissions_total` (counter): by operation, outcome
//! - `relay_seal_outcomes_total` (counter): by operation, status
//! - `relay_seal_duration_seconds` (histogram): submit-to-terminal latency
//! - `relay_retries_total` (counter): by operation
//! - `relay_balance_degraded_total` (counter): by reason
//! - `relay_entropy_requests_total` (counter): by commit mode, outcome

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

use crate::transactions::types::SealStatus;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_submission(operation: &'static str, outcome: &'static str) {
    ::metrics::counter!("relay_submissions_total", "operation" => operation, "outcome" => outcome).increment(1);
}

pub fn record_seal(operation: &'static str, status: SealStatus, elapsed: Duration) {
    let status = status.as_label();
    ::metrics::counter!("relay_seal_outcomes_total", "operation" => operation, "status" => status).increment(1);
    ::metrics::histogram!("relay_seal_duration_seconds", "operation" => operation).record(elapsed.as_secs_f64());
}

pub fn record_retry(operation: &'static str) {
    ::metrics::counter!("relay_retries_total", "operation" => operation).increment(1);
}

pub fn record_balance_degraded(reason: &'static str) {
    ::metrics::counter!("relay_balance_degraded_total", "reason" => reason).increment(1);
}

pub fn record_entropy(commit_mode: &'static str, outcome: &'static str) {
    ::metrics::counter!("relay_entropy_requests_total", "mode" => commit_mode, "outcome" => outcome).increment(1);
}
