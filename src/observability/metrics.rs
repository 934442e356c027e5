//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_host_classifications_total` (counter): requests by host category
//! - `edge_provisioning_total` (counter): domain operations by outcome
//! - `edge_hosting_api_calls_total` (counter): hosting API calls by outcome
//! - `edge_hosting_api_duration_seconds` (histogram): hosting API latency
//! - `edge_domain_verifications_total` (counter): checks by method and result
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels are fixed, low-cardinality strings (never domains or site ids)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_classification(category: &'static str) {
    metrics::counter!("edge_host_classifications_total", "category" => category).increment(1);
}

pub fn record_provisioning(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "edge_provisioning_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_hosting_call(operation: &'static str, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "edge_hosting_api_calls_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("edge_hosting_api_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_verification(method: &'static str, verified: bool) {
    metrics::counter!(
        "edge_domain_verifications_total",
        "method" => method,
        "verified" => if verified { "true" } else { "false" }
    )
    .increment(1);
}
