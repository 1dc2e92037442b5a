//! Metrics collection and exposition.
//!
//! # Metrics
//! - `record_proxy_requests_total` (counter): requests by route, status
//! - `record_proxy_request_duration_seconds` (histogram): latency by route
//! - `record_proxy_upstream_fetches_total` (counter): fetches by outcome
//! - `record_proxy_upstream_bytes_total` (counter): body bytes received
//! - `record_proxy_upstream_duration_seconds` (histogram): fetch latency by outcome
//! - `record_proxy_sitemap_entries` (gauge): size of the last sitemap
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until
//!   an exporter is installed
//! - Prometheus exporter listens on its own address

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// One finished inbound request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "record_proxy_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("record_proxy_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// One upstream fetch, successful or not.
pub fn record_upstream_fetch(outcome: &'static str, bytes: usize, start: Instant) {
    metrics::counter!("record_proxy_upstream_fetches_total", "outcome" => outcome).increment(1);
    metrics::counter!("record_proxy_upstream_bytes_total").increment(bytes as u64);
    metrics::histogram!("record_proxy_upstream_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Size of the sitemap just served.
pub fn record_sitemap_entries(entries: usize) {
    metrics::gauge!("record_proxy_sitemap_entries").set(entries as f64);
}
