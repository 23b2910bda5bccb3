//! Metrics collection and exposition.
//!
//! # Metrics
//! - `reflector_requests_total` (counter): requests by outcome
//! - `reflector_request_duration_seconds` (histogram): latency by outcome
//!
//! Outcomes are `rendered`, `upstream_error_status`, `incomplete_metadata`
//! and `upstream_failure`.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Outcome label for requests whose upstream fetch failed outright.
pub const UPSTREAM_FAILURE: &str = "upstream_failure";

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one finished request.
pub fn record_reflection(outcome: &'static str, start: Instant) {
    ::metrics::counter!("reflector_requests_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("reflector_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
