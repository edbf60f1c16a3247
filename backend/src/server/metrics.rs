//! Optional Prometheus metrics middleware.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use prometheus::Registry;

const NAMESPACE: &str = "feedback_board";

/// Build the request metrics middleware serving `/metrics`.
///
/// Each call gets its own registry, so building twice in one process does
/// not collide on collector names.
///
/// # Errors
/// Returns [`std::io::Error`] when collector registration fails.
pub(crate) fn build_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new(NAMESPACE)
        .registry(Registry::new())
        .endpoint("/metrics")
        .build()
        .map_err(|err| std::io::Error::other(format!("configure Prometheus metrics: {err}")))
}
