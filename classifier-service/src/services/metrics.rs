//! Metrics collection and Prometheus export.
//!
//! Initializes the metrics exporter and provides helpers for classification metrics.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the metrics recorder.
///
/// This must be called once at startup before any metrics are recorded.
/// Panics if called more than once.
pub fn init_metrics() {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        panic!("failed to set metrics handle: already initialized");
    }
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

/// Record a finished classification request.
///
/// `source` is `file` or `url`; `outcome` is a short result label.
pub fn record_classification(source: &'static str, outcome: &'static str, duration_secs: f64) {
    metrics::counter!(
        "classification_requests_total",
        "source" => source,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("classification_duration_seconds", "source" => source)
        .record(duration_secs);
}
