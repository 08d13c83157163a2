//! # Metrics Module
//!
//! Prometheus export of the dashboard's operational metrics, served at
//! `GET /metrics`.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `covidash_refresh_total{dataset, status}` - Dataset update attempts
//! - `covidash_downloads_total{dataset}` - Files downloaded
//! - `covidash_page_renders_total` - Dashboard pages served
//!
//! **Histograms:**
//! - `covidash_refresh_duration_seconds` - Duration of a refresh cycle
//!
//! **Gauges:**
//! - `covidash_last_refresh_timestamp_seconds` - Unix time of the last snapshot swap
//! - `covidash_datasets_loaded` - Datasets currently served (0-2)
//! - `covidash_uptime_seconds` - Seconds since the server started

pub mod handler;

// Re-export PrometheusBuilder for test compatibility
pub use metrics_exporter_prometheus::PrometheusBuilder;

use crate::refresh::SharedDatasets;
use std::sync::Arc;
use std::time::Instant;

/// Renders Prometheus text and keeps derived gauges current.
pub struct MetricsCollector {
    /// Dataset snapshot for computing gauges
    datasets: Arc<SharedDatasets>,
    /// Service startup time for uptime calculation
    start_time: Instant,
    /// Prometheus handle for rendering metrics
    prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(
        datasets: Arc<SharedDatasets>,
        start_time: Instant,
        prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        Self {
            datasets,
            start_time,
            prometheus_handle,
        }
    }

    /// Update gauges derived from the current snapshot.
    pub fn update_dataset_gauges(&self) {
        let status = self.datasets.snapshot().status();
        let loaded = [status.contagions_loaded, status.vaccinations_loaded]
            .iter()
            .filter(|l| **l)
            .count();
        metrics::gauge!("covidash_datasets_loaded").set(loaded as f64);
        metrics::gauge!("covidash_uptime_seconds").set(self.uptime_seconds() as f64);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Render Prometheus metrics in text format.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Initialize the Prometheus exporter with refresh duration buckets.
///
/// Returns a PrometheusHandle that can be used to render metrics.
pub fn setup_metrics(
) -> Result<metrics_exporter_prometheus::PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let duration_buckets = &[0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("covidash_refresh_duration_seconds".to_string()),
            duration_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Handle for the global recorder, or a detached one when a recorder is
/// already installed (e.g. several routers in one test binary).
pub fn metrics_handle() -> metrics_exporter_prometheus::PrometheusHandle {
    setup_metrics().unwrap_or_else(|e| {
        tracing::debug!("Metrics already initialized, creating new handle: {}", e);
        PrometheusBuilder::new().build_recorder().handle()
    })
}
