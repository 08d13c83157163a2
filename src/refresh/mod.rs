//! Background refresh of the local datasets.
//!
//! Each cycle downloads what is new, reloads the data directory and swaps
//! the snapshot served by the dashboard.

mod shared;

pub use shared::SharedDatasets;

use crate::config::{DataConfig, RefreshConfig};
use crate::dashboard::types::WebSocketUpdate;
use crate::data::Datasets;
use crate::fetch::{Dataset, FetchError, Fetcher};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Result of one refresh cycle.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RefreshSummary {
    /// Files downloaded across both datasets
    pub downloaded: usize,
    /// Datasets whose update failed, with the error
    pub errors: Vec<String>,
    /// Whether a new snapshot was swapped in
    pub reloaded: bool,
}

/// Load the data directory without blocking the runtime.
pub async fn load_datasets(config: &DataConfig) -> Datasets {
    let contagions_dir = config.contagions_dir();
    let vaccinations_dir = config.vaccinations_dir();

    match tokio::task::spawn_blocking(move || Datasets::load(&contagions_dir, &vaccinations_dir))
        .await
    {
        Ok(datasets) => datasets,
        Err(e) => {
            tracing::error!(error = %e, "Dataset loading task failed");
            Datasets::empty()
        }
    }
}

/// Keep the previous table for any dataset the new load could not read.
fn keep_previous(mut next: Datasets, previous: &Datasets) -> Datasets {
    if next.contagions.is_none() && previous.contagions.is_some() {
        tracing::warn!("Keeping previous contagion data");
        next.contagions = previous.contagions.clone();
    }
    if next.vaccines.is_none() && previous.vaccines.is_some() {
        tracing::warn!("Keeping previous vaccination data");
        next.vaccines = previous.vaccines.clone();
    }
    next
}

/// Background service that periodically updates and reloads the datasets.
pub struct DataRefresher {
    fetcher: Fetcher,
    data: DataConfig,
    refresh: RefreshConfig,
    datasets: Arc<SharedDatasets>,
    ws_broadcast: Option<broadcast::Sender<WebSocketUpdate>>,
}

impl DataRefresher {
    /// Create a refresher with the default HTTP client.
    pub fn new(
        data: DataConfig,
        refresh: RefreshConfig,
        datasets: Arc<SharedDatasets>,
    ) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(&data)?;
        Ok(Self::with_fetcher(data, refresh, datasets, fetcher))
    }

    /// Create a refresher with a custom fetcher (for testing).
    pub fn with_fetcher(
        data: DataConfig,
        refresh: RefreshConfig,
        datasets: Arc<SharedDatasets>,
        fetcher: Fetcher,
    ) -> Self {
        Self {
            fetcher,
            data,
            refresh,
            datasets,
            ws_broadcast: None,
        }
    }

    /// Set the WebSocket broadcast sender for dashboard updates.
    pub fn with_broadcast(mut self, sender: broadcast::Sender<WebSocketUpdate>) -> Self {
        self.ws_broadcast = Some(sender);
        self
    }

    /// Run one update-and-reload cycle.
    pub async fn refresh_once(&self) -> RefreshSummary {
        let started = Instant::now();
        let mut summary = RefreshSummary::default();

        for dataset in Dataset::ALL {
            match self.fetcher.update(dataset, &self.data, false).await {
                Ok(report) => {
                    metrics::counter!("covidash_refresh_total",
                        "dataset" => dataset.as_str(),
                        "status" => "success"
                    )
                    .increment(1);
                    summary.downloaded += report.downloaded;
                }
                Err(e) => {
                    metrics::counter!("covidash_refresh_total",
                        "dataset" => dataset.as_str(),
                        "status" => "error"
                    )
                    .increment(1);
                    tracing::error!(dataset = %dataset, error = %e, "Dataset update failed");
                    summary.errors.push(format!("{dataset}: {e}"));
                }
            }
        }

        let previous = self.datasets.snapshot();
        if summary.downloaded == 0 && previous.loaded_at.is_some() {
            tracing::debug!("No new files, snapshot unchanged");
        } else {
            let next = keep_previous(load_datasets(&self.data).await, &previous);
            let status = next.status();
            self.datasets.replace(next);
            summary.reloaded = true;

            metrics::gauge!("covidash_last_refresh_timestamp_seconds")
                .set(chrono::Utc::now().timestamp() as f64);
            tracing::info!(
                downloaded = summary.downloaded,
                contagions_loaded = status.contagions_loaded,
                vaccinations_loaded = status.vaccinations_loaded,
                "Datasets reloaded"
            );

            if let Some(sender) = &self.ws_broadcast {
                // Ignore error if no receivers are listening
                let _ = sender.send(crate::dashboard::websocket::create_data_refreshed_update(
                    &status,
                ));
            }
        }

        if !summary.errors.is_empty() {
            if let Some(sender) = &self.ws_broadcast {
                let _ = sender.send(crate::dashboard::websocket::create_refresh_failed_update(
                    &summary.errors,
                ));
            }
        }

        metrics::histogram!("covidash_refresh_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        summary
    }

    /// Start the refresher background task.
    /// The first cycle runs immediately. Returns a JoinHandle that resolves
    /// when the refresher stops.
    pub fn start(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(self.refresh.interval_seconds.max(1)));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!(
                interval_seconds = self.refresh.interval_seconds,
                "Data refresher started"
            );

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Data refresher shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let summary = self.refresh_once().await;
                        tracing::debug!(
                            downloaded = summary.downloaded,
                            errors = summary.errors.len(),
                            reloaded = summary.reloaded,
                            "Refresh cycle completed"
                        );
                    }
                }
            }
        })
    }
}
