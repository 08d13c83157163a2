//! Download of the contagion and vaccination open-data files.
//!
//! Files are stored verbatim under the data directory so that
//! [`crate::data::Datasets::load`] can read them back. Downloads run
//! concurrently, bounded by `data.max_concurrent_downloads`.

mod error;

pub use error::FetchError;

use crate::config::DataConfig;
use crate::data::contagions::{daily_file_name, NATIONAL_DIR, REGIONAL_DIR};
use crate::data::vaccines::{DATASET_FILES, LAST_UPDATE_FILE};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The two remote datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Contagions,
    Vaccinations,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::Contagions, Dataset::Vaccinations];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Contagions => "contagions",
            Dataset::Vaccinations => "vaccinations",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an update run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    /// Files written to disk
    pub downloaded: usize,
    /// Files already present and left untouched
    pub skipped: usize,
    /// Files not published yet (only today's contagion reports)
    pub missing: Vec<String>,
}

impl UpdateReport {
    fn record(&mut self, outcomes: Vec<Outcome>, dataset: Dataset) {
        let mut downloaded = 0;
        for outcome in outcomes {
            match outcome {
                Outcome::Downloaded => downloaded += 1,
                Outcome::Missing(name) => self.missing.push(name),
            }
        }
        self.downloaded += downloaded;
        self.missing.sort();

        if downloaded > 0 {
            metrics::counter!("covidash_downloads_total", "dataset" => dataset.as_str())
                .increment(downloaded as u64);
        }
    }
}

enum Outcome {
    Downloaded,
    Missing(String),
}

#[derive(Debug, Deserialize)]
struct LastUpdate {
    ultimo_aggiornamento: String,
}

/// Create `dir` if needed. Returns whether it was created.
pub fn create_dir(dir: &Path) -> Result<bool, FetchError> {
    if dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "Directory exists, ignore creation");
        return Ok(false);
    }
    std::fs::create_dir_all(dir).map_err(|e| FetchError::io(dir, e))?;
    tracing::info!(dir = %dir.display(), "New directory");
    Ok(true)
}

/// Current local date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse an `ultimo_aggiornamento` value. Timestamps without an offset are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_last_update(source: &str, body: &str) -> Result<DateTime<Utc>, FetchError> {
    let parse_error = |message: String| FetchError::Parse {
        url: source.to_string(),
        message,
    };
    let last: LastUpdate = serde_json::from_str(body).map_err(|e| parse_error(e.to_string()))?;
    parse_timestamp(&last.ultimo_aggiornamento).ok_or_else(|| {
        parse_error(format!(
            "invalid timestamp \"{}\"",
            last.ultimo_aggiornamento
        ))
    })
}

/// Local dataset timestamp; the Unix epoch when the file does not exist.
fn read_local_timestamp(path: &Path) -> Result<DateTime<Utc>, FetchError> {
    if !path.exists() {
        return Ok(DateTime::<Utc>::default());
    }
    let body = std::fs::read_to_string(path).map_err(|e| FetchError::io(path, e))?;
    parse_last_update(&path.display().to_string(), &body)
}

fn check_csv(url: &str, body: &[u8]) -> Result<(), FetchError> {
    let mut reader = csv::Reader::from_reader(body);
    let headers = reader.headers().map_err(|e| FetchError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    if headers.is_empty() {
        return Err(FetchError::Parse {
            url: url.to_string(),
            message: "empty CSV file".to_string(),
        });
    }
    Ok(())
}

/// HTTP client for the two open-data repositories.
pub struct Fetcher {
    client: reqwest::Client,
    contagions_url: String,
    vaccinations_url: String,
    timeout_seconds: u64,
    max_concurrent: usize,
}

impl Fetcher {
    /// Create a fetcher with a client using the configured timeout.
    pub fn new(config: &DataConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("covidash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self::with_client(config, client))
    }

    /// Create a fetcher with a custom HTTP client (for testing).
    pub fn with_client(config: &DataConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            contagions_url: config.contagions_url.trim_end_matches('/').to_string(),
            vaccinations_url: config.vaccinations_url.trim_end_matches('/').to_string(),
            timeout_seconds: config.timeout_seconds,
            max_concurrent: config.max_concurrent_downloads.max(1),
        }
    }

    fn classify_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout_seconds)
        } else {
            FetchError::ConnectionFailed(e.to_string())
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify_error(e))
    }

    /// Download a CSV file.
    ///
    /// An HTTP error status is returned as `FetchError::Http` when
    /// `raise_error` is set; otherwise it is logged and `Ok(None)` is returned.
    /// Connection failures are always errors.
    pub async fn download_csv(
        &self,
        url: &str,
        raise_error: bool,
    ) -> Result<Option<Vec<u8>>, FetchError> {
        tracing::debug!(url, "Downloading");

        let response = self.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            if raise_error {
                return Err(FetchError::Http {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            tracing::error!(url, status = status.as_u16(), "Unable to download");
            return Ok(None);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify_error(e))?
            .to_vec();
        check_csv(url, &body)?;
        Ok(Some(body))
    }

    async fn download_to(
        &self,
        url: &str,
        path: &Path,
        raise_error: bool,
    ) -> Result<Outcome, FetchError> {
        match self.download_csv(url, raise_error).await? {
            Some(body) => {
                tokio::fs::write(path, body)
                    .await
                    .map_err(|e| FetchError::io(path, e))?;
                tracing::debug!(file = %path.display(), "New file");
                Ok(Outcome::Downloaded)
            }
            None => Ok(Outcome::Missing(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            )),
        }
    }

    async fn download_all(
        &self,
        pending: Vec<(String, PathBuf, bool)>,
    ) -> Result<Vec<Outcome>, FetchError> {
        stream::iter(pending)
            .map(|(url, path, raise_error)| async move {
                self.download_to(&url, &path, raise_error).await
            })
            .buffer_unordered(self.max_concurrent)
            .try_collect()
            .await
    }

    /// Download the national and regional daily reports from `start` to `end`
    /// (today when `None`), both inclusive.
    ///
    /// Existing files are skipped unless `force`. A report for today that is
    /// not published yet is tolerated; any other failure aborts the update.
    pub async fn update_contagions(
        &self,
        dir: &Path,
        start: NaiveDate,
        end: Option<NaiveDate>,
        force: bool,
    ) -> Result<UpdateReport, FetchError> {
        let today = today();
        let end = end.unwrap_or(today);

        tracing::debug!(
            dir = %dir.display(),
            start_date = %start,
            end_date = %end,
            force,
            "Updating contagions data"
        );

        create_dir(dir)?;
        for subdir in [NATIONAL_DIR, REGIONAL_DIR] {
            create_dir(&dir.join(subdir))?;
        }

        let mut report = UpdateReport::default();
        let mut pending = Vec::new();

        for date in start.iter_days().take_while(|d| *d <= end) {
            for subdir in [NATIONAL_DIR, REGIONAL_DIR] {
                let name = daily_file_name(subdir, date);
                let path = dir.join(subdir).join(&name);
                if !force && path.exists() {
                    report.skipped += 1;
                    continue;
                }
                let url = format!("{}/{}/{}", self.contagions_url, subdir, name);
                pending.push((url, path, date != today));
            }
        }

        let outcomes = self.download_all(pending).await?;
        report.record(outcomes, Dataset::Contagions);

        tracing::info!(
            downloaded = report.downloaded,
            skipped = report.skipped,
            missing = report.missing.len(),
            "Contagions data updated"
        );
        Ok(report)
    }

    /// Download the vaccination files when the remote dataset is newer than
    /// the local copy, or unconditionally with `force`.
    pub async fn update_vaccinations(
        &self,
        dir: &Path,
        force: bool,
    ) -> Result<UpdateReport, FetchError> {
        tracing::debug!(dir = %dir.display(), force, "Updating vaccinations data");

        create_dir(dir)?;

        let last_update_path = dir.join(LAST_UPDATE_FILE);
        let local = read_local_timestamp(&last_update_path)?;

        let url = format!("{}/{}", self.vaccinations_url, LAST_UPDATE_FILE);
        let response = self.get(&url).await?;
        if !response.status().is_success() {
            return Err(FetchError::Http {
                url,
                status: response.status().as_u16(),
            });
        }
        let body = response.text().await.map_err(|e| self.classify_error(e))?;
        let remote = parse_last_update(&url, &body)?;

        tracing::debug!(remote = %remote, local = %local, "Update timestamps");

        if !force && remote <= local {
            tracing::debug!("No updates");
            return Ok(UpdateReport::default());
        }

        tokio::fs::write(&last_update_path, &body)
            .await
            .map_err(|e| FetchError::io(&last_update_path, e))?;

        let mut report = UpdateReport::default();
        let mut pending = Vec::new();
        for name in DATASET_FILES {
            let path = dir.join(name);
            if !force && path.exists() {
                report.skipped += 1;
                continue;
            }
            pending.push((format!("{}/{}", self.vaccinations_url, name), path, true));
        }

        let outcomes = self.download_all(pending).await?;
        report.record(outcomes, Dataset::Vaccinations);

        tracing::info!(
            downloaded = report.downloaded,
            skipped = report.skipped,
            "Vaccinations data updated"
        );
        Ok(report)
    }

    /// Update one dataset under the data directory layout of `config`.
    pub async fn update(
        &self,
        dataset: Dataset,
        config: &DataConfig,
        force: bool,
    ) -> Result<UpdateReport, FetchError> {
        match dataset {
            Dataset::Contagions => {
                self.update_contagions(&config.contagions_dir(), config.start_date, None, force)
                    .await
            }
            Dataset::Vaccinations => {
                self.update_vaccinations(&config.vaccinations_dir(), force)
                    .await
            }
        }
    }
}
