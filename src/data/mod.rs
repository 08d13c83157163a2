//! In-memory datasets behind the dashboard.
//!
//! The contagion and vaccination files are loaded from the local data
//! directory into typed tables. Charts are derived from [`Series`] built
//! over those tables.

pub mod areas;
pub mod contagions;
mod error;
pub mod series;
pub mod vaccines;

pub use areas::{Area, Region, ITALY};
pub use contagions::{ContagionRecord, ContagionsDatabase};
pub use error::DataError;
pub use series::Series;
pub use vaccines::{DoseRecord, DoseType, VaccinesDatabase};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Deserialize every row of a CSV file with headers.
pub(crate) fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

/// Snapshot of both datasets. Either side is `None` until its files
/// have been downloaded and parsed.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub contagions: Option<ContagionsDatabase>,
    pub vaccines: Option<VaccinesDatabase>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl Datasets {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load whatever is available; a dataset that fails to load is left
    /// empty and the failure is logged.
    pub fn load(contagions_dir: &Path, vaccinations_dir: &Path) -> Self {
        let contagions = match ContagionsDatabase::load(contagions_dir) {
            Ok(db) if !db.is_empty() => Some(db),
            Ok(_) => {
                tracing::warn!(dir = %contagions_dir.display(), "No contagion reports found");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Contagion data unavailable");
                None
            }
        };

        let vaccines = match VaccinesDatabase::load(vaccinations_dir) {
            Ok(db) => Some(db),
            Err(e) => {
                tracing::warn!(error = %e, "Vaccination data unavailable");
                None
            }
        };

        Self {
            contagions,
            vaccines,
            loaded_at: Some(Utc::now()),
        }
    }

    pub fn status(&self) -> DatasetStatus {
        DatasetStatus {
            contagions_loaded: self.contagions.is_some(),
            vaccinations_loaded: self.vaccines.is_some(),
            contagions_last_date: self.contagions.as_ref().and_then(|c| c.last_date()),
            regions_reported: self.contagions.as_ref().map_or(0, |c| c.regions().len()),
            vaccinations_last_date: self.vaccines.as_ref().and_then(|v| v.last_date()),
            loaded_at: self.loaded_at,
        }
    }
}

/// Summary of what a snapshot holds.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DatasetStatus {
    pub contagions_loaded: bool,
    pub vaccinations_loaded: bool,
    pub contagions_last_date: Option<chrono::NaiveDate>,
    /// Regions and autonomous provinces present in the regional reports
    pub regions_reported: usize,
    pub vaccinations_last_date: Option<chrono::NaiveDate>,
    pub loaded_at: Option<DateTime<Utc>>,
}
