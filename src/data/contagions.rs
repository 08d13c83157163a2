//! Daily contagion reports from the Protezione Civile repository.

use super::{read_csv, Area, DataError, Series};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// Subdirectory of the national daily files
pub const NATIONAL_DIR: &str = "dati-andamento-nazionale";
/// Subdirectory of the regional daily files
pub const REGIONAL_DIR: &str = "dati-regioni";

/// Daily file name for a subdirectory, e.g. `dpc-covid19-ita-regioni-20210315.csv`.
pub fn daily_file_name(subdir: &str, date: NaiveDate) -> String {
    let kind = subdir.strip_prefix("dati-").unwrap_or(subdir);
    format!("dpc-covid19-ita-{}-{}.csv", kind, date.format("%Y%m%d"))
}

/// Date encoded in a daily file name, if it is one.
pub fn date_from_file_name(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_suffix(".csv")?;
    if !stem.starts_with("dpc-covid19-ita-") {
        return None;
    }
    let digits = stem.get(stem.len().saturating_sub(8)..)?;
    NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
}

fn deserialize_report_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

/// One row of a national or regional daily report.
///
/// Columns introduced later in the pandemic are optional.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ContagionRecord {
    #[serde(deserialize_with = "deserialize_report_date")]
    pub data: NaiveDate,
    #[serde(default)]
    pub codice_regione: Option<u32>,
    #[serde(default)]
    pub denominazione_regione: Option<String>,
    #[serde(default)]
    pub ricoverati_con_sintomi: Option<f64>,
    #[serde(default)]
    pub terapia_intensiva: Option<f64>,
    #[serde(default)]
    pub totale_ospedalizzati: Option<f64>,
    #[serde(default)]
    pub isolamento_domiciliare: Option<f64>,
    #[serde(default)]
    pub totale_positivi: Option<f64>,
    #[serde(default)]
    pub nuovi_positivi: Option<f64>,
    #[serde(default)]
    pub dimessi_guariti: Option<f64>,
    #[serde(default)]
    pub deceduti: Option<f64>,
    #[serde(default)]
    pub tamponi: Option<f64>,
    #[serde(default)]
    pub tamponi_test_molecolare: Option<f64>,
    #[serde(default)]
    pub tamponi_test_antigenico_rapido: Option<f64>,
    #[serde(default)]
    pub totale_positivi_test_molecolare: Option<f64>,
    #[serde(default)]
    pub totale_positivi_test_antigenico_rapido: Option<f64>,
}

/// National and regional daily reports held in memory.
#[derive(Debug, Clone, Default)]
pub struct ContagionsDatabase {
    national: Vec<ContagionRecord>,
    regional: Vec<ContagionRecord>,
}

impl ContagionsDatabase {
    pub fn new(mut national: Vec<ContagionRecord>, mut regional: Vec<ContagionRecord>) -> Self {
        national.sort_by_key(|r| r.data);
        regional.sort_by_key(|r| r.data);
        Self { national, regional }
    }

    /// Load every daily file found under `dir`.
    pub fn load(dir: &Path) -> Result<Self, DataError> {
        if !dir.is_dir() {
            return Err(DataError::NotFound(dir.to_path_buf()));
        }
        let national = load_daily_files(&dir.join(NATIONAL_DIR))?;
        let regional = load_daily_files(&dir.join(REGIONAL_DIR))?;

        tracing::debug!(
            dir = %dir.display(),
            national_rows = national.len(),
            regional_rows = regional.len(),
            "Loaded contagion reports"
        );

        Ok(Self::new(national, regional))
    }

    pub fn is_empty(&self) -> bool {
        self.national.is_empty() && self.regional.is_empty()
    }

    /// Reports of the area, ordered by date.
    pub fn records(&self, area: Area) -> Vec<&ContagionRecord> {
        match area {
            Area::Italy => self.national.iter().collect(),
            Area::Region(region) => self
                .regional
                .iter()
                .filter(|r| r.denominazione_regione.as_deref() == Some(region.name()))
                .collect(),
        }
    }

    /// Distinct region names present in the regional reports, sorted.
    pub fn regions(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .regional
            .iter()
            .filter_map(|r| r.denominazione_regione.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Most recent report date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.national.last().map(|r| r.data)
    }
}

/// Build a series from one column of the given reports.
pub fn column(
    records: &[&ContagionRecord],
    field: impl Fn(&ContagionRecord) -> Option<f64>,
) -> Series {
    Series::from_options(records.iter().map(|r| (r.data, field(*r))))
}

fn load_daily_files(dir: &Path) -> Result<Vec<ContagionRecord>, DataError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|source| DataError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .and_then(date_from_file_name)
                .is_some()
        })
        .collect();
    files.sort();

    let mut records = Vec::new();
    for file in files {
        records.extend(read_csv::<ContagionRecord>(&file)?);
    }
    Ok(records)
}
