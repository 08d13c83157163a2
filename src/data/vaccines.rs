//! Vaccination open data: administrations, deliveries and target population.

use super::{read_csv, Area, DataError, Series};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::path::Path;

pub const DOSES_FILE: &str = "somministrazioni-vaccini-latest.csv";
pub const DELIVERIES_FILE: &str = "consegne-vaccini-latest.csv";
pub const POPULATION_FILE: &str = "platea.csv";
pub const BOOSTER_POPULATION_FILE: &str = "platea-dose-addizionale-booster.csv";
pub const LAST_UPDATE_FILE: &str = "last-update-dataset.json";

/// Files downloaded for the vaccination dataset, timestamp excluded.
pub const DATASET_FILES: [&str; 4] = [
    DELIVERIES_FILE,
    DOSES_FILE,
    POPULATION_FILE,
    BOOSTER_POPULATION_FILE,
];

/// Band that absorbs "80-89" and "90+" so doses and population line up.
pub const MERGED_ELDERLY_BAND: &str = "80+";

/// Merge the two oldest age bands.
pub fn normalize_age_band(band: &str) -> String {
    match band {
        "80-89" | "90+" => MERGED_ELDERLY_BAND.to_string(),
        other => other.to_string(),
    }
}

fn deserialize_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Administered doses for one day, supplier, area and age band.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DoseRecord {
    #[serde(alias = "data", deserialize_with = "deserialize_day")]
    pub data_somministrazione: NaiveDate,
    #[serde(alias = "forn")]
    pub fornitore: String,
    pub area: String,
    #[serde(alias = "eta")]
    pub fascia_anagrafica: String,
    #[serde(alias = "m", default, deserialize_with = "deserialize_count")]
    pub sesso_maschile: f64,
    #[serde(alias = "f", default, deserialize_with = "deserialize_count")]
    pub sesso_femminile: f64,
    #[serde(alias = "d1", default, deserialize_with = "deserialize_count")]
    pub prima_dose: f64,
    #[serde(alias = "d2", default, deserialize_with = "deserialize_count")]
    pub seconda_dose: f64,
    #[serde(alias = "dpi", default, deserialize_with = "deserialize_count")]
    pub pregressa_infezione: f64,
    #[serde(alias = "db1", default, deserialize_with = "deserialize_count")]
    pub dose_addizionale_booster: f64,
}

impl DoseRecord {
    /// All doses of the row regardless of type.
    pub fn total(&self) -> f64 {
        self.prima_dose + self.seconda_dose + self.pregressa_infezione + self.dose_addizionale_booster
    }
}

/// Dose types shown on the dashboard, with their column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoseType {
    First,
    Second,
    PriorInfection,
    Booster,
}

impl DoseType {
    pub const ALL: [DoseType; 4] = [
        DoseType::First,
        DoseType::Second,
        DoseType::PriorInfection,
        DoseType::Booster,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            DoseType::First => "prima_dose",
            DoseType::Second => "seconda_dose",
            DoseType::PriorInfection => "pregressa_infezione",
            DoseType::Booster => "dose_addizionale_booster",
        }
    }

    pub fn count(&self, record: &DoseRecord) -> f64 {
        match self {
            DoseType::First => record.prima_dose,
            DoseType::Second => record.seconda_dose,
            DoseType::PriorInfection => record.pregressa_infezione,
            DoseType::Booster => record.dose_addizionale_booster,
        }
    }
}

/// Doses delivered to an area on a given day.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeliveryRecord {
    pub area: String,
    #[serde(alias = "forn")]
    pub fornitore: String,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub numero_dosi: f64,
    #[serde(alias = "data", deserialize_with = "deserialize_day")]
    pub data_consegna: NaiveDate,
}

/// Target population per area and age band.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PopulationRecord {
    pub area: String,
    #[serde(alias = "eta")]
    pub fascia_anagrafica: String,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub totale_popolazione: f64,
}

/// Target population of the additional/booster dose.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BoosterPopulationRecord {
    pub area: String,
    #[serde(default)]
    pub categoria_prevalente: String,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub totale_popolazione: f64,
}

/// The four vaccination tables.
#[derive(Debug, Clone, Default)]
pub struct VaccinesDatabase {
    doses: Vec<DoseRecord>,
    deliveries: Vec<DeliveryRecord>,
    population: Vec<PopulationRecord>,
}

impl VaccinesDatabase {
    /// Build the database; age bands are normalized here.
    pub fn new(
        mut doses: Vec<DoseRecord>,
        deliveries: Vec<DeliveryRecord>,
        mut population: Vec<PopulationRecord>,
    ) -> Self {
        for d in &mut doses {
            d.fascia_anagrafica = normalize_age_band(&d.fascia_anagrafica);
        }
        for p in &mut population {
            p.fascia_anagrafica = normalize_age_band(&p.fascia_anagrafica);
        }
        Self {
            doses,
            deliveries,
            population,
        }
    }

    /// Load the four CSV files from `dir`. All of them must exist.
    pub fn load(dir: &Path) -> Result<Self, DataError> {
        for name in DATASET_FILES {
            let path = dir.join(name);
            if !path.is_file() {
                return Err(DataError::NotFound(path));
            }
        }

        let db = Self::new(
            read_csv(&dir.join(DOSES_FILE))?,
            read_csv(&dir.join(DELIVERIES_FILE))?,
            read_csv(&dir.join(POPULATION_FILE))?,
        );
        // no chart uses the booster population; a malformed file still fails the load
        let booster: Vec<BoosterPopulationRecord> =
            read_csv(&dir.join(BOOSTER_POPULATION_FILE))?;

        tracing::debug!(
            dir = %dir.display(),
            doses = db.doses.len(),
            deliveries = db.deliveries.len(),
            booster_population_rows = booster.len(),
            "Loaded vaccination data"
        );

        Ok(db)
    }

    /// Administrations in the area.
    pub fn doses(&self, area: Area) -> Vec<&DoseRecord> {
        match area.region() {
            None => self.doses.iter().collect(),
            Some(region) => self
                .doses
                .iter()
                .filter(|d| d.area.eq_ignore_ascii_case(region.code()))
                .collect(),
        }
    }

    /// Deliveries to the area.
    pub fn deliveries(&self, area: Area) -> Vec<&DeliveryRecord> {
        match area.region() {
            None => self.deliveries.iter().collect(),
            Some(region) => self
                .deliveries
                .iter()
                .filter(|d| d.area.eq_ignore_ascii_case(region.code()))
                .collect(),
        }
    }

    /// Total national population across all age bands.
    pub fn total_population(&self) -> f64 {
        self.population.iter().map(|p| p.totale_popolazione).sum()
    }

    /// National population of one age band.
    pub fn population_of_band(&self, band: &str) -> f64 {
        self.population
            .iter()
            .filter(|p| p.fascia_anagrafica == band)
            .map(|p| p.totale_popolazione)
            .sum()
    }

    /// Sorted distinct age bands among the administrations in the area.
    pub fn age_bands(&self, area: Area) -> Vec<String> {
        self.doses(area)
            .into_iter()
            .map(|d| d.fascia_anagrafica.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.doses.iter().map(|d| d.data_somministrazione).max()
    }
}

/// Sorted distinct suppliers of the given rows.
pub fn suppliers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    names
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Daily sum of a dose quantity.
pub fn daily_doses(doses: &[&DoseRecord], value: impl Fn(&DoseRecord) -> f64) -> Series {
    Series::group_sum(doses.iter().map(|d| (d.data_somministrazione, value(*d))))
}

/// Daily sum of delivered doses.
pub fn daily_deliveries(deliveries: &[&DeliveryRecord]) -> Series {
    Series::group_sum(deliveries.iter().map(|d| (d.data_consegna, d.numero_dosi)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Region;

    fn write_fixture(dir: &Path) {
        std::fs::write(
            dir.join(DOSES_FILE),
            "data_somministrazione,fornitore,area,fascia_anagrafica,sesso_maschile,sesso_femminile,prima_dose,seconda_dose,pregressa_infezione,dose_addizionale_booster,codice_NUTS1,codice_NUTS2,codice_regione_ISTAT,nome_area\n\
             2021-01-01,Pfizer/BioNTech,LOM,90+,1,2,3,0,0,,ITC,ITC4,3,Lombardia\n\
             2021-01-01,Moderna,LAZ,80-89,2,2,4,0,0,0,ITI,ITI4,12,Lazio\n\
             2021-01-02,Pfizer/BioNTech,LOM,20-29,5,5,6,4,0,0,ITC,ITC4,3,Lombardia\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(DELIVERIES_FILE),
            "area,fornitore,numero_dosi,data_consegna,codice_NUTS1,codice_NUTS2,codice_regione_ISTAT,nome_area\n\
             LOM,Pfizer/BioNTech,100,2020-12-30,ITC,ITC4,3,Lombardia\n\
             LAZ,Moderna,50,2020-12-31,ITI,ITI4,12,Lazio\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(POPULATION_FILE),
            "area,nome_area,fascia_anagrafica,totale_popolazione\n\
             LOM,Lombardia,20-29,1000\n\
             LOM,Lombardia,80-89,300\n\
             LOM,Lombardia,90+,100\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(BOOSTER_POPULATION_FILE),
            "area,nome_area,categoria_prevalente,totale_popolazione\n\
             LOM,Lombardia,Over 80,400\n",
        )
        .unwrap();
    }

    #[test]
    fn test_load_and_filter_by_area() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());

        let db = VaccinesDatabase::load(dir.path()).unwrap();
        assert_eq!(db.doses(Area::Italy).len(), 3);
        assert_eq!(db.doses(Area::Region(Region::Lombardia)).len(), 2);
        assert_eq!(db.deliveries(Area::Region(Region::Lazio)).len(), 1);
        assert!(db.doses(Area::Region(Region::Molise)).is_empty());
    }

    #[test]
    fn test_age_bands_merged() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());

        let db = VaccinesDatabase::load(dir.path()).unwrap();
        assert_eq!(db.age_bands(Area::Italy), vec!["20-29", "80+"]);
        assert_eq!(db.age_bands(Area::Region(Region::Lazio)), vec!["80+"]);
        assert!(db.age_bands(Area::Region(Region::Molise)).is_empty());
        assert_eq!(db.population_of_band("80+"), 400.0);
        assert_eq!(db.total_population(), 1400.0);
    }

    #[test]
    fn test_dose_total_and_missing_counts() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());

        let db = VaccinesDatabase::load(dir.path()).unwrap();
        let doses = db.doses(Area::Italy);
        // empty booster cell counts as zero
        assert_eq!(doses[0].dose_addizionale_booster, 0.0);
        assert_eq!(doses[0].total(), 3.0);

        let daily = daily_doses(&doses, DoseRecord::total);
        let day1 = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(daily.get(&day1), Some(7.0));
        assert_eq!(db.last_date(), NaiveDate::from_ymd_opt(2021, 1, 2));
    }

    #[test]
    fn test_short_column_names_accepted() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        std::fs::write(
            dir.path().join(DOSES_FILE),
            "data,forn,area,eta,m,f,d1,d2,dpi,db1\n2022-03-01,Novavax,VEN,50-59,1,1,2,0,0,0\n",
        )
        .unwrap();

        let db = VaccinesDatabase::load(dir.path()).unwrap();
        let doses = db.doses(Area::Region(Region::Veneto));
        assert_eq!(doses.len(), 1);
        assert_eq!(doses[0].fornitore, "Novavax");
        assert_eq!(DoseType::First.count(doses[0]), 2.0);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        std::fs::remove_file(dir.path().join(POPULATION_FILE)).unwrap();

        let result = VaccinesDatabase::load(dir.path());
        assert!(matches!(result, Err(DataError::NotFound(ref p)) if p.ends_with(POPULATION_FILE)));
    }

    #[test]
    fn test_suppliers_sorted_distinct() {
        let names = ["Moderna", "Pfizer/BioNTech", "Moderna"];
        assert_eq!(
            suppliers(names.iter().copied()),
            vec!["Moderna", "Pfizer/BioNTech"]
        );
    }
}
