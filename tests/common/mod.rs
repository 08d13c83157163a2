//! Shared test utilities for covidash integration tests.
//!
//! Writes small contagion and vaccination datasets in the published file
//! layout and builds routers over them.

#![allow(dead_code)]

use chrono::NaiveDate;
use covidash::api::{create_router, AppState};
use covidash::config::{CovidashConfig, DataConfig};
use covidash::content::ContentStore;
use covidash::data::contagions::{daily_file_name, NATIONAL_DIR, REGIONAL_DIR};
use covidash::data::vaccines::{
    BOOSTER_POPULATION_FILE, DELIVERIES_FILE, DOSES_FILE, LAST_UPDATE_FILE, POPULATION_FILE,
};
use covidash::data::Datasets;
use covidash::refresh::SharedDatasets;
use std::path::Path;
use std::sync::Arc;

pub const NATIONAL_HEADER: &str = "data,stato,ricoverati_con_sintomi,terapia_intensiva,totale_ospedalizzati,isolamento_domiciliare,totale_positivi,nuovi_positivi,dimessi_guariti,deceduti,tamponi,tamponi_test_molecolare,tamponi_test_antigenico_rapido,totale_positivi_test_molecolare,totale_positivi_test_antigenico_rapido";

pub const REGIONAL_HEADER: &str = "data,stato,codice_regione,denominazione_regione,ricoverati_con_sintomi,terapia_intensiva,totale_ospedalizzati,isolamento_domiciliare,totale_positivi,nuovi_positivi,dimessi_guariti,deceduti,tamponi,tamponi_test_molecolare,tamponi_test_antigenico_rapido,totale_positivi_test_molecolare,totale_positivi_test_antigenico_rapido";

pub const DOSES_CSV: &str = "data,forn,area,eta,m,f,d1,d2,dpi,db1\n\
2021-01-01,Pfizer/BioNTech,LOM,80-89,10,12,22,0,0,0\n\
2021-01-01,Moderna,LAZ,90+,4,6,10,0,0,0\n\
2021-01-02,Pfizer/BioNTech,LOM,20-29,8,8,10,6,0,0\n\
2021-01-03,Moderna,LAZ,30-39,5,5,4,4,2,0\n";

pub const DELIVERIES_CSV: &str = "area,forn,numero_dosi,data\n\
LOM,Pfizer/BioNTech,500,2020-12-30\n\
LAZ,Moderna,200,2020-12-31\n";

pub const POPULATION_CSV: &str = "area,nome_area,eta,totale_popolazione\n\
LOM,Lombardia,20-29,1000\n\
LOM,Lombardia,80-89,300\n\
LAZ,Lazio,30-39,800\n\
LAZ,Lazio,90+,100\n";

pub const BOOSTER_POPULATION_CSV: &str = "area,nome_area,categoria_prevalente,totale_popolazione\n\
LOM,Lombardia,Over 80,400\n";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// National report line for day `i` of a steadily growing epidemic.
pub fn national_line(day: NaiveDate, i: u32) -> String {
    let i = f64::from(i);
    format!(
        "{}T17:00:00,ITA,{},{},{},{},{},{},{},{},{},{},{},{},{}",
        day,
        100.0 + i,
        10.0 + i,
        110.0 + 2.0 * i,
        500.0 + 10.0 * i,
        610.0 + 12.0 * i,
        50.0 + i,
        20.0 * i,
        2.0 * i,
        1000.0 * (i + 1.0),
        600.0 * (i + 1.0),
        400.0 * (i + 1.0),
        40.0 * (i + 1.0),
        10.0 * (i + 1.0),
    )
}

/// Regional report lines (Lombardia and Lazio) for day `i`.
pub fn regional_lines(day: NaiveDate, i: u32) -> String {
    let i = f64::from(i);
    [(3, "Lombardia", 1.0), (12, "Lazio", 0.5)]
        .iter()
        .map(|(code, name, k)| {
            format!(
                "{}T17:00:00,ITA,{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
                day,
                code,
                name,
                k * (50.0 + i),
                k * (5.0 + i),
                k * (55.0 + 2.0 * i),
                k * (200.0 + 5.0 * i),
                k * (255.0 + 7.0 * i),
                k * (20.0 + i),
                k * 10.0 * i,
                k * i,
                k * 400.0 * (i + 1.0),
                k * 250.0 * (i + 1.0),
                k * 150.0 * (i + 1.0),
                k * 15.0 * (i + 1.0),
                k * 5.0 * (i + 1.0),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `days` daily reports starting at `start` under `dir`.
pub fn write_contagions(dir: &Path, start: NaiveDate, days: u32) {
    std::fs::create_dir_all(dir.join(NATIONAL_DIR)).unwrap();
    std::fs::create_dir_all(dir.join(REGIONAL_DIR)).unwrap();

    for (i, day) in start.iter_days().take(days as usize).enumerate() {
        let i = i as u32;
        std::fs::write(
            dir.join(NATIONAL_DIR).join(daily_file_name(NATIONAL_DIR, day)),
            format!("{}\n{}\n", NATIONAL_HEADER, national_line(day, i)),
        )
        .unwrap();
        std::fs::write(
            dir.join(REGIONAL_DIR).join(daily_file_name(REGIONAL_DIR, day)),
            format!("{}\n{}\n", REGIONAL_HEADER, regional_lines(day, i)),
        )
        .unwrap();
    }
}

/// Write the four vaccination tables and their timestamp under `dir`.
pub fn write_vaccinations(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(DOSES_FILE), DOSES_CSV).unwrap();
    std::fs::write(dir.join(DELIVERIES_FILE), DELIVERIES_CSV).unwrap();
    std::fs::write(dir.join(POPULATION_FILE), POPULATION_CSV).unwrap();
    std::fs::write(dir.join(BOOSTER_POPULATION_FILE), BOOSTER_POPULATION_CSV).unwrap();
    std::fs::write(
        dir.join(LAST_UPDATE_FILE),
        r#"{"ultimo_aggiornamento":"2021-01-04T05:10:37.000Z"}"#,
    )
    .unwrap();
}

/// Data directory with two weeks of contagion reports and the vaccination tables.
pub fn fixture_data_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let data = data_config(dir.path());
    write_contagions(&data.contagions_dir(), date(2021, 1, 1), 14);
    write_vaccinations(&data.vaccinations_dir());
    dir
}

pub fn data_config(dir: &Path) -> DataConfig {
    DataConfig {
        dir: dir.to_path_buf(),
        ..DataConfig::default()
    }
}

pub fn load_fixture_datasets(dir: &Path) -> Datasets {
    let data = data_config(dir);
    Datasets::load(&data.contagions_dir(), &data.vaccinations_dir())
}

pub fn create_test_state(datasets: Datasets) -> Arc<AppState> {
    Arc::new(AppState::new(
        Arc::new(CovidashConfig::default()),
        Arc::new(ContentStore::builtin()),
        Arc::new(SharedDatasets::new(datasets)),
    ))
}

pub fn create_test_router(datasets: Datasets) -> axum::Router {
    create_router(create_test_state(datasets))
}

pub async fn body_string(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}
