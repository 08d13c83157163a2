use super::{daily_axis_title, Chart, Row, Section, Trace, VACCINES_SECTION_ID};
use crate::data::vaccines::{daily_deliveries, daily_doses, suppliers, DeliveryRecord};
use crate::data::{Area, DoseRecord, DoseType, VaccinesDatabase};

const DELIVERIES: &str = "consegne";
const DOSES: &str = "somministrazioni";
const GENDERS: [(&str, fn(&DoseRecord) -> f64); 2] = [
    ("sesso_maschile", |d| d.sesso_maschile),
    ("sesso_femminile", |d| d.sesso_femminile),
];

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Vaccination charts of one area. Per-capita progress is relative to the
/// national target population.
pub fn vaccines_section(db: &VaccinesDatabase, area: Area, window: usize) -> Section {
    let doses = db.doses(area);
    let deliveries = db.deliveries(area);
    let y_daily = daily_axis_title(window);

    let bands = db.age_bands(area);

    let doses_where = |keep: &dyn Fn(&DoseRecord) -> bool| {
        doses
            .iter()
            .copied()
            .filter(|d| keep(*d))
            .collect::<Vec<_>>()
    };

    let totals = Row::new(
        Some("Consegne e somministrazioni"),
        Some(Chart::new(
            "valore cumulativo",
            vec![
                Trace::named(DELIVERIES, &daily_deliveries(&deliveries).cumsum()),
                Trace::named(DOSES, &daily_doses(&doses, DoseRecord::total).cumsum()),
            ],
        )),
        None,
    );

    let delivery_traces = suppliers(deliveries.iter().map(|d| d.fornitore.as_str()))
        .into_iter()
        .map(|supplier| {
            let rows: Vec<&DeliveryRecord> = deliveries
                .iter()
                .copied()
                .filter(|d| d.fornitore == supplier)
                .collect();
            Trace::named(&supplier, &daily_deliveries(&rows).rolling_mean(window, true))
        })
        .collect();
    let dose_traces = suppliers(doses.iter().map(|d| d.fornitore.as_str()))
        .into_iter()
        .map(|supplier| {
            let rows = doses_where(&|d| d.fornitore == supplier);
            Trace::named(
                &supplier,
                &daily_doses(&rows, DoseRecord::total).rolling_mean(window, true),
            )
        })
        .collect();

    let by_supplier = Row::new(
        Some("Fornitori"),
        Some(Chart::new(y_daily.clone(), delivery_traces).titled(&capitalize(DELIVERIES))),
        Some(Chart::new(y_daily.clone(), dose_traces).titled(&capitalize(DOSES))),
    );

    let age_traces = bands
        .iter()
        .map(|band| {
            let rows = doses_where(&|d| &d.fascia_anagrafica == band);
            Trace::named(
                band,
                &daily_doses(&rows, DoseRecord::total).rolling_mean(window, true),
            )
        })
        .collect();
    let gender_traces = GENDERS
        .iter()
        .map(|(name, value)| {
            Trace::named(name, &daily_doses(&doses, value).rolling_mean(window, true))
        })
        .collect();
    let type_traces = DoseType::ALL
        .iter()
        .map(|t| {
            Trace::named(
                t.column(),
                &daily_doses(&doses, |d| t.count(d)).rolling_mean(window, true),
            )
        })
        .collect();

    let detail = Row::new(
        Some("Dettaglio somministrazioni"),
        Some(Chart::new(y_daily.clone(), age_traces).titled("Età")),
        Some(Chart::new(y_daily.clone(), gender_traces).titled("Genere")),
    );
    let detail_by_type = Row::new(
        None,
        Some(Chart::new(y_daily, type_traces).titled("Tipologia")),
        None,
    );

    let progress_by_age = bands
        .iter()
        .map(|band| {
            let rows = doses_where(&|d| &d.fascia_anagrafica == band);
            let progress = daily_doses(&rows, DoseRecord::total)
                .cumsum()
                .per(db.population_of_band(band));
            Trace::named(band, &progress)
        })
        .collect();
    let total_population = db.total_population();
    let progress_by_type = DoseType::ALL
        .iter()
        .map(|t| {
            let progress = daily_doses(&doses, |d| t.count(d))
                .cumsum()
                .per(total_population);
            Trace::named(t.column(), &progress)
        })
        .collect();

    let progress = Row::new(
        Some("Progresso somministrazioni"),
        Some(Chart::new("valore pro capite", progress_by_age).titled("Età")),
        Some(Chart::new("valore pro capite", progress_by_type).titled("Tipologia")),
    );

    Section::new(
        VACCINES_SECTION_ID,
        "Vaccinazioni",
        vec![totals, by_supplier, detail, detail_by_type, progress],
    )
}
