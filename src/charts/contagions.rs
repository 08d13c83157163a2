use super::{daily_axis_title, Chart, Row, Section, Trace, CONTAGIONS_SECTION_ID, PLOTLY_PALETTE};
use crate::data::contagions::{column, ContagionRecord, ContagionsDatabase};
use crate::data::{Area, Series};

type Field = fn(&ContagionRecord) -> Option<f64>;

const SEVERITY: [(&str, Field, usize); 3] = [
    ("isolamento_domiciliare", |r| r.isolamento_domiciliare, 0),
    ("ricoverati_con_sintomi", |r| r.ricoverati_con_sintomi, 2),
    ("terapia_intensiva", |r| r.terapia_intensiva, 1),
];

/// Contagion charts of one area.
pub fn contagions_section(db: &ContagionsDatabase, area: Area, window: usize) -> Section {
    let records = db.records(area);
    let col = |field: Field| column(&records, field);
    let smooth = |s: Series| s.rolling_mean(window, true);
    let daily = |field: Field| smooth(col(field).diff());
    let y_daily = daily_axis_title(window);

    let tests = Row::new(
        Some("Tamponi eseguiti"),
        Some(Chart::new(
            y_daily.clone(),
            vec![Trace::new(None, &daily(|r| r.tamponi))],
        )),
        Some(Chart::new(
            y_daily.clone(),
            vec![
                Trace::named("test_molecolare", &daily(|r| r.tamponi_test_molecolare)),
                Trace::named(
                    "test_antigenico_rapido",
                    &daily(|r| r.tamponi_test_antigenico_rapido),
                ),
            ],
        )),
    );

    // new positives are already daily, tests are cumulative
    let positivity = col(|r| r.nuovi_positivi)
        .ratio(&col(|r| r.tamponi).diff())
        .scale(100.0);
    let rapid_tests = col(|r| r.tamponi_test_antigenico_rapido).diff();
    let positivity_by = |field: Field| smooth(col(field).diff().ratio(&rapid_tests).scale(100.0));

    let positivity_row = Row::new(
        Some("Tasso di positività"),
        Some(Chart::new(
            y_daily.clone(),
            vec![Trace::new(None, &smooth(positivity))],
        )),
        Some(Chart::new(
            y_daily.clone(),
            vec![
                Trace::named(
                    "test_molecolare",
                    &positivity_by(|r| r.totale_positivi_test_molecolare),
                ),
                Trace::named(
                    "test_antigenico_rapido",
                    &positivity_by(|r| r.totale_positivi_test_antigenico_rapido),
                ),
            ],
        )),
    );

    let positives = Row::new(
        Some("Casi positivi"),
        Some(Chart::new(
            "valore assoluto",
            vec![Trace::new(None, &col(|r| r.totale_positivi))],
        )),
        None,
    );

    let total_positives = col(|r| r.totale_positivi);
    let severity_traces = |relative: bool| -> Vec<Trace> {
        SEVERITY
            .iter()
            .map(|(name, field, color)| {
                let values = col(*field);
                let values = if relative {
                    values.percent_of(&total_positives)
                } else {
                    values
                };
                Trace::named(name, &values).with_color(PLOTLY_PALETTE[*color])
            })
            .collect()
    };

    let severity = Row::new(
        Some("Casi positivi per gravità"),
        Some(Chart::new("attualmente positivi", severity_traces(false))),
        Some(Chart::new("valore relativo [%]", severity_traces(true))),
    );

    let outcomes = Row::new(
        Some("Dimessi guariti e deceduti"),
        Some(Chart::new(
            y_daily,
            vec![
                Trace::named("dimessi_guariti", &daily(|r| r.dimessi_guariti)),
                Trace::named("deceduti", &daily(|r| r.deceduti)),
            ],
        )),
        None,
    );

    Section::new(
        CONTAGIONS_SECTION_ID,
        "Contagi",
        vec![tests, positivity_row, positives, severity, outcomes],
    )
}
