//! Chart sections of the dashboard page.
//!
//! Charts are plain data (title, axis titles, traces) serialized to JSON and
//! drawn by Plotly in the browser.

mod contagions;
mod vaccines;

pub use contagions::contagions_section;
pub use vaccines::vaccines_section;

use crate::content::{ContentKind, ContentStore};
use crate::data::{Area, Datasets, Series};
use chrono::NaiveDate;
use serde::Serialize;

/// Plotly's default qualitative palette.
pub const PLOTLY_PALETTE: [&str; 10] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

pub const CONTAGIONS_SECTION_ID: &str = "contagi";
pub const VACCINES_SECTION_ID: &str = "vaccinazioni";

/// Shown in place of the charts of a dataset not downloaded yet.
pub const UNAVAILABLE_NOTICE: &str =
    "Dati non ancora disponibili: il download è in corso, riprova tra qualche minuto.";

const X_TITLE: &str = "data";

/// Y axis title of charts smoothed with a moving average of `window` days.
pub fn daily_axis_title(window: usize) -> String {
    if window > 1 {
        format!("valore giornaliero (media mobile a {window} giorni)")
    } else {
        "valore giornaliero".to_string()
    }
}

/// One line of a chart. NaN points are dropped.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Trace {
    pub name: Option<String>,
    pub color: Option<String>,
    pub x: Vec<NaiveDate>,
    pub y: Vec<f64>,
}

impl Trace {
    pub fn new(name: Option<&str>, series: &Series) -> Self {
        let (x, y): (Vec<NaiveDate>, Vec<f64>) = series
            .iter()
            .filter(|(_, v)| !v.is_nan())
            .map(|(d, v)| (*d, *v))
            .unzip();
        Self {
            name: name.map(str::to_string),
            color: None,
            x,
            y,
        }
    }

    pub fn named(name: &str, series: &Series) -> Self {
        Self::new(Some(name), series)
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Chart {
    pub title: Option<String>,
    pub x_title: String,
    pub y_title: String,
    pub traces: Vec<Trace>,
}

impl Chart {
    pub fn new(y_title: impl Into<String>, traces: Vec<Trace>) -> Self {
        Self {
            title: None,
            x_title: X_TITLE.to_string(),
            y_title: y_title.into(),
            traces,
        }
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

/// Two side-by-side columns; an empty column is `None`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Row {
    pub title: Option<String>,
    pub columns: [Option<Chart>; 2],
}

impl Row {
    pub fn new(title: Option<&str>, left: Option<Chart>, right: Option<Chart>) -> Self {
        Self {
            title: title.map(str::to_string),
            columns: [left, right],
        }
    }

    pub fn charts(&self) -> impl Iterator<Item = &Chart> {
        self.columns.iter().flatten()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub markdown_html: Option<String>,
    pub notice: Option<String>,
    pub rows: Vec<Row>,
}

impl Section {
    fn new(id: &str, title: &str, rows: Vec<Row>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            markdown_html: None,
            notice: None,
            rows,
        }
    }

    fn unavailable(id: &str, title: &str) -> Self {
        Self {
            notice: Some(UNAVAILABLE_NOTICE.to_string()),
            ..Self::new(id, title, Vec::new())
        }
    }

    /// Row with the given title, if any.
    pub fn row(&self, title: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.title.as_deref() == Some(title))
    }
}

/// Every chart of the page for one selection.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Dashboard {
    pub area: Area,
    pub window: usize,
    pub sections: Vec<Section>,
}

impl Dashboard {
    /// Fill in the markdown description of each section.
    pub fn attach_content(&mut self, content: &ContentStore) {
        for section in &mut self.sections {
            let kind = match section.id.as_str() {
                CONTAGIONS_SECTION_ID => ContentKind::Contagions,
                VACCINES_SECTION_ID => ContentKind::Vaccines,
                _ => continue,
            };
            let html = content.html(kind);
            section.markdown_html = (!html.is_empty()).then_some(html);
        }
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}

/// Build the contagion and vaccination sections for `area`, smoothing daily
/// values with a centred moving average of `window` days.
pub fn build_dashboard(datasets: &Datasets, area: Area, window: usize) -> Dashboard {
    let contagions = match &datasets.contagions {
        Some(db) => contagions_section(db, area, window),
        None => Section::unavailable(CONTAGIONS_SECTION_ID, "Contagi"),
    };
    let vaccines = match &datasets.vaccines {
        Some(db) => vaccines_section(db, area, window),
        None => Section::unavailable(VACCINES_SECTION_ID, "Vaccinazioni"),
    };

    tracing::debug!(area = %area, window, "Built dashboard charts");

    Dashboard {
        area,
        window,
        sections: vec![contagions, vaccines],
    }
}
