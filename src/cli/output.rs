//! Output formatting helpers for CLI commands

use crate::data::Area;
use crate::fetch::{Dataset, UpdateReport};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use serde_json::json;

/// View model for area display
#[derive(Debug, Clone, Serialize)]
pub struct AreaView {
    pub label: &'static str,
    /// Code used by the vaccination files, absent for the national total
    pub code: Option<&'static str>,
}

impl From<Area> for AreaView {
    fn from(area: Area) -> Self {
        Self {
            label: area.label(),
            code: area.region().map(|r| r.code()),
        }
    }
}

/// View model for one dataset update
#[derive(Debug, Clone, Serialize)]
pub struct UpdateView {
    pub dataset: Dataset,
    #[serde(flatten)]
    pub report: UpdateReport,
}

/// Format areas as a table
pub fn format_areas_table(areas: &[AreaView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Area", "Code"]);

    for a in areas {
        table.add_row(vec![Cell::new(a.label), Cell::new(a.code.unwrap_or("-"))]);
    }

    table.to_string()
}

/// Format areas as JSON
pub fn format_areas_json(areas: &[AreaView]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "areas": areas }))
}

/// Format update reports as a table
pub fn format_updates_table(updates: &[UpdateView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Dataset", "Downloaded", "Skipped", "Not yet published"]);

    for u in updates {
        let downloaded = if u.report.downloaded > 0 {
            u.report.downloaded.to_string().green().to_string()
        } else {
            u.report.downloaded.to_string()
        };
        let missing = if u.report.missing.is_empty() {
            "-".to_string()
        } else {
            u.report.missing.join(", ").yellow().to_string()
        };

        table.add_row(vec![
            Cell::new(u.dataset),
            Cell::new(downloaded),
            Cell::new(u.report.skipped),
            Cell::new(missing),
        ]);
    }

    table.to_string()
}

/// Format update reports as JSON
pub fn format_updates_json(updates: &[UpdateView]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "updates": updates }))
}
