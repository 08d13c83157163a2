//! HTTP handlers for dashboard routes

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use rust_embed::RustEmbed;
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;

use crate::api::{resolve_selection, ApiError, AppState, GENERIC_ERROR_MESSAGE};
use crate::charts::{Dashboard, Section};
use crate::content::ContentKind;
use crate::dashboard::types::Selection;
use crate::data::{Area, DatasetStatus};

/// Embedded dashboard assets from dashboard/ directory
#[derive(RustEmbed)]
#[folder = "dashboard/"]
struct DashboardAssets;

/// Data injected into the page for the chart scripts.
#[derive(Debug, Serialize)]
struct InitialData<'a> {
    dashboard: &'a Dashboard,
    datasets: DatasetStatus,
}

/// Serves the dashboard page for the selected area and window
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Selection>, QueryRejection>,
) -> Response {
    let selection = match query {
        Ok(Query(selection)) => selection,
        Err(rejection) => return ApiError::InvalidQuery(rejection.body_text()).into_response(),
    };
    let (area, window) = match resolve_selection(&selection, &state.config.dashboard) {
        Ok(resolved) => resolved,
        Err(e) => return e.into_response(),
    };

    match render_page(&state, area, window) {
        Ok(html) => {
            metrics::counter!("covidash_page_renders_total").increment(1);
            Html(html).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, area = %area, window, "Failed to render dashboard");
            error_page()
        }
    }
}

/// Serves static assets (CSS, JS, etc.)
pub async fn assets_handler(Path(path): Path<String>) -> Response {
    match DashboardAssets::get(&path) {
        Some(content) => {
            let body = content.data;
            let mime_type = mime_guess::from_path(&path).first_or_octet_stream();

            ([(header::CONTENT_TYPE, mime_type.as_ref())], body).into_response()
        }
        None => ApiError::NotFound(format!("Asset '{}'", path)).into_response(),
    }
}

fn render_page(state: &AppState, area: Area, window: usize) -> Result<String, ApiError> {
    let template = DashboardAssets::get("index.html")
        .ok_or_else(|| ApiError::Internal("dashboard template not found".to_string()))?;
    let template = std::str::from_utf8(&template.data)
        .map_err(|e| ApiError::Internal(format!("invalid template encoding: {}", e)))?;

    let snapshot = state.datasets.snapshot();
    let mut dashboard = (*state.datasets.dashboard(area, window)).clone();
    dashboard.attach_content(&state.content);

    let initial_data = serde_json::to_string(&InitialData {
        dashboard: &dashboard,
        datasets: snapshot.status(),
    })
    .map_err(|e| ApiError::Internal(format!("failed to serialize charts: {}", e)))?;

    let config = &state.config.dashboard;
    let content = &state.content;

    Ok(fill_template(template, |name| match name {
        "title" => Some(escape_html(&content.title())),
        "title_html" => Some(content.html(ContentKind::Title)),
        "introduction" => Some(content.html(ContentKind::Introduction)),
        "about" => Some(content.html(ContentKind::About)),
        "report_bug" => Some(content.html(ContentKind::ReportBug)),
        "area_options" => Some(area_options(area)),
        "area" => Some(escape_html(area.label())),
        "window" => Some(window.to_string()),
        "min_window" => Some(config.min_window.to_string()),
        "max_window" => Some(config.max_window.to_string()),
        "sections" => Some(render_sections(&dashboard.sections)),
        "initial_data" => Some(script_safe(&initial_data)),
        _ => None,
    }))
}

/// Replace every `{{name}}` in `template` in a single pass. Substituted text
/// is never scanned again; unknown names are left as they are.
fn fill_template(template: &str, value: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => match value(&after[..end]) {
                Some(v) => {
                    out.push_str(&v);
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str("{{");
                    rest = after;
                }
            },
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// `<option>` list of the area selector, regions first then "Italia".
fn area_options(selected: Area) -> String {
    let mut out = String::new();
    for label in Area::options() {
        let marker = if label == selected.label() {
            " selected"
        } else {
            ""
        };
        let label = escape_html(label);
        let _ = writeln!(out, r#"<option value="{label}"{marker}>{label}</option>"#);
    }
    out
}

/// Section skeletons; the chart scripts draw into the `chart-*` containers.
fn render_sections(sections: &[Section]) -> String {
    let mut out = String::new();
    for section in sections {
        let _ = writeln!(
            out,
            r#"<section class="data-section" id="{}">"#,
            escape_html(&section.id)
        );
        let _ = writeln!(out, "<h2>{}</h2>", escape_html(&section.title));
        if let Some(html) = &section.markdown_html {
            let _ = writeln!(out, r#"<div class="markdown">{}</div>"#, html);
        }
        if let Some(notice) = &section.notice {
            let _ = writeln!(out, r#"<p class="notice">{}</p>"#, escape_html(notice));
        }

        for (r, row) in section.rows.iter().enumerate() {
            out.push_str("<div class=\"chart-row\">\n");
            if let Some(title) = &row.title {
                let _ = writeln!(out, "<h3>{}</h3>", escape_html(title));
            }
            out.push_str("<div class=\"chart-columns\">\n");
            for (c, chart) in row.columns.iter().enumerate() {
                if chart.is_some() {
                    let _ = writeln!(
                        out,
                        r#"<div class="chart" id="chart-{}-{}-{}"></div>"#,
                        escape_html(&section.id),
                        r,
                        c
                    );
                } else {
                    out.push_str("<div class=\"chart chart-empty\"></div>\n");
                }
            }
            out.push_str("</div>\n</div>\n");
        }
        out.push_str("</section>\n");
    }
    out
}

fn error_page() -> Response {
    let html = format!(
        "<!DOCTYPE html>\n<html lang=\"it\">\n<head><meta charset=\"utf-8\"><title>Errore</title></head>\n<body><p>{}</p></body>\n</html>\n",
        GENERIC_ERROR_MESSAGE
    );
    (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON embedded in a `<script>` element must not close it.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CovidashConfig;
    use crate::content::ContentStore;
    use crate::data::{Datasets, Region};
    use crate::refresh::SharedDatasets;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(
            Arc::new(CovidashConfig::default()),
            Arc::new(ContentStore::builtin()),
            Arc::new(SharedDatasets::new(Datasets::empty())),
        ))
    }

    fn query(area: Option<&str>, window: Option<&str>) -> Result<Query<Selection>, QueryRejection> {
        Ok(Query(Selection {
            area: area.map(str::to_string),
            window: window.map(str::to_string),
        }))
    }

    async fn body_text(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Emilia & Romagna</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Emilia &amp; Romagna&lt;/a&gt;"
        );
    }

    #[test]
    fn test_script_safe() {
        assert_eq!(script_safe(r#"{"x":"</script>"}"#), r#"{"x":"<\/script>"}"#);
    }

    #[test]
    fn test_fill_template_single_pass() {
        let filled = fill_template("<p>{{a}}</p>{{b}} {{x}} {{", |name| match name {
            "a" => Some("{{b}}".to_string()),
            "b" => Some("B".to_string()),
            _ => None,
        });
        assert_eq!(filled, "<p>{{b}}</p>B {{x}} {{");
    }

    #[tokio::test]
    async fn test_content_placeholders_are_not_expanded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("introduction.md"),
            "Usa {{window}} giorni e {{area}}",
        )
        .unwrap();
        let content = ContentStore::load(dir.path(), crate::content::ReadMode::Ignore).unwrap();
        let state = Arc::new(AppState::new(
            Arc::new(CovidashConfig::default()),
            Arc::new(content),
            Arc::new(SharedDatasets::new(Datasets::empty())),
        ));

        let response = dashboard_handler(State(state), query(None, Some("14"))).await;
        let html = body_text(response).await;
        assert!(html.contains("<p>Usa {{window}} giorni e {{area}}</p>"), "{}", html);
        assert!(html.contains(r#"value="14""#));
    }

    #[test]
    fn test_area_options_mark_selection() {
        let html = area_options(Area::Region(Region::Lombardia));
        assert!(html.contains(r#"<option value="Lombardia" selected>Lombardia</option>"#));
        assert!(html.contains(r#"<option value="Italia">Italia</option>"#));
        assert_eq!(html.matches(" selected").count(), 1);
    }

    #[test]
    fn test_render_sections_without_data() {
        let dashboard = crate::charts::build_dashboard(&Datasets::empty(), Area::Italy, 7);
        let html = render_sections(&dashboard.sections);
        assert!(html.contains(r#"id="contagi""#));
        assert!(html.contains(r#"id="vaccinazioni""#));
        assert!(html.contains(r#"class="notice""#));
        assert!(!html.contains("chart-contagi"));
    }

    #[tokio::test]
    async fn test_dashboard_handler_returns_page() {
        let response = dashboard_handler(State(test_state()), query(None, None)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .expect("should have content-type header")
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.contains("text/html"));

        let html = body_text(response).await;
        assert!(html.contains(r#"id="area""#));
        assert!(html.contains(r#"id="media-mobile""#));
        assert!(html.contains(r#"<script id="initial-data" type="application/json">"#));
        assert!(html.contains("Covid-19 in Italia"));
        assert!(!html.contains("{{"), "every placeholder should be replaced");
    }

    #[tokio::test]
    async fn test_dashboard_handler_keeps_selection() {
        let response =
            dashboard_handler(State(test_state()), query(Some("Sardegna"), Some("14"))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains(r#"<option value="Sardegna" selected>"#));
        assert!(html.contains(r#"value="14""#));
    }

    #[tokio::test]
    async fn test_dashboard_handler_rejects_unknown_area() {
        let response = dashboard_handler(State(test_state()), query(Some("Atlantide"), None)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_text(response).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"]["code"], "unknown_area");
    }

    #[tokio::test]
    async fn test_dashboard_handler_rejects_bad_window() {
        let response = dashboard_handler(State(test_state()), query(None, Some("45"))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assets_handler_not_found() {
        let response = assets_handler(Path("nonexistent.js".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_assets_handler_serves_css() {
        let response = assets_handler(Path("styles.css".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let ct = response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(ct.contains("css"), "Expected CSS content type, got: {}", ct);
    }

    #[tokio::test]
    async fn test_assets_handler_serves_js() {
        let response = assets_handler(Path("dashboard.js".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let ct = response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(ct.contains("javascript"), "Expected JS content type, got: {}", ct);
    }

    #[test]
    fn test_error_page_is_generic() {
        let response = error_page();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
