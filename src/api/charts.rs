//! Chart and area endpoints.

use super::{ApiError, AppState};
use crate::config::DashboardConfig;
use crate::dashboard::types::Selection;
use crate::data::Area;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

/// Resolve the query string into an area and a window, applying defaults.
pub fn resolve_selection(
    selection: &Selection,
    config: &DashboardConfig,
) -> Result<(Area, usize), ApiError> {
    let area_label = selection
        .area
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(&config.default_area);
    let area =
        Area::parse(area_label).map_err(|_| ApiError::UnknownArea(area_label.to_string()))?;

    let window = match selection.window.as_deref().map(str::trim) {
        None | Some("") => config.default_window,
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|w| (config.min_window..=config.max_window).contains(w))
            .ok_or_else(|| ApiError::InvalidWindow {
                value: raw.to_string(),
                min: config.min_window,
                max: config.max_window,
            })?,
    };

    Ok((area, window))
}

/// GET /api/charts - Chart sections for one selection.
pub async fn charts_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Selection>, QueryRejection>,
) -> Result<Json<crate::charts::Dashboard>, ApiError> {
    let Query(selection) = query.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    let (area, window) = resolve_selection(&selection, &state.config.dashboard)?;
    tracing::debug!(area = %area, window, "Serving charts");

    let mut dashboard = (*state.datasets.dashboard(area, window)).clone();
    dashboard.attach_content(&state.content);
    Ok(Json(dashboard))
}

/// Response of GET /api/areas.
#[derive(Debug, Serialize)]
pub struct AreasResponse {
    pub default: String,
    pub areas: Vec<&'static str>,
}

/// GET /api/areas - Selectable areas, regions first then "Italia".
pub async fn areas_handler(State(state): State<Arc<AppState>>) -> Json<AreasResponse> {
    Json(AreasResponse {
        default: state.config.dashboard.default_area.clone(),
        areas: Area::options(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Region;

    fn selection(area: Option<&str>, window: Option<&str>) -> Selection {
        Selection {
            area: area.map(str::to_string),
            window: window.map(str::to_string),
        }
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        let (area, window) = resolve_selection(&Selection::default(), &config).unwrap();
        assert_eq!(area, Area::Italy);
        assert_eq!(window, 7);
    }

    #[test]
    fn test_region_and_window() {
        let config = DashboardConfig::default();
        let (area, window) =
            resolve_selection(&selection(Some("P.A. Trento"), Some("14")), &config).unwrap();
        assert_eq!(area, Area::Region(Region::Trento));
        assert_eq!(window, 14);
    }

    #[test]
    fn test_window_bounds() {
        let config = DashboardConfig::default();
        assert!(resolve_selection(&selection(None, Some("1")), &config).is_ok());
        assert!(resolve_selection(&selection(None, Some("30")), &config).is_ok());
        for bad in ["0", "31", "-3", "sette"] {
            assert!(matches!(
                resolve_selection(&selection(None, Some(bad)), &config),
                Err(ApiError::InvalidWindow { .. })
            ));
        }
    }

    #[test]
    fn test_unknown_area() {
        let config = DashboardConfig::default();
        assert!(matches!(
            resolve_selection(&selection(Some("Atlantide"), None), &config),
            Err(ApiError::UnknownArea(name)) if name == "Atlantide"
        ));
    }
}
