//! # Dashboard HTTP API
//!
//! Router and shared state of the dashboard service.
//!
//! ## Endpoints
//!
//! - `GET /` - Dashboard page (`?area=<label>&window=<days>`)
//! - `GET /api/charts` - Chart sections as JSON, same query string
//! - `GET /api/areas` - Selectable areas
//! - `GET /assets/*path` - Embedded CSS and JavaScript
//! - `GET /ws` - Data refresh notifications
//! - `GET /health` - Service and dataset status
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Example
//!
//! ```no_run
//! use covidash::api::{create_router, AppState};
//! use covidash::config::CovidashConfig;
//! use covidash::content::ContentStore;
//! use covidash::data::Datasets;
//! use covidash::refresh::SharedDatasets;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(CovidashConfig::default());
//! let content = Arc::new(ContentStore::builtin());
//! let datasets = Arc::new(SharedDatasets::new(Datasets::empty()));
//!
//! let state = Arc::new(AppState::new(config, content, datasets));
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8501").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod charts;
mod error;
mod health;

pub use charts::{resolve_selection, AreasResponse};
pub use error::{ApiError, ApiErrorBody, ApiErrorResponse, GENERIC_ERROR_MESSAGE};
pub use health::{health_status, HealthResponse};

use crate::config::CovidashConfig;
use crate::content::ContentStore;
use crate::dashboard::types::WebSocketUpdate;
use crate::metrics::MetricsCollector;
use crate::refresh::SharedDatasets;
use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Capacity of the WebSocket broadcast channel.
const BROADCAST_CAPACITY: usize = 64;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<CovidashConfig>,
    /// Markdown resources, read once at startup
    pub content: Arc<ContentStore>,
    /// Current dataset snapshot and chart cache
    pub datasets: Arc<SharedDatasets>,
    /// Sender for dashboard WebSocket updates
    pub ws_broadcast: broadcast::Sender<WebSocketUpdate>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    /// Metrics collector for observability
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    pub fn new(
        config: Arc<CovidashConfig>,
        content: Arc<ContentStore>,
        datasets: Arc<SharedDatasets>,
    ) -> Self {
        let start_time = Instant::now();
        let (ws_broadcast, _) = broadcast::channel(BROADCAST_CAPACITY);

        let metrics_collector = Arc::new(MetricsCollector::new(
            Arc::clone(&datasets),
            start_time,
            crate::metrics::metrics_handle(),
        ));

        Self {
            config,
            content,
            datasets,
            ws_broadcast,
            start_time,
            metrics_collector,
        }
    }
}

/// Create the router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .route("/", get(crate::dashboard::dashboard_handler))
        .route("/assets/*path", get(crate::dashboard::assets_handler))
        .route("/ws", get(crate::dashboard::websocket_handler))
        .route("/api/charts", get(charts::charts_handler))
        .route("/api/areas", get(charts::areas_handler))
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
