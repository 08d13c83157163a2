//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::{load_config, ServeArgs};
use crate::config::CovidashConfig;
use crate::content::ContentStore;
use crate::refresh::{load_datasets, DataRefresher, SharedDatasets};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<CovidashConfig, Box<dyn std::error::Error>> {
    let mut config = load_config(&args.config)?;

    // CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if let Some(ref dir) = args.data_dir {
        config.data.dir = dir.clone();
    }
    if args.no_refresh {
        config.refresh.enabled = false;
    }

    Ok(config)
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and merge configuration
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    // 2. Initialize tracing
    crate::logging::init_tracing(&config.logging)?;

    tracing::info!("Starting covidash");
    tracing::debug!(?config, "Loaded configuration");

    // 3. Page content is read once per process
    let content = ContentStore::load(
        &config.dashboard.content_dir,
        config.dashboard.content_errors,
    )?;

    // 4. Serve whatever is already on disk while the first refresh runs
    let datasets = Arc::new(SharedDatasets::new(load_datasets(&config.data).await));
    let status = datasets.snapshot().status();
    tracing::info!(
        contagions = status.contagions_loaded,
        vaccinations = status.vaccinations_loaded,
        "Loaded local datasets"
    );

    let config = Arc::new(config);
    let app_state = Arc::new(AppState::new(
        Arc::clone(&config),
        Arc::new(content),
        Arc::clone(&datasets),
    ));
    let app = create_router(Arc::clone(&app_state));

    // 5. Start the data refresher (if enabled) with broadcast sender
    let cancel_token = CancellationToken::new();
    let refresh_handle = if config.refresh.enabled {
        tracing::info!("Starting data refresher");
        let refresher = DataRefresher::new(
            config.data.clone(),
            config.refresh.clone(),
            Arc::clone(&datasets),
        )?
        .with_broadcast(app_state.ws_broadcast.clone());
        Some(refresher.start(cancel_token.clone()))
    } else {
        tracing::info!("Data refresh disabled");
        None
    };

    // 6. Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %addr, "Dashboard listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    // 7. Cleanup
    if let Some(handle) = refresh_handle {
        tracing::info!("Waiting for data refresher to stop");
        handle.await?;
    }

    tracing::info!("covidash stopped");
    Ok(())
}
