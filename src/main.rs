use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use home_monitor::common::AppState;
use home_monitor::config::{Config, Deployment};
use home_monitor::pipeline::IngestError;
use home_monitor::routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (fail-fast)
    let config = Config::from_env()?;
    init_tracing(&config.deployment);

    tracing::info!("Starting home-monitor...");
    tracing::info!(
        deployment = ?config.deployment,
        host = %config.api_host,
        port = config.api_port,
        data_path = %config.data_path.display(),
        cache_ttl_seconds = config.cache_ttl_seconds,
        "Configuration loaded"
    );

    let state = AppState::new(config.clone());

    // Warm the cache with the configured file. A missing or invalid file is
    // not fatal: clients can still upload their own data.
    match routes::cache::load_dataset(&state, &state.default_source()).await {
        Ok(dataset) => {
            let summary = dataset.summary();
            tracing::info!(
                rows_loaded = summary.rows_loaded,
                rows_dropped = summary.rows_dropped,
                first_date = ?summary.first_date,
                last_date = ?summary.last_date,
                rooms = summary.rooms.len(),
                "Dataset loaded"
            );
        }
        Err(e) if matches!(e.as_ingest(), Some(IngestError::SourceNotFound(_))) => {
            tracing::warn!(
                path = %config.data_path.display(),
                "Dataset file not found, waiting for uploads"
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "Dataset file could not be loaded, waiting for uploads");
        }
    }

    // Build router
    let app = routes::build_router(state);

    // Start server with graceful shutdown
    let addr = config.bind_address();
    tracing::info!(address = %addr, "Starting server");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Plain text logs locally, JSON lines once deployed.
fn init_tracing(deployment: &Deployment) {
    let json = matches!(deployment, Deployment::Stage | Deployment::Prod);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,home_monitor=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
