// Load configuration
// Set up logging
// Build the node client and scan engine
// Start the scan polling task
// Start HTTP server

use large_transfer_watch::{
    blockchain::{start_polling, PollSchedule, SolanaClient},
    config::Config,
    create_router,
    scanner::{EngineSettings, ScanEngine, ScanRequest},
    state::AppState,
};

use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting large-transfer-watch");

    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);

    let client = Arc::new(SolanaClient::new(&config)?);
    let engine = Arc::new(ScanEngine::new(client, EngineSettings::from_config(&config)));

    let (publisher, latest) = watch::channel(None);
    let shutdown = CancellationToken::new();

    let request = ScanRequest::new(
        config.scan_mode,
        config.large_transfer_threshold,
        config.scan_limit,
    );
    let polling_handle = tokio::spawn(start_polling(
        engine.clone(),
        request,
        PollSchedule::from_config(&config),
        publisher,
        shutdown.clone(),
    ));
    info!("Scan polling task started");

    let app_state = Arc::new(AppState {
        config: config.clone(),
        engine,
        latest,
    });
    let app = create_router(app_state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            server_shutdown.cancel();
        })
        .await?;

    if let Err(e) = polling_handle.await {
        error!("Scan polling task failed: {}", e);
    }
    info!("Stopped");

    Ok(())
}
