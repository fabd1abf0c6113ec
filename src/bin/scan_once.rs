//! Manual check against the configured RPC endpoint: one scan in each mode,
//! then a summary of the first watched wallet.

use large_transfer_watch::{
    blockchain::SolanaClient,
    config::Config,
    models::ScanMode,
    scanner::{EngineSettings, ScanEngine, ScanRequest},
};
use std::sync::Arc;
use tracing::{info, warn, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let config = Config::from_env();
    let client = Arc::new(SolanaClient::new(&config)?);
    let engine = ScanEngine::new(client, EngineSettings::from_config(&config));

    for mode in [ScanMode::RecentBlock, ScanMode::WatchList] {
        let request = ScanRequest::new(mode, config.large_transfer_threshold, config.scan_limit)
            .with_deadline(config.scan_deadline);

        info!("Running {} scan over {} SOL...", mode, request.threshold);
        let report = engine.scan(&request).await;
        info!("{} scan: {} events, hint {:?}", mode, report.events.len(), report.hint);
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match engine.settings().watch_list.first() {
        Some(address) => match engine.summarize(address).await {
            Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
            None => warn!("Stats unavailable for {}", address),
        },
        None => warn!("Watch-list is empty, skipping wallet summary"),
    }

    Ok(())
}
