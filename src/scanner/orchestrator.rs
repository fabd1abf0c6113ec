use crate::analytics;
use crate::blockchain::client::NodeClient;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::models::{ActivityEntry, ScanMode, ScanReport, WalletSummary};
use crate::scanner::block::scan_recent_block;
use crate::scanner::watch_list::{scan_watched_addresses, WatchLimits};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub mode: ScanMode,
    /// Minimum transfer size in SOL.
    pub threshold: f64,
    /// Maximum number of events returned.
    pub limit: usize,
    /// Overall time budget. When it runs out the scan returns what it has.
    pub deadline: Option<Duration>,
}

impl ScanRequest {
    pub fn new(mode: ScanMode, threshold: f64, limit: usize) -> Self {
        Self {
            mode,
            threshold,
            limit,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub watch_list: Vec<String>,
    pub per_address_limit: usize,
    pub fetch_concurrency: usize,
    pub wallet_sample_size: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            watch_list: Vec::new(),
            per_address_limit: WatchLimits::default().per_address,
            fetch_concurrency: WatchLimits::default().concurrency,
            wallet_sample_size: analytics::DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            watch_list: config.watch_list.clone(),
            per_address_limit: config.watch_per_address_limit,
            fetch_concurrency: config.watch_fetch_concurrency,
            wallet_sample_size: config.wallet_sample_size,
        }
    }
}

/// Caller-facing entry point. Holds no state between calls beyond its
/// configuration, so concurrent scans are independent.
pub struct ScanEngine {
    client: Arc<dyn NodeClient>,
    settings: EngineSettings,
    clock: Arc<dyn Clock>,
}

impl ScanEngine {
    pub fn new(client: Arc<dyn NodeClient>, settings: EngineSettings) -> Self {
        Self {
            client,
            settings,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Dispatch to the scanner for `request.mode`. Never fails: problems
    /// with the node show up as an empty report with an explanatory hint.
    pub async fn scan(&self, request: &ScanRequest) -> ScanReport {
        let deadline = request.deadline.map(|budget| Instant::now() + budget);

        let mut report = match request.mode {
            ScanMode::RecentBlock => {
                scan_recent_block(self.client.as_ref(), request.threshold, request.limit, deadline)
                    .await
            }
            ScanMode::WatchList => {
                let limits = WatchLimits {
                    per_address: self.settings.per_address_limit,
                    global: request.limit,
                    concurrency: self.settings.fetch_concurrency,
                };
                scan_watched_addresses(
                    self.client.as_ref(),
                    &self.settings.watch_list,
                    request.threshold,
                    limits,
                    deadline,
                )
                .await
            }
        };

        report.events.truncate(request.limit);

        info!(
            "{} scan over {} SOL: {} events ({:?})",
            request.mode,
            request.threshold,
            report.events.len(),
            report.hint
        );
        report
    }

    /// Wallet statistics over the configured sample; `None` when the node
    /// could not provide them.
    pub async fn summarize(&self, address: &str) -> Option<WalletSummary> {
        analytics::summarize(
            self.client.as_ref(),
            self.clock.as_ref(),
            address,
            self.settings.wallet_sample_size,
        )
        .await
    }

    pub async fn recent_activity(&self, address: &str, limit: usize) -> Option<Vec<ActivityEntry>> {
        analytics::recent_activity(
            self.client.as_ref(),
            address,
            limit,
            self.settings.fetch_concurrency,
        )
        .await
    }
}
