// Engine configuration, loaded from the environment (and `.env` if present):
// - RPC endpoint, commitment, timeout, rate limit and retries
// - HTTP server address/port
// - Scan mode, threshold, limit and polling schedule
// - Watch-list of high-volume addresses
// - Wallet sampling window

use crate::models::ScanMode;
use crate::validation::{validate_solana_address, validate_threshold};
use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Known high-volume wallets polled in watch-list mode when `WATCH_LIST` is unset.
pub const DEFAULT_WATCH_LIST: &[&str] = &[
    // Binance hot wallet
    "5tzFkiKscXHK5ZXCGbXZxdw7gTjjD1mBwuoFbhUvuAi9",
    // FTX (historical)
    "FTX8xpCYxCbZfMJzPVnMf4SjHEKPZM5GhKGnPfLvxbxC",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub solana_rpc_url: String,
    pub solana_commitment_level: String,
    pub rpc_timeout_secs: u64,
    pub rpc_rate_limit: Option<u32>,
    pub rpc_max_retries: usize,
    pub scan_mode: ScanMode,
    pub large_transfer_threshold: f64,
    pub scan_limit: usize,
    pub scan_interval: Duration,
    pub scan_deadline: Duration,
    pub watch_list: Vec<String>,
    pub watch_per_address_limit: usize,
    pub watch_fetch_concurrency: usize,
    pub wallet_sample_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            solana_rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            solana_commitment_level: "confirmed".to_string(),
            rpc_timeout_secs: 30,
            rpc_rate_limit: None,
            rpc_max_retries: 3,
            scan_mode: ScanMode::RecentBlock,
            large_transfer_threshold: 100.0,
            scan_limit: 20,
            scan_interval: Duration::from_secs(30),
            scan_deadline: Duration::from_secs(20),
            watch_list: DEFAULT_WATCH_LIST.iter().map(|a| a.to_string()).collect(),
            watch_per_address_limit: 5,
            watch_fetch_concurrency: num_cpus::get().clamp(1, 4),
            wallet_sample_size: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = Self::default();

        let server_host = env::var("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = parse_env("SERVER_PORT", defaults.server_port);
        let solana_rpc_url = env::var("SOLANA_RPC_URL").unwrap_or(defaults.solana_rpc_url);
        let solana_commitment_level =
            env::var("SOLANA_COMMITMENT_LEVEL").unwrap_or(defaults.solana_commitment_level);
        let rpc_timeout_secs = parse_env("RPC_TIMEOUT_SECS", defaults.rpc_timeout_secs);
        let rpc_rate_limit = env::var("RPC_RATE_LIMIT")
            .map(|v| v.parse().ok())
            .unwrap_or(None);
        let rpc_max_retries = parse_env("RPC_MAX_RETRIES", defaults.rpc_max_retries);
        let scan_mode = parse_env("SCAN_MODE", defaults.scan_mode);
        let large_transfer_threshold = threshold_or_default(
            env::var("LARGE_TRANSFER_THRESHOLD").ok().as_deref(),
            defaults.large_transfer_threshold,
        );
        let scan_limit = parse_env("SCAN_LIMIT", defaults.scan_limit);
        let scan_interval = Duration::from_secs(parse_env(
            "SCAN_INTERVAL_SECS",
            defaults.scan_interval.as_secs(),
        ));
        let scan_deadline = Duration::from_secs(parse_env(
            "SCAN_DEADLINE_SECS",
            defaults.scan_deadline.as_secs(),
        ));
        let watch_list = env::var("WATCH_LIST")
            .map(|v| parse_watch_list(&v))
            .unwrap_or(defaults.watch_list);
        let watch_per_address_limit =
            parse_env("WATCH_PER_ADDRESS_LIMIT", defaults.watch_per_address_limit);
        let watch_fetch_concurrency =
            parse_env("WATCH_FETCH_CONCURRENCY", defaults.watch_fetch_concurrency).max(1);
        let wallet_sample_size = parse_env("WALLET_SAMPLE_SIZE", defaults.wallet_sample_size);

        Self {
            server_host,
            server_port,
            solana_rpc_url,
            solana_commitment_level,
            rpc_timeout_secs,
            rpc_rate_limit,
            rpc_max_retries,
            scan_mode,
            large_transfer_threshold,
            scan_limit,
            scan_interval,
            scan_deadline,
            watch_list,
            watch_per_address_limit,
            watch_fetch_concurrency,
            wallet_sample_size,
        }
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparseable {}={:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

/// Threshold from `raw`, falling back to `default` when unset or not a
/// positive finite number.
pub fn threshold_or_default(raw: Option<&str>, default: f64) -> f64 {
    match raw.map(validate_threshold) {
        Some(Ok(threshold)) => threshold,
        Some(Err(e)) => {
            warn!("Ignoring LARGE_TRANSFER_THRESHOLD: {}, using default", e);
            default
        }
        None => default,
    }
}

/// Split a comma-separated list, dropping entries that are not valid addresses.
pub fn parse_watch_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter(|entry| match validate_solana_address(entry) {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping watch-list entry: {}", e);
                false
            }
        })
        .map(str::to_string)
        .collect()
}
