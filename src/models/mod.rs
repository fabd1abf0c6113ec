// Engine-owned records handed to callers. None of these are persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder for the counterpart a single balance leg cannot reveal.
pub const UNKNOWN_PARTY: &str = "Unknown";

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Send,
    Receive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub signature: String,
    /// SOL, always >= the threshold the event was detected with.
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub direction: Direction,
    pub timestamp: Option<i64>,
    pub slot: u64,
}

impl TransferEvent {
    /// Replace the inferred known side with a confirmed address, keeping the
    /// direction.
    pub fn anchored_to(mut self, address: &str) -> Self {
        match self.direction {
            Direction::Send => {
                self.from = address.to_string();
                self.to = UNKNOWN_PARTY.to_string();
            }
            Direction::Receive => {
                self.from = UNKNOWN_PARTY.to_string();
                self.to = address.to_string();
            }
        }
        self
    }
}

/// Wallet statistics derived from a bounded sample of recent signatures.
///
/// `total_transactions` and `age_in_days` only cover the sample: a wallet
/// with more history than the sample size reports the sample size and the
/// age of the oldest sampled signature, not its lifetime values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSummary {
    pub address: String,
    pub balance: f64,
    pub total_transactions: usize,
    pub age_in_days: i64,
    pub last_activity: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Send,
    Receive,
    Other,
}

/// One row of a wallet's recent activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub signature: String,
    pub slot: u64,
    pub timestamp: Option<i64>,
    pub kind: ActivityKind,
    /// Signed balance change of the fee payer, in SOL.
    pub fee_payer_change: f64,
    pub failed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    RecentBlock,
    WatchList,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::RecentBlock => write!(f, "recent_block"),
            ScanMode::WatchList => write!(f, "watch_list"),
        }
    }
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recent_block" | "recent" => Ok(ScanMode::RecentBlock),
            "watch_list" | "wallets" => Ok(ScanMode::WatchList),
            other => Err(other.to_string()),
        }
    }
}

/// Why a scan returned what it did. Empty results caused by the remote node
/// call for different retry guidance than a genuinely quiet window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanHint {
    Found,
    /// Data was read but nothing crossed the threshold. Lowering it may help.
    NoQualifyingTransfers,
    /// The sampled slot had no block (skipped or not yet available).
    BlockUnavailable,
    /// The node could not be reached or failed every request.
    RemoteUnavailable,
    /// The scan deadline passed before anything qualified.
    DeadlineExpired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub mode: ScanMode,
    pub events: Vec<TransferEvent>,
    pub hint: ScanHint,
    /// Watched addresses whose fetch failed during this scan.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_addresses: Vec<String>,
    /// Transactions skipped because the node returned them without metadata
    /// or with balances that do not line up with the account keys.
    #[serde(default)]
    pub malformed: usize,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
