//! Wallet statistics and recent activity, derived fresh from the node on
//! every call.
//!
//! Exact lifetime figures would need unbounded signature pagination against a
//! rate-limited node, so everything here is computed over a bounded sample of
//! the most recent signatures.

use crate::blockchain::client::NodeClient;
use crate::blockchain::models::{LedgerTransaction, SignatureInfo};
use crate::clock::Clock;
use crate::models::{lamports_to_sol, ActivityEntry, ActivityKind, WalletSummary, LAMPORTS_PER_SOL};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

pub const DEFAULT_SAMPLE_SIZE: usize = 100;
pub const DEFAULT_ACTIVITY_LIMIT: usize = 10;

const SECONDS_PER_DAY: i64 = 86_400;

/// Summarise `address` from its balance and up to `sample_size` recent
/// signatures.
///
/// Returns `None` if either fetch fails, so callers can tell "stats
/// unavailable" apart from an empty wallet.
pub async fn summarize(
    client: &dyn NodeClient,
    clock: &dyn Clock,
    address: &str,
    sample_size: usize,
) -> Option<WalletSummary> {
    let lamports = match client.get_balance(address).await {
        Ok(lamports) => lamports,
        Err(e) => {
            warn!("Error fetching wallet balance for {}: {}", address, e);
            return None;
        }
    };

    let signatures = match client.get_signatures_for_address(address, sample_size).await {
        Ok(signatures) => signatures,
        Err(e) => {
            warn!("Error fetching wallet stats for {}: {}", address, e);
            return None;
        }
    };

    let sample = &signatures[..signatures.len().min(sample_size)];
    Some(summary_from_sample(address, lamports, sample, clock.now()))
}

/// Build a summary from a newest-first signature sample.
pub fn summary_from_sample(
    address: &str,
    lamports: u64,
    sample: &[SignatureInfo],
    now: DateTime<Utc>,
) -> WalletSummary {
    let age_in_days = sample
        .last()
        .and_then(|oldest| oldest.block_time)
        .map(|oldest| age_in_days(oldest, now))
        .unwrap_or(0);

    WalletSummary {
        address: address.to_string(),
        balance: lamports_to_sol(lamports),
        total_transactions: sample.len(),
        age_in_days,
        last_activity: sample.first().and_then(|newest| newest.block_time),
    }
}

/// Whole days between `since` and `now`, never negative.
fn age_in_days(since: i64, now: DateTime<Utc>) -> i64 {
    (now.timestamp() - since).max(0) / SECONDS_PER_DAY
}

/// The last `limit` transactions of `address`, newest first, classified by
/// what happened to the fee payer's balance. Transactions that cannot be
/// fetched are left out; `None` means the signature list itself failed.
pub async fn recent_activity(
    client: &dyn NodeClient,
    address: &str,
    limit: usize,
    concurrency: usize,
) -> Option<Vec<ActivityEntry>> {
    let signatures = match client.get_signatures_for_address(address, limit).await {
        Ok(signatures) => signatures,
        Err(e) => {
            warn!("Error fetching wallet transactions for {}: {}", address, e);
            return None;
        }
    };

    let entries: Vec<ActivityEntry> = stream::iter(signatures.into_iter().take(limit))
        .map(|sig| async move {
            let result = client.get_transaction(&sig.signature).await;
            (sig, result)
        })
        .buffered(concurrency.max(1))
        .filter_map(|(sig, result)| async move {
            match result {
                Ok(tx) => Some(activity_entry(&sig, &tx)),
                Err(e) => {
                    debug!("Dropping {} from activity feed: {}", sig.signature, e);
                    None
                }
            }
        })
        .collect()
        .await;

    Some(entries)
}

fn activity_entry(sig: &SignatureInfo, tx: &LedgerTransaction) -> ActivityEntry {
    let (kind, change) = classify(tx);
    ActivityEntry {
        signature: sig.signature.clone(),
        slot: sig.slot,
        timestamp: sig.block_time.or(tx.block_time),
        kind,
        fee_payer_change: change,
        failed: sig.err.is_some() || tx.is_failed(),
    }
}

/// Classify a transaction by the fee payer's (first account's) balance change.
pub fn classify(tx: &LedgerTransaction) -> (ActivityKind, f64) {
    let (Some(&pre), Some(&post)) = (tx.pre_balances.first(), tx.post_balances.first()) else {
        return (ActivityKind::Other, 0.0);
    };

    let change = (post as i128 - pre as i128) as f64 / LAMPORTS_PER_SOL as f64;
    let kind = if post > pre {
        ActivityKind::Receive
    } else if post < pre {
        ActivityKind::Send
    } else {
        ActivityKind::Other
    };
    (kind, change)
}
