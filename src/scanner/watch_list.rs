use crate::blockchain::client::{ClientError, NodeClient};
use crate::blockchain::models::SignatureInfo;
use crate::models::{ScanHint, ScanMode, ScanReport, TransferEvent};
use crate::scanner::extractor::extract;
use crate::scanner::within_deadline;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchLimits {
    /// Signatures fetched per watched address.
    pub per_address: usize,
    /// Events returned across all addresses.
    pub global: usize,
    /// Transaction fetches in flight for one address.
    pub concurrency: usize,
}

impl Default for WatchLimits {
    fn default() -> Self {
        Self {
            per_address: 5,
            global: 20,
            concurrency: 4,
        }
    }
}

/// Look for large transfers among the most recent transactions of each
/// watched address.
///
/// Events are grouped by address in watch-list order and keep the node's
/// newest-first order within an address; there is no global re-sort by
/// timestamp. The watched address replaces the extractor's inferred side,
/// since it is known to take part in the transaction. A failing address is
/// logged and skipped. A signature shared by two watched addresses is only
/// examined for the first one.
pub async fn scan_watched_addresses(
    client: &dyn NodeClient,
    addresses: &[String],
    threshold: f64,
    limits: WatchLimits,
    deadline: Option<Instant>,
) -> ScanReport {
    let mut events: Vec<TransferEvent> = Vec::new();
    let mut failed_addresses = Vec::new();
    let mut examined: HashSet<String> = HashSet::new();
    let mut expired = false;
    let mut malformed = 0;

    'addresses: for address in addresses {
        if events.len() >= limits.global {
            break;
        }

        let signatures = match within_deadline(
            deadline,
            client.get_signatures_for_address(address, limits.per_address),
        )
        .await
        {
            Some(Ok(signatures)) => signatures,
            Some(Err(e)) => {
                warn!("Error monitoring wallet {}: {}", address, e);
                failed_addresses.push(address.clone());
                continue;
            }
            None => {
                expired = true;
                break;
            }
        };

        let pending: Vec<SignatureInfo> = signatures
            .into_iter()
            .take(limits.per_address)
            .filter(|sig| sig.err.is_none())
            .filter(|sig| examined.insert(sig.signature.clone()))
            .collect();

        debug!("Checking {} signatures for {}", pending.len(), address);

        // buffered() yields in input order, so newest-first survives the fan-out
        let mut fetches = stream::iter(pending)
            .map(|sig| async move {
                let result = client.get_transaction(&sig.signature).await;
                (sig, result)
            })
            .buffered(limits.concurrency.max(1));

        loop {
            let (sig, result) = match within_deadline(deadline, fetches.next()).await {
                Some(Some(fetched)) => fetched,
                Some(None) => break,
                None => {
                    expired = true;
                    break 'addresses;
                }
            };

            let tx = match result {
                Ok(tx) => tx,
                Err(ClientError::MalformedTransaction { signature, reason }) => {
                    malformed += 1;
                    warn!("Skipping malformed transaction {} for {}: {}", signature, address, reason);
                    continue;
                }
                Err(e) => {
                    warn!("Failed to get transaction {} for {}: {}", sig.signature, address, e);
                    continue;
                }
            };

            match extract(&tx, threshold) {
                Ok(Some(event)) => {
                    let mut event = event.anchored_to(address);
                    event.timestamp = event.timestamp.or(sig.block_time);
                    events.push(event);
                    if events.len() >= limits.global {
                        break 'addresses;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    malformed += 1;
                    warn!("Skipping transaction for {}: {}", address, e);
                }
            }
        }
    }

    if expired {
        warn!(
            "Scan deadline expired, returning {} events collected so far",
            events.len()
        );
    }

    events.truncate(limits.global);

    let hint = if !events.is_empty() {
        ScanHint::Found
    } else if expired {
        ScanHint::DeadlineExpired
    } else if !addresses.is_empty() && failed_addresses.len() == addresses.len() {
        ScanHint::RemoteUnavailable
    } else {
        ScanHint::NoQualifyingTransfers
    };

    ScanReport {
        mode: ScanMode::WatchList,
        events,
        hint,
        failed_addresses,
        malformed,
    }
}
