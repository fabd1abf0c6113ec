use crate::blockchain::client::NodeClient;
use crate::blockchain::models::Block;
use crate::error::EngineError;
use crate::models::{ScanHint, ScanMode, ScanReport, TransferEvent};
use crate::scanner::extractor::extract;
use crate::scanner::within_deadline;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Scan the block at the node's current slot for transfers of at least
/// `threshold` SOL, keeping block order and stopping after `limit` events.
///
/// A skipped slot is expected on a live chain and yields an empty report
/// hinted `BlockUnavailable`, never an error.
pub async fn scan_recent_block(
    client: &dyn NodeClient,
    threshold: f64,
    limit: usize,
    deadline: Option<Instant>,
) -> ScanReport {
    let slot = match within_deadline(deadline, client.current_slot()).await {
        Some(Ok(slot)) => slot,
        Some(Err(e)) => {
            let err = EngineError::from(e);
            warn!("Failed to get current slot: {}", err);
            return report(Vec::new(), err.hint(), 0);
        }
        None => {
            warn!("Scan deadline expired while fetching current slot");
            return report(Vec::new(), ScanHint::DeadlineExpired, 0);
        }
    };

    let block = match within_deadline(deadline, client.get_block(slot)).await {
        Some(Ok(block)) => block,
        Some(Err(e)) => {
            let err = EngineError::from(e);
            match &err {
                EngineError::BlockUnavailable(_) => info!("{}", err),
                _ => warn!("Failed to get block {}: {}", slot, err),
            }
            return report(Vec::new(), err.hint(), 0);
        }
        None => {
            warn!("Scan deadline expired while fetching block {}", slot);
            return report(Vec::new(), ScanHint::DeadlineExpired, 0);
        }
    };

    let events = detect_in_block(&block, threshold, limit);
    let malformed = block.malformed
        + block
            .transactions
            .iter()
            .filter(|tx| !tx.is_failed() && !tx.is_well_formed())
            .count();
    debug!(
        "Slot {}: {} of {} transactions over {} SOL, {} malformed",
        slot,
        events.len(),
        block.transactions.len(),
        threshold,
        malformed
    );
    if malformed > 0 {
        warn!("Slot {}: skipped {} malformed transactions", slot, malformed);
    }

    let hint = if events.is_empty() {
        ScanHint::NoQualifyingTransfers
    } else {
        ScanHint::Found
    };
    report(events, hint, malformed)
}

/// Run the extractor over every transaction of `block` in order.
pub fn detect_in_block(block: &Block, threshold: f64, limit: usize) -> Vec<TransferEvent> {
    block
        .transactions
        .iter()
        .filter_map(|tx| match extract(tx, threshold) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping transaction in slot {}: {}", block.slot, e);
                None
            }
        })
        .take(limit)
        .collect()
}

fn report(events: Vec<TransferEvent>, hint: ScanHint, malformed: usize) -> ScanReport {
    ScanReport {
        mode: ScanMode::RecentBlock,
        events,
        hint,
        failed_addresses: Vec::new(),
        malformed,
    }
}
