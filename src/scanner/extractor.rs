use crate::blockchain::models::LedgerTransaction;
use crate::error::EngineError;
use crate::models::{lamports_to_sol, Direction, TransferEvent, UNKNOWN_PARTY};

/// Find the first balance leg of `tx` whose change is at least `threshold` SOL.
///
/// Accounts are examined in index order and scanning stops at the first
/// match, so a transaction yields at most one event even when several legs
/// qualify; the lowest index wins. Only that leg's account is reported, the
/// counterpart side is left as [`UNKNOWN_PARTY`]. An unchanged balance only
/// qualifies when `threshold` is zero or below, and then reads as a receive.
///
/// Failed transactions never produce an event. Balance vectors that do not
/// line up with the account keys are reported as
/// [`EngineError::MalformedTransaction`].
pub fn extract(
    tx: &LedgerTransaction,
    threshold: f64,
) -> Result<Option<TransferEvent>, EngineError> {
    if tx.is_failed() {
        return Ok(None);
    }

    if !tx.is_well_formed() {
        return Err(EngineError::MalformedTransaction {
            signature: tx.signature.clone(),
            reason: format!(
                "{} account keys, {} pre balances, {} post balances",
                tx.account_keys.len(),
                tx.pre_balances.len(),
                tx.post_balances.len()
            ),
        });
    }

    let leg = tx
        .pre_balances
        .iter()
        .zip(&tx.post_balances)
        .enumerate()
        .find_map(|(index, (&pre, &post))| {
            let amount = lamports_to_sol(pre.abs_diff(post));
            (amount >= threshold).then_some((index, amount, post < pre))
        });

    Ok(leg.map(|(index, amount, decreased)| {
        let account = tx.account_keys[index].clone();
        let (from, to, direction) = if decreased {
            (account, UNKNOWN_PARTY.to_string(), Direction::Send)
        } else {
            (UNKNOWN_PARTY.to_string(), account, Direction::Receive)
        };

        TransferEvent {
            signature: tx.signature.clone(),
            amount,
            from,
            to,
            direction,
            timestamp: tx.block_time,
            slot: tx.slot,
        }
    }))
}
