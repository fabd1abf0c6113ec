use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::{
    EncodedTransaction, EncodedTransactionWithStatusMeta, UiMessage, UiTransactionStatusMeta,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// One settled (or failed) transaction as returned by the node, reduced to
/// what balance-delta detection needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    /// Index-aligned with `pre_balances` / `post_balances`.
    pub account_keys: Vec<String>,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    pub err: Option<String>,
}

impl LedgerTransaction {
    pub fn is_failed(&self) -> bool {
        self.err.is_some()
    }

    pub fn is_well_formed(&self) -> bool {
        self.pre_balances.len() == self.account_keys.len()
            && self.post_balances.len() == self.account_keys.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub slot: u64,
    pub block_time: Option<i64>,
    pub transactions: Vec<LedgerTransaction>,
    /// Transactions the node returned without status metadata.
    pub malformed: usize,
}

/// Entry of a `getSignaturesForAddress` page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub err: Option<String>,
}

/// Reason an encoded transaction could not be reduced to a `LedgerTransaction`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("transaction has no status metadata")]
    MissingMeta,

    #[error("unsupported transaction encoding")]
    UnsupportedEncoding,

    #[error("transaction carries no signature")]
    MissingSignature,
}

/// Convert an RPC transaction (json or jsonParsed encoding) into our model.
///
/// Version-0 transactions only list static keys in the message; addresses
/// loaded from lookup tables are appended (writable, then readonly) so the key
/// list lines up with the balance vectors the node reports.
pub fn convert_transaction(
    slot: u64,
    block_time: Option<i64>,
    tx: &EncodedTransactionWithStatusMeta,
) -> Result<LedgerTransaction, ConversionError> {
    let ui_tx = match &tx.transaction {
        EncodedTransaction::Json(ui_tx) => ui_tx,
        _ => return Err(ConversionError::UnsupportedEncoding),
    };

    let signature = ui_tx
        .signatures
        .first()
        .cloned()
        .ok_or(ConversionError::MissingSignature)?;

    let meta = tx.meta.as_ref().ok_or(ConversionError::MissingMeta)?;

    let mut account_keys: Vec<String> = match &ui_tx.message {
        UiMessage::Raw(message) => message.account_keys.clone(),
        UiMessage::Parsed(message) => message
            .account_keys
            .iter()
            .map(|account| account.pubkey.clone())
            .collect(),
    };

    // jsonParsed already folds loaded addresses into account_keys
    if matches!(ui_tx.message, UiMessage::Raw(_)) {
        append_loaded_addresses(&mut account_keys, meta);
    }

    Ok(LedgerTransaction {
        signature,
        slot,
        block_time,
        account_keys,
        pre_balances: meta.pre_balances.clone(),
        post_balances: meta.post_balances.clone(),
        err: meta.err.as_ref().map(|e| e.to_string()),
    })
}

fn append_loaded_addresses(account_keys: &mut Vec<String>, meta: &UiTransactionStatusMeta) {
    if let OptionSerializer::Some(loaded) = &meta.loaded_addresses {
        account_keys.extend(loaded.writable.iter().cloned());
        account_keys.extend(loaded.readonly.iter().cloned());
    }
}

/// Convert every transaction of a block, dropping (and counting) the ones
/// that cannot be interpreted.
pub fn convert_block(
    slot: u64,
    block_time: Option<i64>,
    transactions: &[EncodedTransactionWithStatusMeta],
) -> Block {
    let mut converted = Vec::with_capacity(transactions.len());
    let mut malformed = 0;

    for tx in transactions {
        match convert_transaction(slot, block_time, tx) {
            Ok(ledger_tx) => converted.push(ledger_tx),
            Err(e) => {
                malformed += 1;
                warn!("Skipping transaction in slot {}: {}", slot, e);
            }
        }
    }

    Block {
        slot,
        block_time,
        transactions: converted,
        malformed,
    }
}
