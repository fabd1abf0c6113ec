//! Scripted in-memory node shared by the engine tests.

use crate::blockchain::client::{ClientError, NodeClient};
use crate::blockchain::models::{Block, LedgerTransaction, SignatureInfo};
use crate::models::LAMPORTS_PER_SOL;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

pub fn sol(amount: u64) -> u64 {
    amount * LAMPORTS_PER_SOL
}

/// A valid base58 address derived from one byte.
pub fn addr(seed: u8) -> String {
    bs58::encode([seed; 32]).into_string()
}

pub fn tx(
    signature: &str,
    slot: u64,
    account_keys: &[&str],
    pre_balances: &[u64],
    post_balances: &[u64],
) -> LedgerTransaction {
    LedgerTransaction {
        signature: signature.to_string(),
        slot,
        block_time: Some(1_700_000_000 + slot as i64),
        account_keys: account_keys.iter().map(|k| k.to_string()).collect(),
        pre_balances: pre_balances.to_vec(),
        post_balances: post_balances.to_vec(),
        err: None,
    }
}

/// Two-account transfer where `from` pays `amount` SOL to `to`.
pub fn payment(signature: &str, slot: u64, from: &str, to: &str, amount: u64) -> LedgerTransaction {
    tx(
        signature,
        slot,
        &[from, to],
        &[sol(amount + 10), sol(1)],
        &[sol(10), sol(amount + 1)],
    )
}

pub fn failed(mut tx: LedgerTransaction) -> LedgerTransaction {
    tx.err = Some("InstructionError(0, Custom(1))".to_string());
    tx
}

pub fn block(slot: u64, transactions: Vec<LedgerTransaction>) -> Block {
    Block {
        slot,
        block_time: Some(1_700_000_000 + slot as i64),
        transactions,
        malformed: 0,
    }
}

#[derive(Default)]
pub struct FakeNode {
    slot: Option<u64>,
    blocks: HashMap<u64, Block>,
    signatures: HashMap<String, Vec<SignatureInfo>>,
    transactions: HashMap<String, LedgerTransaction>,
    balances: HashMap<String, u64>,
    failing: HashSet<String>,
    block_delay: Option<Duration>,
    tx_delays: HashMap<String, Duration>,
    fetched: Mutex<Vec<String>>,
}

impl FakeNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `block` the one at the current slot.
    pub fn with_block(mut self, block: Block) -> Self {
        self.slot = Some(block.slot);
        self.blocks.insert(block.slot, block);
        self
    }

    /// Current slot with no block behind it.
    pub fn with_skipped_slot(mut self, slot: u64) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Register `history` (newest first) as the signatures of `address`.
    pub fn with_history(mut self, address: &str, history: Vec<LedgerTransaction>) -> Self {
        let infos = history
            .iter()
            .map(|tx| SignatureInfo {
                signature: tx.signature.clone(),
                slot: tx.slot,
                block_time: tx.block_time,
                err: tx.err.clone(),
            })
            .collect();
        self.signatures.insert(address.to_string(), infos);
        for tx in history {
            self.transactions.insert(tx.signature.clone(), tx);
        }
        self
    }

    /// Signatures whose transactions the node cannot return.
    pub fn with_signatures(mut self, address: &str, signatures: Vec<SignatureInfo>) -> Self {
        self.signatures
            .entry(address.to_string())
            .or_default()
            .extend(signatures);
        self
    }

    pub fn with_balance(mut self, address: &str, lamports: u64) -> Self {
        self.balances.insert(address.to_string(), lamports);
        self
    }

    /// Every request about `address` times out.
    pub fn failing(mut self, address: &str) -> Self {
        self.failing.insert(address.to_string());
        self
    }

    pub fn with_block_delay(mut self, delay: Duration) -> Self {
        self.block_delay = Some(delay);
        self
    }

    pub fn with_tx_delay(mut self, signature: &str, delay: Duration) -> Self {
        self.tx_delays.insert(signature.to_string(), delay);
        self
    }

    /// Signatures passed to `get_transaction`, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeClient for FakeNode {
    async fn current_slot(&self) -> Result<u64, ClientError> {
        self.slot
            .ok_or_else(|| ClientError::Timeout("getSlot".to_string()))
    }

    async fn get_block(&self, slot: u64) -> Result<Block, ClientError> {
        if let Some(delay) = self.block_delay {
            tokio::time::sleep(delay).await;
        }
        self.blocks
            .get(&slot)
            .cloned()
            .ok_or(ClientError::BlockUnavailable(slot))
    }

    async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, ClientError> {
        if self.failing.contains(address) {
            return Err(ClientError::Timeout(format!("getSignaturesForAddress {}", address)));
        }
        Ok(self
            .signatures
            .get(address)
            .map(|sigs| sigs.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn get_transaction(&self, signature: &str) -> Result<LedgerTransaction, ClientError> {
        self.fetched.lock().unwrap().push(signature.to_string());
        if let Some(delay) = self.tx_delays.get(signature) {
            tokio::time::sleep(*delay).await;
        }
        self.transactions
            .get(signature)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(signature.to_string()))
    }

    async fn get_balance(&self, address: &str) -> Result<u64, ClientError> {
        if self.failing.contains(address) {
            return Err(ClientError::Timeout(format!("getBalance {}", address)));
        }
        Ok(self.balances.get(address).copied().unwrap_or(0))
    }
}
