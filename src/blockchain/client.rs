use crate::blockchain::models::{convert_block, convert_transaction, Block, LedgerTransaction, SignatureInfo};
use crate::config::Config;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use solana_client::client_error::ClientErrorKind;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::{RpcBlockConfig, RpcTransactionConfig};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_transaction_status::{TransactionDetails, UiTransactionEncoding};
use std::future::Future;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("RPC error: {0}")]
    RpcError(#[from] solana_client::client_error::ClientError),

    #[error("Invalid signature: {0}")]
    SignatureError(String),

    #[error("Invalid public key: {0}")]
    PubkeyError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Block not available for slot {0}")]
    BlockUnavailable(u64),

    #[error("Malformed transaction {signature}: {reason}")]
    MalformedTransaction { signature: String, reason: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Invalid RPC endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ClientError {
    /// Errors worth retrying: transport failures and timeouts. Everything
    /// else is an answer from the node and will not change on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::RpcError(e) => {
                matches!(e.kind(), ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_))
            }
            ClientError::Timeout(_) => true,
            _ => false,
        }
    }
}

/// Read-only view of a ledger node. Every call may fail or time out
/// independently; callers treat failure as absence of data.
#[async_trait]
pub trait NodeClient: Send + Sync {
    async fn current_slot(&self) -> Result<u64, ClientError>;

    async fn get_block(&self, slot: u64) -> Result<Block, ClientError>;

    /// Most recent signatures first, at most `limit`.
    async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, ClientError>;

    async fn get_transaction(&self, signature: &str) -> Result<LedgerTransaction, ClientError>;

    /// Balance in lamports.
    async fn get_balance(&self, address: &str) -> Result<u64, ClientError>;
}

pub struct SolanaClient {
    rpc_client: RpcClient,
    commitment: CommitmentConfig,
    limiter: Option<DefaultDirectRateLimiter>,
    max_retries: usize,
}

impl SolanaClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let rpc_url = &config.solana_rpc_url;
        if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            return Err(ClientError::InvalidEndpoint(rpc_url.clone()));
        }

        let timeout = Duration::from_secs(config.rpc_timeout_secs);

        let commitment = match config.solana_commitment_level.as_str() {
            "processed" => CommitmentConfig::processed(),
            "confirmed" => CommitmentConfig::confirmed(),
            "finalized" => CommitmentConfig::finalized(),
            _ => CommitmentConfig::confirmed(),
        };

        let limiter = config
            .rpc_rate_limit
            .and_then(NonZeroU32::new)
            .map(|per_sec| RateLimiter::direct(Quota::per_second(per_sec)));

        info!(
            "Initializing Solana client with RPC endpoint: {}, commitment: {:?}, rate limit: {:?}",
            rpc_url, commitment, config.rpc_rate_limit
        );

        let rpc_client =
            RpcClient::new_with_timeout_and_commitment(rpc_url.clone(), timeout, commitment);

        Ok(Self {
            rpc_client,
            commitment,
            limiter,
            max_retries: config.rpc_max_retries,
        })
    }

    /// Run one RPC call under the rate limiter, retrying transient failures.
    async fn call<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let attempt = || {
            let request = op();
            async move {
                if let Some(limiter) = &self.limiter {
                    limiter.until_ready().await;
                }
                request.await
            }
        };

        attempt
            .retry(ExponentialBuilder::default().with_max_times(self.max_retries))
            .when(ClientError::is_transient)
            .notify(|err: &ClientError, dur: Duration| {
                warn!("{} failed ({}), retrying in {:?}", what, err, dur);
            })
            .await
    }

    // getBlock rejects "processed"
    fn block_commitment(&self) -> CommitmentConfig {
        if self.commitment == CommitmentConfig::processed() {
            CommitmentConfig::confirmed()
        } else {
            self.commitment
        }
    }
}

fn parse_pubkey(address: &str) -> Result<Pubkey, ClientError> {
    Pubkey::from_str(address).map_err(|_| ClientError::PubkeyError(address.to_string()))
}

/// Nodes answer skipped or pruned slots with an RPC error rather than null.
fn is_block_unavailable(e: &solana_client::client_error::ClientError) -> bool {
    let msg = e.to_string();
    msg.contains("was skipped")
        || msg.contains("not available")
        || msg.contains("missing in long-term storage")
}

#[async_trait]
impl NodeClient for SolanaClient {
    async fn current_slot(&self) -> Result<u64, ClientError> {
        self.call("getSlot", || async move {
            self.rpc_client
                .get_slot_with_commitment(self.commitment)
                .await
                .map_err(ClientError::from)
        })
        .await
    }

    async fn get_block(&self, slot: u64) -> Result<Block, ClientError> {
        let commitment = self.block_commitment();

        let block = self
            .call("getBlock", || async move {
                let config = RpcBlockConfig {
                    encoding: Some(UiTransactionEncoding::Json),
                    transaction_details: Some(TransactionDetails::Full),
                    rewards: Some(false),
                    commitment: Some(commitment),
                    max_supported_transaction_version: Some(0),
                };
                match self.rpc_client.get_block_with_config(slot, config).await {
                    Ok(block) => Ok(block),
                    Err(e) if is_block_unavailable(&e) => Err(ClientError::BlockUnavailable(slot)),
                    Err(e) => Err(ClientError::RpcError(e)),
                }
            })
            .await?;

        let transactions = block
            .transactions
            .ok_or(ClientError::BlockUnavailable(slot))?;

        debug!("Fetched block {} with {} transactions", slot, transactions.len());
        Ok(convert_block(slot, block.block_time, &transactions))
    }

    async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, ClientError> {
        let pubkey = parse_pubkey(address)?;
        let pubkey = &pubkey;

        let statuses = self
            .call("getSignaturesForAddress", || async move {
                let config = GetConfirmedSignaturesForAddress2Config {
                    before: None,
                    until: None,
                    limit: Some(limit),
                    commitment: Some(self.commitment),
                };
                self.rpc_client
                    .get_signatures_for_address_with_config(pubkey, config)
                    .await
                    .map_err(ClientError::from)
            })
            .await?;

        Ok(statuses
            .into_iter()
            .map(|status| SignatureInfo {
                signature: status.signature,
                slot: status.slot,
                block_time: status.block_time,
                err: status.err.map(|e| e.to_string()),
            })
            .collect())
    }

    async fn get_transaction(&self, signature_str: &str) -> Result<LedgerTransaction, ClientError> {
        let signature = Signature::from_str(signature_str)
            .map_err(|_| ClientError::SignatureError(signature_str.to_string()))?;

        let signature = &signature;

        let tx = self
            .call("getTransaction", || async move {
                let config = RpcTransactionConfig {
                    encoding: Some(UiTransactionEncoding::Json),
                    commitment: Some(self.commitment),
                    max_supported_transaction_version: Some(0),
                };
                self.rpc_client
                    .get_transaction_with_config(signature, config)
                    .await
                    .map_err(ClientError::from)
            })
            .await?;

        convert_transaction(tx.slot, tx.block_time, &tx.transaction).map_err(|e| {
            ClientError::MalformedTransaction {
                signature: signature_str.to_string(),
                reason: e.to_string(),
            }
        })
    }

    async fn get_balance(&self, address: &str) -> Result<u64, ClientError> {
        let pubkey = parse_pubkey(address)?;
        let pubkey = &pubkey;

        self.call("getBalance", || async move {
            self.rpc_client
                .get_balance_with_commitment(pubkey, self.commitment)
                .await
                .map(|response| response.value)
                .map_err(ClientError::from)
        })
        .await
    }
}
