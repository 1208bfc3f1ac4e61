//! Production RPC connection with per-call timeouts

use crate::config::NetworkConfig;
use crate::error::{FlowError, Result};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use super::LedgerConnection;

/// [`LedgerConnection`] backed by a Solana JSON-RPC endpoint.
///
/// Every call is bounded by the configured request timeout so a stalled node
/// surfaces as a network error instead of hanging the caller.
pub struct RpcConnection {
    client: RpcClient,
    commitment: CommitmentConfig,
    request_timeout: Duration,
}

impl RpcConnection {
    pub fn new(url: String, commitment: CommitmentConfig, request_timeout: Duration) -> Self {
        let client =
            RpcClient::new_with_timeout_and_commitment(url, request_timeout, commitment);
        Self {
            client,
            commitment,
            request_timeout,
        }
    }

    pub fn from_config(config: &NetworkConfig) -> Result<Self> {
        let commitment = super::parse_commitment(&config.commitment)?;
        Ok(Self::new(
            config.rpc_url.clone(),
            commitment,
            config.rpc_timeout(),
        ))
    }

    async fn bounded<T, F>(&self, what: &str, fut: F) -> Result<T>
    where
        F: Future<Output = solana_client::client_error::Result<T>>,
    {
        match timeout(self.request_timeout, fut).await {
            Ok(result) => result.map_err(FlowError::from),
            Err(_) => Err(FlowError::Network(format!(
                "{what} timed out after {}ms",
                self.request_timeout.as_millis()
            ))),
        }
    }

    fn send_config(&self) -> RpcSendTransactionConfig {
        RpcSendTransactionConfig {
            skip_preflight: false,
            preflight_commitment: Some(CommitmentLevel::Processed),
            encoding: None,
            max_retries: Some(3),
            min_context_slot: None,
        }
    }
}

#[async_trait]
impl LedgerConnection for RpcConnection {
    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature> {
        debug!(%address, lamports, "requesting airdrop");
        self.bounded(
            "airdrop request",
            self.client.request_airdrop(address, lamports),
        )
        .await
    }

    async fn balance(&self, address: &Pubkey) -> Result<u64> {
        let response = self
            .bounded(
                "balance query",
                self.client.get_balance_with_commitment(address, self.commitment),
            )
            .await?;
        Ok(response.value)
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        self.bounded("blockhash fetch", self.client.get_latest_blockhash())
            .await
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        self.bounded(
            "transaction send",
            self.client
                .send_transaction_with_config(transaction, self.send_config()),
        )
        .await
    }

    async fn is_confirmed(&self, signature: &Signature) -> Result<bool> {
        let response = self
            .bounded(
                "confirmation poll",
                self.client
                    .confirm_transaction_with_commitment(signature, self.commitment),
            )
            .await?;
        Ok(response.value)
    }
}
