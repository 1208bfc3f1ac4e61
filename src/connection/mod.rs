//! Connection Provider seam over the Solana RPC surface

use crate::error::{FlowError, Result};
use async_trait::async_trait;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

pub mod rpc;

pub use rpc::RpcConnection;

/// The RPC operations the wallet core consumes. Every call is a network
/// round-trip and may fail with connectivity or timeout errors; the tracker
/// owns all retry-or-report decisions.
#[async_trait]
pub trait LedgerConnection: Send + Sync {
    /// Request test funds for `address`, returning the airdrop signature.
    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature>;

    /// Spendable balance of `address` in lamports.
    async fn balance(&self, address: &Pubkey) -> Result<u64>;

    /// Recent blockhash for transaction construction.
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Submit a signed transaction, returning its signature.
    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature>;

    /// One confirmation poll: has `signature` reached the connection's
    /// commitment level?
    async fn is_confirmed(&self, signature: &Signature) -> Result<bool>;
}

/// Parse a configured commitment level string.
pub fn parse_commitment(s: &str) -> Result<CommitmentConfig> {
    let commitment = match s {
        "processed" => CommitmentLevel::Processed,
        "confirmed" => CommitmentLevel::Confirmed,
        "finalized" => CommitmentLevel::Finalized,
        other => {
            return Err(FlowError::Config(config::ConfigError::Message(format!(
                "unknown commitment level '{other}'"
            ))))
        }
    };
    Ok(CommitmentConfig { commitment })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_commitment_levels_parse() {
        assert_eq!(
            parse_commitment("processed").unwrap().commitment,
            CommitmentLevel::Processed
        );
        assert_eq!(
            parse_commitment("confirmed").unwrap().commitment,
            CommitmentLevel::Confirmed
        );
        assert_eq!(
            parse_commitment("finalized").unwrap().commitment,
            CommitmentLevel::Finalized
        );
    }

    #[test]
    fn unknown_commitment_levels_are_rejected() {
        assert!(matches!(
            parse_commitment("hopeful"),
            Err(FlowError::Config(_))
        ));
    }
}
