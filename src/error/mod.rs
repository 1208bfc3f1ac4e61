//! Error handling for the solflow wallet core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for wallet operations
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("{0}")]
    MissingInput(&'static str),

    #[error("Please connect your wallet.")]
    WalletNotConnected,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Confirmation of {signature} timed out after {timeout_ms}ms")]
    ConfirmationTimeout { signature: String, timeout_ms: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for wallet operations
pub type Result<T> = std::result::Result<T, FlowError>;

/// Classification of a failure, carried in `OperationStatus::Failed`.
///
/// Validation and wallet-connection failures are resolved before any network
/// call; the network, rejection, and timeout kinds are only observable after
/// an async suspension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    WalletNotConnected,
    Network,
    Rejected,
    Timeout,
    Internal,
}

impl FlowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlowError::InvalidAmount(_)
            | FlowError::InvalidAddress(_)
            | FlowError::MissingInput(_) => ErrorKind::Validation,
            FlowError::WalletNotConnected => ErrorKind::WalletNotConnected,
            FlowError::Network(_) => ErrorKind::Network,
            FlowError::Rejected(_) => ErrorKind::Rejected,
            FlowError::ConfirmationTimeout { .. } => ErrorKind::Timeout,
            FlowError::Config(_) | FlowError::Wallet(_) | FlowError::Io(_) => ErrorKind::Internal,
        }
    }
}

impl From<solana_client::client_error::ClientError> for FlowError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        // An RPC response carrying a transaction error means the network
        // processed the call and the operation itself failed on-chain.
        match err.get_transaction_error() {
            Some(tx_err) => FlowError::Rejected(tx_err.to_string()),
            None => FlowError::Network(err.to_string()),
        }
    }
}

impl From<solana_sdk::pubkey::ParsePubkeyError> for FlowError {
    fn from(err: solana_sdk::pubkey::ParsePubkeyError) -> Self {
        FlowError::InvalidAddress(err.to_string())
    }
}

impl From<solana_sdk::signature::SignerError> for FlowError {
    fn from(err: solana_sdk::signature::SignerError) -> Self {
        FlowError::Wallet(err.to_string())
    }
}
