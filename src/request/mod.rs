//! Operation request construction from validated inputs

use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// A fully validated wallet operation, built once per user action and owned
/// by the tracker for the duration of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationRequest {
    /// Request test funds for the connected wallet
    Airdrop { address: Pubkey, lamports: u64 },

    /// Query the connected wallet's spendable balance
    Balance { address: Pubkey },

    /// Send lamports from the connected wallet to a recipient
    Transfer {
        from: Pubkey,
        to: Pubkey,
        lamports: u64,
    },
}

impl OperationRequest {
    /// Short label for log lines
    pub fn label(&self) -> &'static str {
        match self {
            OperationRequest::Airdrop { .. } => "airdrop",
            OperationRequest::Balance { .. } => "balance",
            OperationRequest::Transfer { .. } => "transfer",
        }
    }
}

/// Builds operation requests from already-parsed form values, enforcing the
/// presence checks the UI performs before any network call. Field checks run
/// in the order the original form validates them: recipient, then amount,
/// then wallet connection.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder {
    wallet: Option<Pubkey>,
}

impl RequestBuilder {
    pub fn new(wallet: Option<Pubkey>) -> Self {
        Self { wallet }
    }

    fn wallet(&self) -> Result<Pubkey> {
        self.wallet.ok_or(FlowError::WalletNotConnected)
    }

    pub fn airdrop(&self, lamports: Option<u64>) -> Result<OperationRequest> {
        let lamports =
            lamports.ok_or(FlowError::MissingInput("Please select an amount to request."))?;
        let address = self.wallet()?;
        Ok(OperationRequest::Airdrop { address, lamports })
    }

    pub fn balance(&self) -> Result<OperationRequest> {
        Ok(OperationRequest::Balance {
            address: self.wallet()?,
        })
    }

    pub fn transfer(
        &self,
        recipient: Option<Pubkey>,
        lamports: Option<u64>,
    ) -> Result<OperationRequest> {
        let to = recipient.ok_or(FlowError::MissingInput("Please enter a recipient address."))?;
        let lamports = lamports.ok_or(FlowError::MissingInput("Please enter an amount."))?;
        let from = self.wallet()?;
        Ok(OperationRequest::Transfer { from, to, lamports })
    }
}
