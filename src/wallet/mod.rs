//! Wallet signer seam and keypair loading
//!
//! Signing internals stay inside `solana_sdk`; this module only decides where
//! key material comes from and exposes the signer contract the tracker
//! consumes: a public identity (or none while disconnected) and the ability
//! to sign a transaction.

use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use std::path::{Path, PathBuf};

/// The wallet capability consumed by the tracker.
pub trait WalletSigner: Send + Sync {
    /// Public identity of the connected wallet, or `None` while disconnected.
    fn pubkey(&self) -> Option<Pubkey>;

    /// Sign `transaction` against `blockhash` with the wallet key.
    fn sign_transaction(&self, transaction: &mut Transaction, blockhash: Hash) -> Result<()>;
}

/// Signer over a locally held keypair.
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

impl WalletSigner for KeypairSigner {
    fn pubkey(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    fn sign_transaction(&self, transaction: &mut Transaction, blockhash: Hash) -> Result<()> {
        transaction.try_sign(&[&self.keypair], blockhash)?;
        Ok(())
    }
}

/// Wallet state before any key is connected; every signing attempt fails
/// with `WalletNotConnected`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedWallet;

impl WalletSigner for DisconnectedWallet {
    fn pubkey(&self) -> Option<Pubkey> {
        None
    }

    fn sign_transaction(&self, _transaction: &mut Transaction, _blockhash: Hash) -> Result<()> {
        Err(FlowError::WalletNotConnected)
    }
}

/// Where the wallet keypair is loaded from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletSource {
    /// Keypair file on disk (Solana CLI JSON array or raw 64 bytes)
    File,
    /// Environment variable holding base58 or a JSON byte array
    Environment,
}

/// Keypair custody configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub source: WalletSource,

    /// Path to the keypair file (for file-based wallets)
    pub keypair_path: Option<PathBuf>,

    /// Environment variable containing the private key
    pub env_var: Option<String>,

    /// Expected public key, checked against the loaded keypair when set
    pub expected_pubkey: Option<String>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            source: WalletSource::Environment,
            keypair_path: None,
            env_var: Some("SOLFLOW_KEYPAIR".to_string()),
            expected_pubkey: None,
        }
    }
}

impl WalletConfig {
    /// Load and verify the configured keypair.
    pub fn load_signer(&self) -> Result<KeypairSigner> {
        let keypair = match self.source {
            WalletSource::File => self.load_from_file()?,
            WalletSource::Environment => self.load_from_env()?,
        };
        self.verify(&keypair)?;
        Ok(KeypairSigner::new(keypair))
    }

    fn load_from_file(&self) -> Result<Keypair> {
        let path = self
            .keypair_path
            .as_deref()
            .ok_or_else(|| FlowError::Wallet("keypair path not specified".to_string()))?;

        if !path.exists() {
            return Err(FlowError::Wallet(format!(
                "keypair file not found: {}",
                path.display()
            )));
        }

        let bytes = std::fs::read(path)?;

        // Solana CLI format: a JSON array of 64 bytes
        if let Ok(json_bytes) = serde_json::from_slice::<Vec<u8>>(&bytes) {
            return keypair_from_bytes(&json_bytes, path);
        }

        keypair_from_bytes(&bytes, path)
    }

    fn load_from_env(&self) -> Result<Keypair> {
        let env_var = self
            .env_var
            .as_deref()
            .ok_or_else(|| FlowError::Wallet("environment variable not specified".to_string()))?;

        let value = std::env::var(env_var)
            .map_err(|_| FlowError::Wallet(format!("environment variable {env_var} not set")))?;

        if let Ok(bytes) = bs58::decode(&value).into_vec() {
            if bytes.len() == 64 {
                return Keypair::from_bytes(&bytes)
                    .map_err(|e| FlowError::Wallet(format!("invalid keypair in {env_var}: {e}")));
            }
        }

        if let Ok(bytes) = serde_json::from_str::<Vec<u8>>(&value) {
            if bytes.len() == 64 {
                return Keypair::from_bytes(&bytes)
                    .map_err(|e| FlowError::Wallet(format!("invalid keypair in {env_var}: {e}")));
            }
        }

        Err(FlowError::Wallet(format!(
            "unrecognized private key format in {env_var}"
        )))
    }

    fn verify(&self, keypair: &Keypair) -> Result<()> {
        if let Some(expected) = &self.expected_pubkey {
            let expected: Pubkey = expected.parse()?;
            if keypair.pubkey() != expected {
                return Err(FlowError::Wallet(format!(
                    "keypair mismatch: expected {expected}, got {}",
                    keypair.pubkey()
                )));
            }
        }
        Ok(())
    }
}

fn keypair_from_bytes(bytes: &[u8], path: &Path) -> Result<Keypair> {
    if bytes.len() != 64 {
        return Err(FlowError::Wallet(format!(
            "invalid keypair file format: {}",
            path.display()
        )));
    }
    Keypair::from_bytes(bytes)
        .map_err(|e| FlowError::Wallet(format!("invalid keypair in {}: {e}", path.display())))
}
