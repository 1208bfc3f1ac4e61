//! Configuration for the wallet operations core

use crate::connection::parse_commitment;
use crate::error::{FlowError, Result};
use crate::tracker::ConfirmPolicy;
use crate::wallet::WalletConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network and RPC configuration
    pub network: NetworkConfig,

    /// Wallet keypair configuration
    pub wallet: WalletConfig,

    /// Confirmation wait configuration
    pub confirm: ConfirmConfig,

    /// Logging configuration
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// RPC endpoint of the target cluster
    pub rpc_url: String,

    /// RPC request timeout in milliseconds
    pub rpc_timeout_ms: u64,

    /// Commitment level for queries and confirmation
    pub commitment: String,
}

impl NetworkConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmConfig {
    /// Bounded wait for confirmation in milliseconds
    pub confirm_timeout_ms: u64,

    /// Interval between confirmation polls in milliseconds
    pub poll_interval_ms: u64,
}

impl ConfirmConfig {
    pub fn policy(&self) -> ConfirmPolicy {
        ConfirmPolicy {
            confirm_timeout: Duration::from_millis(self.confirm_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit log lines as JSON
    pub json_logging: bool,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| FlowError::Config(config::ConfigError::Message(e.to_string())))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder();

        settings = settings.add_source(config::File::with_name("config/default").required(false));

        if let Ok(env) = std::env::var("SOLFLOW_ENV") {
            settings = settings
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        settings = settings.add_source(config::File::with_name("config/local").required(false));

        settings = settings.add_source(
            config::Environment::with_prefix("SOLFLOW")
                .prefix_separator("_")
                .separator("__"),
        );

        let config: Config = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.network.rpc_url.is_empty() {
            return Err(FlowError::Config(config::ConfigError::Message(
                "An RPC endpoint must be configured".to_string(),
            )));
        }

        parse_commitment(&self.network.commitment)?;

        if self.network.rpc_timeout_ms == 0 {
            return Err(FlowError::Config(config::ConfigError::Message(
                "RPC timeout must be positive".to_string(),
            )));
        }

        if self.confirm.confirm_timeout_ms == 0 {
            return Err(FlowError::Config(config::ConfigError::Message(
                "Confirmation timeout must be positive".to_string(),
            )));
        }

        if self.confirm.poll_interval_ms == 0
            || self.confirm.poll_interval_ms >= self.confirm.confirm_timeout_ms
        {
            return Err(FlowError::Config(config::ConfigError::Message(
                "Poll interval must be shorter than the confirmation timeout".to_string(),
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig {
                rpc_url: crate::defaults::RPC_URL.to_string(),
                rpc_timeout_ms: crate::defaults::RPC_TIMEOUT.as_millis() as u64,
                commitment: crate::defaults::COMMITMENT.to_string(),
            },
            wallet: WalletConfig::default(),
            confirm: ConfirmConfig {
                confirm_timeout_ms: crate::defaults::CONFIRM_TIMEOUT.as_millis() as u64,
                poll_interval_ms: crate::defaults::CONFIRM_POLL_INTERVAL.as_millis() as u64,
            },
            monitoring: MonitoringConfig {
                log_level: "info".to_string(),
                json_logging: false,
            },
        }
    }
}
