//! solflow - Client-side Solana wallet operations
//!
//! Request devnet airdrops, query spendable balances, and submit SOL
//! transfers, tracking every operation from submission through network
//! confirmation. Success is only reported after the signature reaches the
//! configured commitment level; an operation that never confirms within the
//! bounded wait fails with a timeout instead of hanging.

pub mod config;
pub mod connection;
pub mod error;
pub mod monitoring;
pub mod parse;
pub mod reporter;
pub mod request;
pub mod tracker;
pub mod wallet;

// Re-export commonly used types
pub use config::Config;
pub use connection::{LedgerConnection, RpcConnection};
pub use error::{ErrorKind, FlowError, Result};
pub use reporter::{MemoryReporter, StatusReporter, TracingReporter};
pub use request::{OperationRequest, RequestBuilder};
pub use tracker::{ConfirmPolicy, OperationOutcome, OperationStatus, OperationTracker};
pub use wallet::{DisconnectedWallet, KeypairSigner, WalletConfig, WalletSigner};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// Devnet RPC endpoint, the cluster the flows target by default
    pub const RPC_URL: &str = "https://api.devnet.solana.com";

    /// Default commitment level for queries and confirmation
    pub const COMMITMENT: &str = "confirmed";

    /// Default RPC request timeout
    pub const RPC_TIMEOUT: Duration = Duration::from_secs(10);

    /// Bounded wait for confirmation of a submitted operation
    pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

    /// Interval between confirmation polls
    pub const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);
}
