//! Submission and confirmation tracking for wallet operations
//!
//! One tracker drives one logical user action (the airdrop form, the balance
//! card, the transfer form). Transitions run strictly forward:
//!
//! ```text
//! Idle -> Building -> Submitted -> { Confirmed | Failed }
//! ```
//!
//! Balance queries have no correlation handle; they confirm synchronously
//! with the fetched value and skip `Submitted`. Airdrops and transfers are
//! only reported successful after the network confirms their signature at
//! the connection's commitment level, under a bounded wait. A transaction
//! accepted into the in-flight pool is not yet final.

use crate::connection::LedgerConnection;
use crate::error::{ErrorKind, FlowError, Result};
use crate::parse::{format_sol, parse_optional_address, parse_optional_amount};
use crate::request::{OperationRequest, RequestBuilder};
use crate::reporter::StatusReporter;
use crate::wallet::WalletSigner;
use serde::Serialize;
use solana_sdk::signature::Signature;
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

/// Snapshot of one operation's lifecycle. Owned by the tracker; observers
/// only ever see clones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OperationStatus {
    Idle,
    Building,
    Submitted(Signature),
    Confirmed(OperationOutcome),
    Failed { kind: ErrorKind, detail: String },
}

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationStatus::Confirmed(_) | OperationStatus::Failed { .. }
        )
    }
}

/// Terminal result of a confirmed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OperationOutcome {
    AirdropConfirmed { signature: Signature, lamports: u64 },
    Balance { lamports: u64 },
    TransferConfirmed { signature: Signature, lamports: u64 },
}

/// Bounds on the confirmation wait
#[derive(Debug, Clone, Copy)]
pub struct ConfirmPolicy {
    /// Total budget for the confirmation wait; expiry marks the operation
    /// `Failed(Timeout)` instead of leaving it in `Submitted` forever.
    pub confirm_timeout: Duration,

    /// Interval between confirmation polls
    pub poll_interval: Duration,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            confirm_timeout: crate::defaults::CONFIRM_TIMEOUT,
            poll_interval: crate::defaults::CONFIRM_POLL_INTERVAL,
        }
    }
}

/// Drives one logical action from validated input through submission and
/// confirmation, reporting each transition to the status reporter.
///
/// Independent trackers share no mutable state; a balance refresh and a
/// transfer in flight at the same time cannot interfere. Within one tracker
/// a duplicate trigger while an operation is in flight is ignored, matching
/// the disabled-button semantics of the submitting form.
pub struct OperationTracker<C, S, R> {
    connection: Arc<C>,
    signer: Arc<S>,
    reporter: Arc<R>,
    policy: ConfirmPolicy,
    in_flight: AtomicBool,
    status: Mutex<OperationStatus>,
    last_balance: Mutex<Option<u64>>,
}

impl<C, S, R> OperationTracker<C, S, R>
where
    C: LedgerConnection,
    S: WalletSigner,
    R: StatusReporter,
{
    pub fn new(connection: Arc<C>, signer: Arc<S>, reporter: Arc<R>, policy: ConfirmPolicy) -> Self {
        Self {
            connection,
            signer,
            reporter,
            policy,
            in_flight: AtomicBool::new(false),
            status: Mutex::new(OperationStatus::Idle),
            last_balance: Mutex::new(None),
        }
    }

    /// Current status snapshot
    pub fn status(&self) -> OperationStatus {
        self.lock_status().clone()
    }

    /// Last confirmed balance in lamports. `None` means no balance has been
    /// fetched yet ("Not fetched"); a failed refresh leaves the previous
    /// value in place.
    pub fn last_balance(&self) -> Option<u64> {
        *self.lock_balance()
    }

    /// Entry point for the airdrop form: raw amount text straight from the
    /// input field.
    pub async fn submit_airdrop(&self, amount_text: &str) -> OperationStatus {
        if !self.begin() {
            return self.status();
        }
        let status = match self.build_airdrop(amount_text) {
            Ok(request) => self.drive(request).await,
            Err(error) => self.fail(error),
        };
        self.finish();
        status
    }

    /// Entry point for the balance card's refresh action.
    pub async fn refresh_balance(&self) -> OperationStatus {
        if !self.begin() {
            return self.status();
        }
        let status = match self.builder().balance() {
            Ok(request) => self.drive(request).await,
            Err(error) => self.fail(error),
        };
        self.finish();
        status
    }

    /// Entry point for the transfer form: raw recipient and amount text.
    pub async fn submit_transfer(&self, recipient_text: &str, amount_text: &str) -> OperationStatus {
        if !self.begin() {
            return self.status();
        }
        let status = match self.build_transfer(recipient_text, amount_text) {
            Ok(request) => self.drive(request).await,
            Err(error) => self.fail(error),
        };
        self.finish();
        status
    }

    /// Run a pre-built request, for callers that drive the request builder
    /// themselves.
    pub async fn run(&self, request: OperationRequest) -> OperationStatus {
        if !self.begin() {
            return self.status();
        }
        let status = self.drive(request).await;
        self.finish();
        status
    }

    fn builder(&self) -> RequestBuilder {
        RequestBuilder::new(self.signer.pubkey())
    }

    fn build_airdrop(&self, amount_text: &str) -> Result<OperationRequest> {
        let lamports = parse_optional_amount(amount_text)?;
        self.builder().airdrop(lamports)
    }

    fn build_transfer(&self, recipient_text: &str, amount_text: &str) -> Result<OperationRequest> {
        let recipient = parse_optional_address(recipient_text)?;
        let lamports = parse_optional_amount(amount_text)?;
        self.builder().transfer(recipient, lamports)
    }

    /// Re-entrancy guard: claims the in-flight flag, refusing duplicate
    /// triggers of the same logical action.
    fn begin(&self) -> bool {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("operation already in flight, ignoring duplicate trigger");
            return false;
        }
        true
    }

    fn finish(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }

    async fn drive(&self, request: OperationRequest) -> OperationStatus {
        debug!(operation = request.label(), "starting operation");
        self.transition(OperationStatus::Building);
        self.reporter.notify_pending(&pending_message(&request));

        match self.execute(request).await {
            Ok(status) => status,
            Err(error) => self.fail(error),
        }
    }

    async fn execute(&self, request: OperationRequest) -> Result<OperationStatus> {
        match request {
            OperationRequest::Balance { address } => {
                let lamports = self.connection.balance(&address).await?;
                *self.lock_balance() = Some(lamports);
                Ok(self.confirm(
                    OperationOutcome::Balance { lamports },
                    &format!("Balance: {} SOL", format_sol(lamports)),
                ))
            }
            OperationRequest::Airdrop { address, lamports } => {
                let signature = self.connection.request_airdrop(&address, lamports).await?;
                self.submitted(&signature, "Airdrop");
                self.await_confirmation(&signature).await?;
                Ok(self.confirm(
                    OperationOutcome::AirdropConfirmed { signature, lamports },
                    &format!(
                        "Airdrop of {} SOL confirmed: {signature}",
                        format_sol(lamports)
                    ),
                ))
            }
            OperationRequest::Transfer { from, to, lamports } => {
                let blockhash = self.connection.latest_blockhash().await?;
                let instruction = system_instruction::transfer(&from, &to, lamports);
                let mut transaction = Transaction::new_with_payer(&[instruction], Some(&from));
                self.signer.sign_transaction(&mut transaction, blockhash)?;

                let signature = self.connection.send_transaction(&transaction).await?;
                self.submitted(&signature, "Transaction");
                self.await_confirmation(&signature).await?;
                Ok(self.confirm(
                    OperationOutcome::TransferConfirmed { signature, lamports },
                    &format!("Transaction confirmed: {signature}"),
                ))
            }
        }
    }

    /// Poll for confirmation of `signature` until it reaches the commitment
    /// level or the bounded wait expires.
    async fn await_confirmation(&self, signature: &Signature) -> Result<()> {
        let poll = async {
            loop {
                if self.connection.is_confirmed(signature).await? {
                    return Ok::<(), FlowError>(());
                }
                tokio::time::sleep(self.policy.poll_interval).await;
            }
        };

        match tokio::time::timeout(self.policy.confirm_timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(FlowError::ConfirmationTimeout {
                signature: signature.to_string(),
                timeout_ms: self.policy.confirm_timeout.as_millis() as u64,
            }),
        }
    }

    fn submitted(&self, signature: &Signature, label: &str) {
        debug!(%signature, "submitted, awaiting confirmation");
        self.transition(OperationStatus::Submitted(*signature));
        self.reporter
            .notify_pending(&format!("{label} submitted: {signature}"));
    }

    fn confirm(&self, outcome: OperationOutcome, message: &str) -> OperationStatus {
        let status = OperationStatus::Confirmed(outcome);
        self.transition(status.clone());
        self.reporter.notify_success(message);
        status
    }

    fn fail(&self, error: FlowError) -> OperationStatus {
        let detail = error.to_string();
        warn!(kind = ?error.kind(), %detail, "operation failed");
        let status = OperationStatus::Failed {
            kind: error.kind(),
            detail: detail.clone(),
        };
        self.transition(status.clone());
        self.reporter.notify_error(&detail);
        status
    }

    fn transition(&self, status: OperationStatus) {
        *self.lock_status() = status;
    }

    fn lock_status(&self) -> MutexGuard<'_, OperationStatus> {
        self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_balance(&self) -> MutexGuard<'_, Option<u64>> {
        self.last_balance
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn pending_message(request: &OperationRequest) -> String {
    match request {
        OperationRequest::Airdrop { lamports, .. } => {
            format!("Requesting airdrop of {} SOL...", format_sol(*lamports))
        }
        OperationRequest::Balance { .. } => "Fetching balance...".to_string(),
        OperationRequest::Transfer { to, lamports, .. } => {
            format!("Sending {} SOL to {to}...", format_sol(*lamports))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::{EventKind, MemoryReporter};
    use crate::wallet::{DisconnectedWallet, KeypairSigner};
    use async_trait::async_trait;
    use solana_sdk::hash::Hash;
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::signature::Keypair;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct MockConnection {
        balance_results: Mutex<VecDeque<Result<u64>>>,
        /// Confirmation polls that must happen before `is_confirmed` is true
        confirm_polls: usize,
        never_confirm: bool,
        polls: AtomicUsize,
        calls: AtomicUsize,
        /// When set, `balance` blocks until notified
        gate: Option<Arc<Notify>>,
    }

    impl MockConnection {
        fn with_balance(lamports: u64) -> Self {
            let mock = Self::default();
            mock.balance_results
                .lock()
                .unwrap()
                .push_back(Ok(lamports));
            mock
        }

        fn push_balance(&self, result: Result<u64>) {
            self.balance_results.lock().unwrap().push_back(result);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LedgerConnection for MockConnection {
        async fn request_airdrop(&self, _address: &Pubkey, _lamports: u64) -> Result<Signature> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Signature::default())
        }

        async fn balance(&self, _address: &Pubkey) -> Result<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.balance_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(0))
        }

        async fn latest_blockhash(&self) -> Result<Hash> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Hash::default())
        }

        async fn send_transaction(&self, _transaction: &Transaction) -> Result<Signature> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Signature::default())
        }

        async fn is_confirmed(&self, _signature: &Signature) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.never_confirm {
                return Ok(false);
            }
            let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(poll > self.confirm_polls)
        }
    }

    type MockTracker<S> = OperationTracker<MockConnection, S, MemoryReporter>;

    fn fast_policy() -> ConfirmPolicy {
        ConfirmPolicy {
            confirm_timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(10),
        }
    }

    fn tracker(
        connection: MockConnection,
    ) -> (
        Arc<MockTracker<KeypairSigner>>,
        Arc<MockConnection>,
        Arc<MemoryReporter>,
    ) {
        let connection = Arc::new(connection);
        let signer = Arc::new(KeypairSigner::new(Keypair::new()));
        let reporter = Arc::new(MemoryReporter::new());
        let tracker = Arc::new(OperationTracker::new(
            connection.clone(),
            signer,
            reporter.clone(),
            fast_policy(),
        ));
        (tracker, connection, reporter)
    }

    fn disconnected_tracker(
        connection: MockConnection,
    ) -> (
        Arc<MockTracker<DisconnectedWallet>>,
        Arc<MockConnection>,
        Arc<MemoryReporter>,
    ) {
        let connection = Arc::new(connection);
        let reporter = Arc::new(MemoryReporter::new());
        let tracker = Arc::new(OperationTracker::new(
            connection.clone(),
            Arc::new(DisconnectedWallet),
            reporter.clone(),
            fast_policy(),
        ));
        (tracker, connection, reporter)
    }

    #[tokio::test]
    async fn balance_refresh_confirms_with_the_fetched_value() {
        let (tracker, _, reporter) = tracker(MockConnection::with_balance(2_500_000_000));

        let status = tracker.refresh_balance().await;
        assert_eq!(
            status,
            OperationStatus::Confirmed(OperationOutcome::Balance {
                lamports: 2_500_000_000
            })
        );
        assert_eq!(tracker.last_balance(), Some(2_500_000_000));
        assert_eq!(reporter.count(EventKind::Success), 1);
        assert!(reporter.messages(EventKind::Success)[0].contains("2.5"));
    }

    #[tokio::test]
    async fn balance_refresh_without_wallet_never_touches_the_network() {
        let (tracker, connection, reporter) = disconnected_tracker(MockConnection::default());

        let status = tracker.refresh_balance().await;
        assert!(matches!(
            status,
            OperationStatus::Failed {
                kind: ErrorKind::WalletNotConnected,
                ..
            }
        ));
        assert_eq!(connection.calls(), 0);
        assert_eq!(reporter.count(EventKind::Error), 1);
        assert_eq!(
            reporter.messages(EventKind::Error)[0],
            "Please connect your wallet."
        );
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_previous_balance() {
        let mock = MockConnection::with_balance(2_500_000_000);
        mock.push_balance(Err(FlowError::Network("node unreachable".to_string())));
        let (tracker, _, reporter) = tracker(mock);

        tracker.refresh_balance().await;
        assert_eq!(tracker.last_balance(), Some(2_500_000_000));

        let status = tracker.refresh_balance().await;
        assert!(matches!(
            status,
            OperationStatus::Failed {
                kind: ErrorKind::Network,
                ..
            }
        ));
        // The prior confirmed value survives the failure
        assert_eq!(tracker.last_balance(), Some(2_500_000_000));
        assert_eq!(reporter.count(EventKind::Error), 1);
    }

    #[tokio::test]
    async fn transfer_confirms_after_submission_and_polling() {
        let mock = MockConnection {
            confirm_polls: 2,
            ..MockConnection::default()
        };
        let (tracker, _, reporter) = tracker(mock);
        let recipient = Pubkey::new_unique().to_string();

        let status = tracker.submit_transfer(&recipient, "1.5").await;
        assert_eq!(
            status,
            OperationStatus::Confirmed(OperationOutcome::TransferConfirmed {
                signature: Signature::default(),
                lamports: 1_500_000_000,
            })
        );
        // Building + Submitted pending events, exactly one success
        assert_eq!(reporter.count(EventKind::Pending), 2);
        assert_eq!(reporter.count(EventKind::Success), 1);
        assert_eq!(reporter.count(EventKind::Error), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unconfirmed_transfer_times_out_instead_of_hanging() {
        let mock = MockConnection {
            never_confirm: true,
            ..MockConnection::default()
        };
        let (tracker, _, reporter) = tracker(mock);
        let recipient = Pubkey::new_unique().to_string();

        let status = tracker.submit_transfer(&recipient, "0.5").await;
        assert!(matches!(
            status,
            OperationStatus::Failed {
                kind: ErrorKind::Timeout,
                ..
            }
        ));
        assert_eq!(reporter.count(EventKind::Error), 1);
    }

    #[tokio::test]
    async fn airdrop_waits_for_confirmation_before_success() {
        let mock = MockConnection {
            confirm_polls: 1,
            ..MockConnection::default()
        };
        let (tracker, connection, reporter) = tracker(mock);

        let status = tracker.submit_airdrop("1.5").await;
        assert_eq!(
            status,
            OperationStatus::Confirmed(OperationOutcome::AirdropConfirmed {
                signature: Signature::default(),
                lamports: 1_500_000_000,
            })
        );
        // request_airdrop plus at least two confirmation polls
        assert!(connection.calls() >= 3);
        assert_eq!(reporter.count(EventKind::Success), 1);
    }

    #[tokio::test]
    async fn empty_airdrop_amount_is_rejected_before_the_network() {
        let (tracker, connection, reporter) = tracker(MockConnection::default());

        let status = tracker.submit_airdrop("").await;
        assert!(matches!(
            status,
            OperationStatus::Failed {
                kind: ErrorKind::Validation,
                ..
            }
        ));
        assert_eq!(connection.calls(), 0);
        assert_eq!(reporter.count(EventKind::Error), 1);
        assert_eq!(
            reporter.messages(EventKind::Error)[0],
            "Please select an amount to request."
        );
    }

    #[tokio::test]
    async fn missing_transfer_recipient_is_rejected_before_the_network() {
        let (tracker, connection, reporter) = tracker(MockConnection::default());

        let status = tracker.submit_transfer("", "1").await;
        assert!(matches!(
            status,
            OperationStatus::Failed {
                kind: ErrorKind::Validation,
                ..
            }
        ));
        assert_eq!(connection.calls(), 0);
        assert_eq!(
            reporter.messages(EventKind::Error)[0],
            "Please enter a recipient address."
        );
    }

    #[tokio::test]
    async fn malformed_transfer_recipient_is_rejected_before_the_network() {
        let (tracker, connection, _) = tracker(MockConnection::default());

        let status = tracker.submit_transfer("not-an-address", "1").await;
        assert!(matches!(
            status,
            OperationStatus::Failed {
                kind: ErrorKind::Validation,
                ..
            }
        ));
        assert_eq!(connection.calls(), 0);
    }

    #[tokio::test]
    async fn duplicate_trigger_is_ignored_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let mock = MockConnection {
            gate: Some(gate.clone()),
            ..MockConnection::with_balance(1_000_000_000)
        };
        let (tracker, connection, reporter) = tracker(mock);

        let first = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.refresh_balance().await }
        });

        // Wait for the first refresh to reach the blocked balance call
        while connection.calls() == 0 {
            tokio::task::yield_now().await;
        }

        let second = tracker.refresh_balance().await;
        assert_eq!(second, OperationStatus::Building);
        assert_eq!(connection.calls(), 1);
        assert_eq!(reporter.count(EventKind::Pending), 1);

        gate.notify_one();
        let first = first.await.unwrap();
        assert!(matches!(first, OperationStatus::Confirmed(_)));
        assert_eq!(reporter.count(EventKind::Success), 1);
    }

    #[tokio::test]
    async fn prebuilt_requests_run_through_the_same_machine() {
        let (tracker, _, reporter) = tracker(MockConnection::default());
        let wallet = tracker.signer.pubkey().unwrap();

        let request = RequestBuilder::new(Some(wallet))
            .transfer(Some(Pubkey::new_unique()), Some(500_000_000))
            .unwrap();
        let status = tracker.run(request).await;
        assert!(matches!(status, OperationStatus::Confirmed(_)));
        assert_eq!(reporter.count(EventKind::Success), 1);
    }

    #[tokio::test]
    async fn independent_trackers_do_not_interfere() {
        let (balance_tracker, _, balance_reporter) =
            tracker(MockConnection::with_balance(1_000_000_000));
        let (transfer_tracker, _, transfer_reporter) = tracker(MockConnection::default());
        let recipient = Pubkey::new_unique().to_string();

        let (balance_status, transfer_status) = tokio::join!(
            balance_tracker.refresh_balance(),
            transfer_tracker.submit_transfer(&recipient, "1"),
        );
        assert!(matches!(balance_status, OperationStatus::Confirmed(_)));
        assert!(matches!(transfer_status, OperationStatus::Confirmed(_)));
        assert_eq!(balance_reporter.count(EventKind::Success), 1);
        assert_eq!(transfer_reporter.count(EventKind::Success), 1);
    }
}
