//! Wallet session: one run of the discovery state machine.
//!
//! # Data Flow
//! ```text
//! ProviderGateway::activate()
//!     → WalletClientState (watch)
//!         ├→ AccountTracker  → account (watch)
//!         └→ BalanceCache    → balance (watch)
//!                 ▲
//! TransactionExecutor ──raise──┘ ReloadSignal
//! ```
//!
//! # States
//! ```text
//! Start → Discovering → NoProviderFound
//!                     → ProviderFound → ClientReady → (AccountResolved, BalanceResolved)*
//! ```
//! Account or chain switches never transition in place: the owning
//! [`crate::FaucetApp`] drops the session and starts a fresh one.

pub mod account;
pub mod balance;
pub mod executor;
pub mod gate;
pub mod gateway;
pub mod state;

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::FaucetConfig;
use crate::contract::ContractLoader;
use crate::error::FaucetResult;
use crate::observability::metrics;
use crate::provider::{ProviderDetector, ProviderEvent, TransactionOutcome};
use crate::units;

pub use account::AccountTracker;
pub use balance::BalanceCache;
pub use executor::TransactionExecutor;
pub use gate::connection_eligible;
pub use gateway::ProviderGateway;
pub use state::{Connection, ErrorSink, ErrorSource, ReloadSignal, WalletClientState};

/// Per-session parameters.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub contract_name: String,
    pub deposit_amount: U256,
    pub withdraw_amount: U256,
}

impl SessionSettings {
    pub fn from_config(config: &FaucetConfig) -> FaucetResult<Self> {
        Ok(Self {
            contract_name: config.contract.name.clone(),
            deposit_amount: units::to_wei(&config.transactions.deposit_ether)?,
            withdraw_amount: units::to_wei(&config.transactions.withdraw_ether)?,
        })
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            contract_name: "Faucet".to_string(),
            deposit_amount: U256::from(1_000_000_000_000_000_000u128),
            withdraw_amount: U256::from(100_000_000_000_000_000u128),
        }
    }
}

/// Everything derived from one discovery run.
///
/// Dropping the session aborts its derivations and removes its provider listeners.
pub struct Session {
    id: u64,
    gateway: ProviderGateway,
    wallet: watch::Receiver<WalletClientState>,
    account: watch::Receiver<Option<Address>>,
    balance: watch::Receiver<Option<String>>,
    errors: ErrorSink,
    reload: ReloadSignal,
    executor: TransactionExecutor,
    tasks: Vec<JoinHandle<()>>,
}

impl Session {
    /// Wire the session and start its derivations. Must run inside a Tokio runtime.
    pub fn new(
        id: u64,
        settings: &SessionSettings,
        detector: Arc<dyn ProviderDetector>,
        loader: Arc<dyn ContractLoader>,
        resets: mpsc::UnboundedSender<ProviderEvent>,
    ) -> Self {
        let (wallet_tx, wallet) = watch::channel(WalletClientState::default());
        let (account_tx, account) = watch::channel(None);
        let (balance_tx, balance) = watch::channel(None);
        let errors = ErrorSink::new();
        let reload = ReloadSignal::new();

        let tracker = AccountTracker::new(wallet.clone(), account_tx, errors.clone());
        let cache = BalanceCache::new(wallet.clone(), reload.subscribe(), balance_tx, errors.clone());
        let tasks = vec![tokio::spawn(tracker.run()), tokio::spawn(cache.run())];

        let executor = TransactionExecutor::new(
            wallet.clone(),
            account.clone(),
            reload.clone(),
            settings.deposit_amount,
            settings.withdraw_amount,
        );
        let gateway = ProviderGateway::new(detector, loader, settings.contract_name.clone(), wallet_tx, resets);

        metrics::record_session_started();
        tracing::debug!(session = id, "Session created");

        Self {
            id,
            gateway,
            wallet,
            account,
            balance,
            errors,
            reload,
            executor,
            tasks,
        }
    }

    /// Run provider discovery. Failures are also reported through `last_error`.
    pub async fn activate(&self) -> FaucetResult<()> {
        let result = self.gateway.activate().await;
        if let Err(e) = &result {
            tracing::error!(session = self.id, error = %e, "Wallet discovery failed");
            self.errors.report(ErrorSource::Discovery, e.to_string());
        }
        result
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn wallet_state(&self) -> WalletClientState {
        self.wallet.borrow().clone()
    }

    pub fn account(&self) -> Option<Address> {
        *self.account.borrow()
    }

    pub fn contract_balance(&self) -> Option<String> {
        self.balance.borrow().clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.errors.latest()
    }

    pub fn connection_eligible(&self) -> bool {
        connection_eligible(self.account.borrow().as_ref(), &self.wallet.borrow())
    }

    /// Receivers returned by `subscribe_*` have already seen the current value.
    pub fn subscribe_wallet(&self) -> watch::Receiver<WalletClientState> {
        let mut rx = self.wallet.clone();
        rx.borrow_and_update();
        rx
    }

    pub fn subscribe_account(&self) -> watch::Receiver<Option<Address>> {
        let mut rx = self.account.clone();
        rx.borrow_and_update();
        rx
    }

    pub fn subscribe_balance(&self) -> watch::Receiver<Option<String>> {
        let mut rx = self.balance.clone();
        rx.borrow_and_update();
        rx
    }

    pub fn reload_signal(&self) -> &ReloadSignal {
        &self.reload
    }

    pub fn executor(&self) -> &TransactionExecutor {
        &self.executor
    }

    pub async fn deposit(&self) -> FaucetResult<TransactionOutcome> {
        self.executor.deposit().await
    }

    pub async fn withdraw(&self) -> FaucetResult<TransactionOutcome> {
        self.executor.withdraw().await
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        self.gateway.disarm();
        tracing::debug!(session = self.id, "Session torn down");
    }
}
