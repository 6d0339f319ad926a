//! Application controller.
//!
//! Owns the current [`Session`] and replaces it wholesale whenever the wallet
//! reports an account or chain switch. Also exposes what the presentation
//! layer renders, via [`FaucetView`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::contract::ContractLoader;
use crate::error::{FaucetError, FaucetResult};
use crate::provider::{ProviderDetector, ProviderEvent, TransactionOutcome};
use crate::session::{Session, SessionSettings};

/// Snapshot of the rendered boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaucetView {
    pub discovery_complete: bool,
    pub provider_present: bool,
    pub account: Option<Address>,
    pub contract_balance: Option<String>,
    pub connection_eligible: bool,
    pub last_error: Option<String>,
}

impl fmt::Display for FaucetView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.discovery_complete {
            writeln!(f, "Looking for Web3...")?;
        } else {
            match (&self.account, self.provider_present) {
                (Some(account), _) => writeln!(f, "Account: {}", account)?,
                (None, false) => writeln!(f, "Account: Wallet is not detected! Install Metamask")?,
                (None, true) => writeln!(f, "Account: Connect to Metamask (run `faucet connect`)")?,
            }
        }

        writeln!(
            f,
            "Current Balance: {} ETH",
            self.contract_balance.as_deref().unwrap_or("")
        )?;

        if !self.connection_eligible {
            writeln!(f, "*Sign in to your wallet and connect to Ganache network")?;
        }
        if let Some(error) = &self.last_error {
            writeln!(f, "Error: {}", error)?;
        }
        Ok(())
    }
}

/// Controller for the wallet session lifecycle.
pub struct FaucetApp {
    settings: SessionSettings,
    detector: Arc<dyn ProviderDetector>,
    loader: Arc<dyn ContractLoader>,
    session: Session,
    next_session_id: u64,
    resets: u64,
    events_tx: mpsc::UnboundedSender<ProviderEvent>,
    events_rx: mpsc::UnboundedReceiver<ProviderEvent>,
}

impl FaucetApp {
    /// Create the controller with a fresh, not yet activated session.
    pub fn new(
        settings: SessionSettings,
        detector: Arc<dyn ProviderDetector>,
        loader: Arc<dyn ContractLoader>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let session = Session::new(0, &settings, detector.clone(), loader.clone(), events_tx.clone());

        Self {
            settings,
            detector,
            loader,
            session,
            next_session_id: 1,
            resets: 0,
            events_tx,
            events_rx,
        }
    }

    /// Run discovery for the current session.
    pub async fn start(&self) -> FaucetResult<()> {
        self.session.activate().await
    }

    /// Discard all derived state and rediscover from scratch.
    pub async fn reset(&mut self) -> FaucetResult<()> {
        let id = self.next_session_id;
        self.next_session_id += 1;
        self.resets += 1;

        // Replacing the session drops the old one, tearing down its tasks and listeners.
        self.session = Session::new(
            id,
            &self.settings,
            self.detector.clone(),
            self.loader.clone(),
            self.events_tx.clone(),
        );
        tracing::info!(session = id, "Session reset");
        self.session.activate().await
    }

    /// Wait for the next account or chain switch.
    pub async fn next_event(&mut self) -> Option<ProviderEvent> {
        self.events_rx.recv().await
    }

    /// Wait for the next switch and reset in response.
    pub async fn handle_next_event(&mut self) -> Option<FaucetResult<()>> {
        let event = self.next_event().await?;
        tracing::info!(event = event.kind().as_str(), "Wallet changed, reloading");
        Some(self.reset().await)
    }

    /// Ask the wallet to authorize an account.
    ///
    /// The wallet reports the outcome through `accountsChanged`, which resets the session.
    pub async fn connect(&self) -> FaucetResult<Vec<Address>> {
        let provider = self
            .session
            .wallet_state()
            .provider()
            .cloned()
            .ok_or(FaucetError::DiscoveryAbsent)?;
        let accounts = provider.request_accounts().await?;
        tracing::info!(accounts = accounts.len(), "Wallet connection requested");
        Ok(accounts)
    }

    pub async fn deposit(&self) -> FaucetResult<TransactionOutcome> {
        self.ensure_eligible()?;
        self.session.deposit().await
    }

    pub async fn withdraw(&self) -> FaucetResult<TransactionOutcome> {
        self.ensure_eligible()?;
        self.session.withdraw().await
    }

    fn ensure_eligible(&self) -> FaucetResult<()> {
        if self.session.connection_eligible() {
            return Ok(());
        }
        if !self.session.wallet_state().provider_present() {
            return Err(FaucetError::DiscoveryAbsent);
        }
        Err(FaucetError::NotConnected("sign in to your wallet first"))
    }

    /// Wait until the account resolves, for callers that act right after start.
    pub async fn wait_until_eligible(&self, limit: Duration) -> FaucetResult<()> {
        let state = self.session.wallet_state();
        if state.is_discovery_complete() && !state.provider_present() {
            return Err(FaucetError::DiscoveryAbsent);
        }

        let mut account = self.session.subscribe_account();
        let resolved = matches!(timeout(limit, account.wait_for(|a| a.is_some())).await, Ok(Ok(_)));
        if resolved && self.session.connection_eligible() {
            Ok(())
        } else {
            Err(FaucetError::NotConnected("no authorized account"))
        }
    }

    /// Wait until the balance has been loaded at least once.
    pub async fn wait_for_balance(&self, limit: Duration) -> Option<String> {
        let mut balance = self.session.subscribe_balance();
        let value = match timeout(limit, balance.wait_for(|b| b.is_some())).await {
            Ok(Ok(value)) => (*value).clone(),
            _ => None,
        };
        value
    }

    pub fn view(&self) -> FaucetView {
        let state = self.session.wallet_state();
        FaucetView {
            discovery_complete: state.is_discovery_complete(),
            provider_present: state.provider_present(),
            account: self.session.account(),
            contract_balance: self.session.contract_balance(),
            connection_eligible: self.session.connection_eligible(),
            last_error: self.session.last_error(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Number of resets since the controller was created.
    pub fn resets(&self) -> u64 {
        self.resets
    }
}
