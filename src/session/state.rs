//! Session state shared between the gateway and its derivations.
//!
//! # Ownership
//! - `WalletClientState`: written only by the gateway
//! - account: written only by the account tracker
//! - balance: written only by the balance cache
//! - reload generation: raised only by the transaction executor
//!
//! Every value lives in a `tokio::sync::watch` channel, so readers always see
//! either the previous or the complete new value.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::client::ChainClient;
use crate::contract::ContractHandle;
use crate::provider::WalletProvider;

/// Which part of the session reported an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSource {
    Discovery,
    Account,
    Balance,
}

/// Where the session publishes failures for the presentation layer.
///
/// Each source holds at most one outstanding error, and a later success from
/// the same source clears it. The most recent outstanding error is the one shown.
#[derive(Debug, Clone)]
pub struct ErrorSink {
    tx: Arc<watch::Sender<Vec<(ErrorSource, String)>>>,
}

impl ErrorSink {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self { tx: Arc::new(tx) }
    }

    pub fn report(&self, source: ErrorSource, message: String) {
        self.tx.send_modify(|errors| {
            errors.retain(|(existing, _)| *existing != source);
            errors.push((source, message));
        });
    }

    pub fn clear(&self, source: ErrorSource) {
        self.tx.send_if_modified(|errors| {
            let before = errors.len();
            errors.retain(|(existing, _)| *existing != source);
            errors.len() != before
        });
    }

    pub fn latest(&self) -> Option<String> {
        self.tx.borrow().last().map(|(_, message)| message.clone())
    }
}

impl Default for ErrorSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Chain client and contract handle, always present together.
#[derive(Clone)]
pub struct Connection {
    pub client: Arc<ChainClient>,
    pub contract: Arc<dyn ContractHandle>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("contract", &self.contract.address())
            .finish()
    }
}

/// What discovery produced.
#[derive(Clone, Default)]
pub struct WalletClientState {
    provider: Option<Arc<dyn WalletProvider>>,
    discovery_complete: bool,
    connection: Option<Connection>,
}

impl WalletClientState {
    /// Discovery finished without finding a wallet.
    pub fn absent() -> Self {
        Self {
            provider: None,
            discovery_complete: true,
            connection: None,
        }
    }

    /// Discovery found a wallet and loaded the contract.
    pub fn found(provider: Arc<dyn WalletProvider>, connection: Connection) -> Self {
        Self {
            provider: Some(provider),
            discovery_complete: true,
            connection: Some(connection),
        }
    }

    pub fn is_discovery_complete(&self) -> bool {
        self.discovery_complete
    }

    pub fn provider(&self) -> Option<&Arc<dyn WalletProvider>> {
        self.provider.as_ref()
    }

    pub fn provider_present(&self) -> bool {
        self.provider.is_some()
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn client(&self) -> Option<&Arc<ChainClient>> {
        self.connection.as_ref().map(|c| &c.client)
    }

    pub fn contract(&self) -> Option<&Arc<dyn ContractHandle>> {
        self.connection.as_ref().map(|c| &c.contract)
    }
}

impl fmt::Debug for WalletClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletClientState")
            .field("provider_present", &self.provider.is_some())
            .field("discovery_complete", &self.discovery_complete)
            .field("connection", &self.connection)
            .finish()
    }
}

/// Cache-invalidation trigger for the balance.
///
/// The generation number carries no meaning beyond "it changed".
#[derive(Debug, Clone)]
pub struct ReloadSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl ReloadSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Advance the generation, waking every subscriber.
    pub fn raise(&self) {
        self.tx.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

impl Default for ReloadSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_discovering() {
        let state = WalletClientState::default();
        assert!(!state.is_discovery_complete());
        assert!(!state.provider_present());
        assert!(state.client().is_none());
        assert!(state.contract().is_none());
    }

    #[test]
    fn test_absent_completes_discovery() {
        let state = WalletClientState::absent();
        assert!(state.is_discovery_complete());
        assert!(!state.provider_present());
        assert!(state.connection().is_none());
    }

    #[test]
    fn test_error_sink_clears_per_source() {
        let errors = ErrorSink::new();
        assert_eq!(errors.latest(), None);

        errors.report(ErrorSource::Account, "account down".into());
        errors.report(ErrorSource::Balance, "balance down".into());
        assert_eq!(errors.latest().as_deref(), Some("balance down"));

        errors.clear(ErrorSource::Balance);
        assert_eq!(errors.latest().as_deref(), Some("account down"));

        errors.report(ErrorSource::Account, "still down".into());
        errors.clear(ErrorSource::Balance);
        assert_eq!(errors.latest().as_deref(), Some("still down"));

        errors.clear(ErrorSource::Account);
        assert_eq!(errors.latest(), None);
    }

    #[tokio::test]
    async fn test_reload_signal_wakes_subscribers() {
        let signal = ReloadSignal::new();
        let mut rx = signal.subscribe();
        assert_eq!(signal.generation(), 0);

        signal.raise();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);

        signal.raise();
        signal.raise();
        assert_eq!(signal.generation(), 3);
    }
}
