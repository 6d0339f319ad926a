//! JSON-RPC wallet provider.
//!
//! # Responsibilities
//! - Detect a wallet node at the configured endpoint (single probe, bounded)
//! - Forward account, balance and transaction requests with timeouts
//! - Raise `accountsChanged` / `chainChanged` by sampling the node, since
//!   HTTP JSON-RPC has no push notifications

use std::borrow::Cow;
use std::fmt;
use std::future::IntoFuture;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportError;
use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout};

use crate::config::ProviderConfig;
use crate::error::{FaucetError, FaucetResult};
use crate::provider::{
    Listener, ListenerId, ListenerRegistry, ProviderDetector, ProviderEvent, ProviderEventKind,
    TransactionOutcome, WalletProvider,
};

/// JSON-RPC "method not found".
const METHOD_NOT_FOUND: i64 = -32601;

fn is_method_not_found(error: &TransportError) -> bool {
    error
        .as_error_resp()
        .is_some_and(|payload| payload.code == METHOD_NOT_FOUND)
}

/// Wallet provider backed by a node that holds the user's unlocked accounts.
pub struct RpcWalletProvider {
    inner: DynProvider,
    rpc_url: String,
    timeout_duration: Duration,
    confirmation_timeout: Duration,
    poll_interval: Duration,
    listeners: Arc<ListenerRegistry>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl RpcWalletProvider {
    /// Build a provider for the configured endpoint. No request is made.
    pub fn connect(config: &ProviderConfig, confirmation_timeout_secs: u64) -> FaucetResult<Self> {
        let rpc_url = config
            .rpc_url
            .clone()
            .ok_or(FaucetError::DiscoveryAbsent)?;
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| FaucetError::Rpc(format!("Invalid RPC URL '{}': {}", rpc_url, e)))?;
        if config.event_poll_interval_ms == 0 {
            return Err(FaucetError::Config(
                "event_poll_interval_ms must be greater than 0".into(),
            ));
        }

        Ok(Self {
            inner: ProviderBuilder::new().connect_http(url).erased(),
            rpc_url,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            confirmation_timeout: Duration::from_secs(confirmation_timeout_secs),
            poll_interval: Duration::from_millis(config.event_poll_interval_ms),
            listeners: Arc::new(ListenerRegistry::new()),
            watcher: Mutex::new(None),
        })
    }

    async fn call<T, E, F>(&self, fut: F) -> FaucetResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: fmt::Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(FaucetError::Rpc(e.to_string())),
            Err(_) => Err(FaucetError::Timeout(self.timeout_duration.as_secs())),
        }
    }

    fn ensure_watcher(&self) {
        let Ok(mut watcher) = self.watcher.lock() else {
            return;
        };
        if watcher.is_some() {
            return;
        }

        *watcher = Some(tokio::spawn(watch_wallet(
            self.inner.clone(),
            self.listeners.clone(),
            self.poll_interval,
        )));
        tracing::debug!(rpc_url = %self.rpc_url, "Wallet event watcher started");
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> FaucetResult<Vec<Address>> {
        let params: [(); 0] = [];
        let requested = timeout(
            self.timeout_duration,
            self.inner
                .raw_request::<_, Vec<Address>>(Cow::Borrowed("eth_requestAccounts"), params),
        )
        .await;

        match requested {
            Ok(Ok(accounts)) => Ok(accounts),
            // Plain nodes do not implement eth_requestAccounts; their accounts are pre-authorized.
            Ok(Err(e)) if is_method_not_found(&e) => {
                tracing::debug!(error = %e, "eth_requestAccounts unavailable, falling back to eth_accounts");
                self.accounts().await
            }
            Ok(Err(e)) => Err(FaucetError::Rpc(e.to_string())),
            Err(_) => Err(FaucetError::Timeout(self.timeout_duration.as_secs())),
        }
    }

    async fn accounts(&self) -> FaucetResult<Vec<Address>> {
        self.call(self.inner.get_accounts()).await
    }

    async fn chain_id(&self) -> FaucetResult<u64> {
        self.call(self.inner.get_chain_id()).await
    }

    async fn network_id(&self) -> FaucetResult<u64> {
        self.call(self.inner.get_net_version()).await
    }

    async fn balance(&self, address: Address) -> FaucetResult<U256> {
        self.call(self.inner.get_balance(address)).await
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> FaucetResult<TransactionOutcome> {
        let pending = match timeout(self.timeout_duration, self.inner.send_transaction(tx)).await {
            Ok(Ok(pending)) => pending,
            Ok(Err(e)) => return Err(FaucetError::Transaction(e.to_string())),
            Err(_) => return Err(FaucetError::Timeout(self.timeout_duration.as_secs())),
        };

        let tx_hash = *pending.tx_hash();
        tracing::debug!(tx_hash = %tx_hash, "Transaction submitted, waiting for receipt");

        let receipt = match timeout(self.confirmation_timeout, pending.get_receipt()).await {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => return Err(FaucetError::Transaction(e.to_string())),
            Err(_) => return Err(FaucetError::Timeout(self.confirmation_timeout.as_secs())),
        };

        if !receipt.status() {
            return Err(FaucetError::Reverted(tx_hash.to_string()));
        }

        Ok(TransactionOutcome {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
        })
    }

    fn on(&self, kind: ProviderEventKind, listener: Listener) -> ListenerId {
        let id = self.listeners.register(kind, listener);
        self.ensure_watcher();
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

impl Drop for RpcWalletProvider {
    fn drop(&mut self) {
        if let Ok(mut watcher) = self.watcher.lock() {
            if let Some(handle) = watcher.take() {
                handle.abort();
            }
        }
    }
}

impl fmt::Debug for RpcWalletProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcWalletProvider")
            .field("rpc_url", &self.rpc_url)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Sample accounts and chain id, dispatching an event whenever either changes.
async fn watch_wallet(inner: DynProvider, listeners: Arc<ListenerRegistry>, poll_interval: Duration) {
    let mut ticker = interval(poll_interval);
    let mut last_accounts: Option<Vec<Address>> = None;
    let mut last_chain: Option<u64> = None;

    loop {
        ticker.tick().await;

        match inner.get_accounts().await {
            Ok(accounts) => {
                if last_accounts.as_ref().is_some_and(|prev| *prev != accounts) {
                    tracing::info!(accounts = accounts.len(), "Wallet accounts changed");
                    listeners.dispatch(&ProviderEvent::AccountsChanged(accounts.clone()));
                }
                last_accounts = Some(accounts);
            }
            Err(e) => tracing::debug!(error = %e, "Account sample failed"),
        }

        match inner.get_chain_id().await {
            Ok(chain_id) => {
                if last_chain.is_some_and(|prev| prev != chain_id) {
                    tracing::info!(chain_id = chain_id, "Wallet chain changed");
                    listeners.dispatch(&ProviderEvent::ChainChanged(chain_id));
                }
                last_chain = Some(chain_id);
            }
            Err(e) => tracing::debug!(error = %e, "Chain sample failed"),
        }
    }
}

/// Detects a wallet node at the configured endpoint.
#[derive(Debug, Clone)]
pub struct RpcDetector {
    config: ProviderConfig,
    confirmation_timeout_secs: u64,
}

impl RpcDetector {
    pub fn new(config: ProviderConfig, confirmation_timeout_secs: u64) -> Self {
        Self {
            config,
            confirmation_timeout_secs,
        }
    }
}

#[async_trait]
impl ProviderDetector for RpcDetector {
    async fn detect(&self) -> Option<Arc<dyn WalletProvider>> {
        let Some(rpc_url) = self.config.rpc_url.as_deref() else {
            tracing::info!("No wallet endpoint configured");
            return None;
        };

        let provider = match RpcWalletProvider::connect(&self.config, self.confirmation_timeout_secs) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!(rpc_url = %rpc_url, error = %e, "Wallet endpoint unusable");
                return None;
            }
        };

        let probe = timeout(
            Duration::from_secs(self.config.detect_timeout_secs),
            provider.inner.get_chain_id(),
        )
        .await;

        match probe {
            Ok(Ok(chain_id)) => {
                tracing::info!(rpc_url = %rpc_url, chain_id = chain_id, "Wallet provider detected");
                Some(Arc::new(provider))
            }
            Ok(Err(e)) => {
                tracing::warn!(rpc_url = %rpc_url, error = %e, "Wallet provider not reachable");
                None
            }
            Err(_) => {
                tracing::warn!(rpc_url = %rpc_url, "Wallet provider detection timed out");
                None
            }
        }
    }
}
