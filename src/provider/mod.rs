//! Wallet provider boundary.
//!
//! # Data Flow
//! ```text
//! ProviderDetector::detect() (single attempt)
//!     → Arc<dyn WalletProvider> or None ("install a wallet")
//!     → ChainClient (balances, accounts)
//!     → ContractLoader (contract handle bound to the provider)
//!     → on(accountsChanged | chainChanged) listeners
//! ```
//!
//! The provider is the only component that talks to the wallet: it lists
//! authorized accounts, signs and submits transactions, and notifies
//! listeners when the user switches account or network.

pub mod listeners;
pub mod rpc;

use std::fmt;
use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

use crate::error::FaucetResult;

pub use listeners::{Listener, ListenerId, ListenerRegistry};
pub use rpc::{RpcDetector, RpcWalletProvider};

/// Kinds of wallet lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderEventKind {
    AccountsChanged,
    ChainChanged,
}

impl ProviderEventKind {
    /// The EIP-1193 event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderEventKind::AccountsChanged => "accountsChanged",
            ProviderEventKind::ChainChanged => "chainChanged",
        }
    }
}

/// A wallet lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The set of authorized accounts changed.
    AccountsChanged(Vec<Address>),
    /// The wallet switched to another chain.
    ChainChanged(u64),
}

impl ProviderEvent {
    pub fn kind(&self) -> ProviderEventKind {
        match self {
            ProviderEvent::AccountsChanged(_) => ProviderEventKind::AccountsChanged,
            ProviderEvent::ChainChanged(_) => ProviderEventKind::ChainChanged,
        }
    }
}

/// A confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

/// An injected wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync + fmt::Debug {
    /// Ask the wallet to authorize accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> FaucetResult<Vec<Address>>;

    /// Accounts already authorized for this client (`eth_accounts`).
    async fn accounts(&self) -> FaucetResult<Vec<Address>>;

    /// Current chain id.
    async fn chain_id(&self) -> FaucetResult<u64>;

    /// Current network id (`net_version`), used to pick artifact deployments.
    async fn network_id(&self) -> FaucetResult<u64>;

    /// Native balance of `address` in wei.
    async fn balance(&self, address: Address) -> FaucetResult<U256>;

    /// Sign and submit a transaction, resolving once it is mined.
    ///
    /// A reverted transaction is an error.
    async fn send_transaction(&self, tx: TransactionRequest) -> FaucetResult<TransactionOutcome>;

    /// Register a listener for one kind of event.
    fn on(&self, kind: ProviderEventKind, listener: Listener) -> ListenerId;

    /// Remove a listener registered with [`WalletProvider::on`].
    fn remove_listener(&self, id: ListenerId);
}

/// Finds the wallet provider injected into the host environment.
#[async_trait]
pub trait ProviderDetector: Send + Sync {
    /// Single detection attempt. `None` means no wallet is installed.
    async fn detect(&self) -> Option<Arc<dyn WalletProvider>>;
}
