//! Error taxonomy for the wallet session.

use thiserror::Error;

/// Errors that can occur while connecting to a wallet or talking to the faucet.
#[derive(Debug, Error)]
pub enum FaucetError {
    /// No wallet provider was found in the host environment.
    #[error("No wallet provider detected")]
    DiscoveryAbsent,

    /// The contract artifact could not be resolved for the current network.
    #[error("Contract load failed: {0}")]
    ContractLoad(String),

    /// Enumerating the authorized accounts failed.
    #[error("Account query failed: {0}")]
    AccountQuery(String),

    /// Reading the contract balance failed.
    #[error("Balance query failed: {0}")]
    BalanceQuery(String),

    /// The wallet rejected the transaction or the node failed to accept it.
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// The transaction was mined but reverted.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// A provider request timed out.
    #[error("Provider timeout after {0} seconds")]
    Timeout(u64),

    /// Any other JSON-RPC failure.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// An amount could not be converted between denominations.
    #[error("Unit conversion error: {0}")]
    Units(String),

    /// An action needed an account or contract that is not available.
    #[error("Not connected: {0}")]
    NotConnected(&'static str),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for session operations.
pub type FaucetResult<T> = Result<T, FaucetError>;
