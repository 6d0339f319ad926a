//! Faucet contract bindings.
//!
//! # Data Flow
//! ```text
//! ContractLoader::load_contract("Faucet", provider)
//!     → artifact.rs (truffle JSON → deployment address for the network)
//!     → faucet.rs (ABI-encoded calls submitted through the provider)
//!     → Arc<dyn ContractHandle>
//! ```

pub mod artifact;
pub mod faucet;

use std::fmt;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::sol;
use async_trait::async_trait;

use crate::error::FaucetResult;
use crate::provider::{TransactionOutcome, WalletProvider};

pub use artifact::ArtifactLoader;
pub use faucet::RpcFaucetContract;

sol! {
    /// Entry points of the deployed faucet.
    interface IFaucet {
        /// Credit the attached value to the faucet.
        function addFunds() external payable;

        /// Send `withdrawAmount` wei from the faucet to the caller.
        function withdraw(uint256 withdrawAmount) external;
    }
}

/// A deployed faucet contract.
#[async_trait]
pub trait ContractHandle: Send + Sync + fmt::Debug {
    /// On-chain address of the deployment.
    fn address(&self) -> Address;

    /// Call `addFunds()` from `from`, attaching `value` wei.
    async fn add_funds(&self, from: Address, value: U256) -> FaucetResult<TransactionOutcome>;

    /// Call `withdraw(amount)` from `from` with no value attached.
    async fn withdraw(&self, amount: U256, from: Address) -> FaucetResult<TransactionOutcome>;
}

/// Resolves a named contract against a provider.
#[async_trait]
pub trait ContractLoader: Send + Sync {
    async fn load_contract(
        &self,
        name: &str,
        provider: Arc<dyn WalletProvider>,
    ) -> FaucetResult<Arc<dyn ContractHandle>>;
}
