//! Chain client bound to a wallet provider.
//!
//! Turns the provider's raw requests into the operations the session needs:
//! balance lookups, account enumeration and unit conversion.

use std::fmt;
use std::sync::Arc;

use alloy::primitives::{Address, U256};

use crate::error::{FaucetError, FaucetResult};
use crate::provider::WalletProvider;
use crate::units;

/// High-level client over a [`WalletProvider`].
#[derive(Clone)]
pub struct ChainClient {
    provider: Arc<dyn WalletProvider>,
}

impl ChainClient {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self { provider }
    }

    /// Balance of `address` in wei.
    pub async fn get_balance(&self, address: Address) -> FaucetResult<U256> {
        self.provider
            .balance(address)
            .await
            .map_err(|e| FaucetError::BalanceQuery(e.to_string()))
    }

    /// Accounts the wallet has authorized for this client.
    pub async fn get_accounts(&self) -> FaucetResult<Vec<Address>> {
        self.provider
            .accounts()
            .await
            .map_err(|e| FaucetError::AccountQuery(e.to_string()))
    }

    /// Wei to an ether decimal string.
    pub fn from_wei(&self, value: U256) -> String {
        units::from_wei(value)
    }

    /// Ether decimal string to wei.
    pub fn to_wei(&self, amount: &str) -> FaucetResult<U256> {
        units::to_wei(amount)
    }

    /// The provider this client is bound to.
    pub fn provider(&self) -> &Arc<dyn WalletProvider> {
        &self.provider
    }
}

impl fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainClient")
            .field("provider", &self.provider)
            .finish()
    }
}
