//! Transaction executor: deposit and withdraw on behalf of the active account.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use tokio::sync::watch;

use crate::contract::ContractHandle;
use crate::error::{FaucetError, FaucetResult};
use crate::observability::metrics;
use crate::provider::TransactionOutcome;
use crate::session::state::{ReloadSignal, WalletClientState};

/// Issues faucet calls and raises the reload signal once they are mined.
///
/// Eligibility is checked by the caller; without an account or contract the
/// call simply fails.
#[derive(Clone)]
pub struct TransactionExecutor {
    wallet: watch::Receiver<WalletClientState>,
    account: watch::Receiver<Option<Address>>,
    reload: ReloadSignal,
    deposit_amount: U256,
    withdraw_amount: U256,
}

impl TransactionExecutor {
    pub fn new(
        wallet: watch::Receiver<WalletClientState>,
        account: watch::Receiver<Option<Address>>,
        reload: ReloadSignal,
        deposit_amount: U256,
        withdraw_amount: U256,
    ) -> Self {
        Self {
            wallet,
            account,
            reload,
            deposit_amount,
            withdraw_amount,
        }
    }

    fn context(&self) -> FaucetResult<(Arc<dyn ContractHandle>, Address)> {
        let contract = self
            .wallet
            .borrow()
            .contract()
            .cloned()
            .ok_or(FaucetError::NotConnected("contract not loaded"))?;
        let from = (*self.account.borrow()).ok_or(FaucetError::NotConnected("no active account"))?;
        Ok((contract, from))
    }

    /// Send the deposit amount (1 ether by default) to `addFunds()`.
    pub async fn deposit(&self) -> FaucetResult<TransactionOutcome> {
        let (contract, from) = self.context()?;
        let result = contract.add_funds(from, self.deposit_amount).await;
        self.finish("deposit", result)
    }

    /// Request the withdraw amount (0.1 ether by default) from `withdraw(uint256)`.
    pub async fn withdraw(&self) -> FaucetResult<TransactionOutcome> {
        let (contract, from) = self.context()?;
        let result = contract.withdraw(self.withdraw_amount, from).await;
        self.finish("withdraw", result)
    }

    fn finish(
        &self,
        kind: &'static str,
        result: FaucetResult<TransactionOutcome>,
    ) -> FaucetResult<TransactionOutcome> {
        match result {
            Ok(outcome) => {
                metrics::record_transaction(kind, true);
                tracing::info!(
                    kind = kind,
                    tx_hash = %outcome.tx_hash,
                    block_number = ?outcome.block_number,
                    "Transaction confirmed"
                );
                self.reload.raise();
                Ok(outcome)
            }
            Err(e) => {
                metrics::record_transaction(kind, false);
                tracing::error!(kind = kind, error = %e, "Transaction failed");
                Err(e)
            }
        }
    }

    pub fn deposit_amount(&self) -> U256 {
        self.deposit_amount
    }

    pub fn withdraw_amount(&self) -> U256 {
        self.withdraw_amount
    }
}
