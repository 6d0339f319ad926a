//! Balance cache: the contract's ether balance as a decimal string.
//!
//! Re-derives when the contract handle changes or the reload generation moves.
//! Queries run one at a time inside a single loop, so a slow query can never
//! overwrite the result of a newer one; reloads raised while a query is in
//! flight collapse into one follow-up query.

use std::sync::Arc;

use tokio::sync::watch;

use crate::contract::ContractHandle;
use crate::observability::metrics;
use crate::session::state::{Connection, ErrorSink, ErrorSource, WalletClientState};

/// Sole writer of the session's contract balance.
pub struct BalanceCache {
    wallet: watch::Receiver<WalletClientState>,
    reload: watch::Receiver<u64>,
    balance: watch::Sender<Option<String>>,
    errors: ErrorSink,
}

impl BalanceCache {
    pub fn new(
        wallet: watch::Receiver<WalletClientState>,
        reload: watch::Receiver<u64>,
        balance: watch::Sender<Option<String>>,
        errors: ErrorSink,
    ) -> Self {
        Self {
            wallet,
            reload,
            balance,
            errors,
        }
    }

    pub async fn run(mut self) {
        let mut last_contract: Option<Arc<dyn ContractHandle>> = None;
        let mut last_generation: Option<u64> = None;

        loop {
            let connection = self.wallet.borrow_and_update().connection().cloned();
            let generation = *self.reload.borrow_and_update();

            // Nothing to query until the contract is loaded.
            if let Some(connection) = connection {
                let contract_changed = !last_contract
                    .as_ref()
                    .is_some_and(|c| Arc::ptr_eq(c, &connection.contract));
                if contract_changed || last_generation != Some(generation) {
                    last_contract = Some(connection.contract.clone());
                    last_generation = Some(generation);
                    self.refresh(&connection, generation).await;
                }
            }

            tokio::select! {
                changed = self.wallet.changed() => if changed.is_err() { break },
                changed = self.reload.changed() => if changed.is_err() { break },
            }
        }
    }

    async fn refresh(&self, connection: &Connection, generation: u64) {
        let address = connection.contract.address();

        match connection.client.get_balance(address).await {
            Ok(wei) => {
                metrics::record_balance_query(true);
                let ether = connection.client.from_wei(wei);
                if let Ok(value) = ether.parse::<f64>() {
                    metrics::record_contract_balance(value);
                }
                tracing::info!(
                    contract = %address,
                    balance = %ether,
                    generation = generation,
                    "Contract balance loaded"
                );
                self.balance.send_replace(Some(ether));
                self.errors.clear(ErrorSource::Balance);
            }
            Err(e) => {
                metrics::record_balance_query(false);
                tracing::error!(contract = %address, error = %e, "Failed to load contract balance");
                self.errors.report(ErrorSource::Balance, e.to_string());
            }
        }
    }
}
