//! Account tracker: the first authorized account of the current client.

use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::watch;

use crate::client::ChainClient;
use crate::observability::metrics;
use crate::session::state::{ErrorSink, ErrorSource, WalletClientState};

/// Sole writer of the session's account.
pub struct AccountTracker {
    wallet: watch::Receiver<WalletClientState>,
    account: watch::Sender<Option<Address>>,
    errors: ErrorSink,
}

impl AccountTracker {
    pub fn new(
        wallet: watch::Receiver<WalletClientState>,
        account: watch::Sender<Option<Address>>,
        errors: ErrorSink,
    ) -> Self {
        Self {
            wallet,
            account,
            errors,
        }
    }

    /// Query accounts once per distinct client, until the wallet state is dropped.
    pub async fn run(mut self) {
        let mut current: Option<Arc<ChainClient>> = None;

        loop {
            let client = self.wallet.borrow_and_update().client().cloned();

            if let Some(client) = client {
                let is_new = !current.as_ref().is_some_and(|c| Arc::ptr_eq(c, &client));
                if is_new {
                    current = Some(client.clone());
                    self.refresh(&client).await;
                }
            }

            if self.wallet.changed().await.is_err() {
                break;
            }
        }
    }

    async fn refresh(&self, client: &ChainClient) {
        match client.get_accounts().await {
            Ok(accounts) => {
                metrics::record_account_query(true);
                let account = accounts.first().copied();
                match account {
                    Some(address) => tracing::info!(account = %address, "Active account resolved"),
                    None => tracing::info!("No authorized account, wallet not connected"),
                }
                self.account.send_replace(account);
                self.errors.clear(ErrorSource::Account);
            }
            Err(e) => {
                metrics::record_account_query(false);
                tracing::error!(error = %e, "Failed to load accounts");
                self.errors.report(ErrorSource::Account, e.to_string());
            }
        }
    }
}
