//! Provider gateway: discovery, client construction, contract load, listeners.

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};

use crate::client::ChainClient;
use crate::contract::ContractLoader;
use crate::error::FaucetResult;
use crate::observability::metrics;
use crate::provider::{
    ListenerId, ProviderDetector, ProviderEvent, ProviderEventKind, WalletProvider,
};
use crate::session::state::{Connection, WalletClientState};

/// Sole writer of [`WalletClientState`].
pub struct ProviderGateway {
    detector: Arc<dyn ProviderDetector>,
    loader: Arc<dyn ContractLoader>,
    contract_name: String,
    state: watch::Sender<WalletClientState>,
    resets: mpsc::UnboundedSender<ProviderEvent>,
    registrations: Mutex<Vec<(Arc<dyn WalletProvider>, ListenerId)>>,
}

impl ProviderGateway {
    pub fn new(
        detector: Arc<dyn ProviderDetector>,
        loader: Arc<dyn ContractLoader>,
        contract_name: impl Into<String>,
        state: watch::Sender<WalletClientState>,
        resets: mpsc::UnboundedSender<ProviderEvent>,
    ) -> Self {
        Self {
            detector,
            loader,
            contract_name: contract_name.into(),
            state,
            resets,
            registrations: Mutex::new(Vec::new()),
        }
    }

    /// Run discovery once.
    ///
    /// A missing wallet completes discovery with no provider. A contract load
    /// failure is returned to the caller and discovery stays incomplete.
    pub async fn activate(&self) -> FaucetResult<()> {
        if self.state.borrow().is_discovery_complete() {
            return Ok(());
        }

        let Some(provider) = self.detector.detect().await else {
            tracing::warn!("Wallet is not detected, please install one");
            self.state.send_replace(WalletClientState::absent());
            return Ok(());
        };

        let contract = self
            .loader
            .load_contract(&self.contract_name, provider.clone())
            .await?;
        self.arm_listeners(&provider);

        let client = Arc::new(ChainClient::new(provider.clone()));
        tracing::info!(
            contract = %self.contract_name,
            address = %contract.address(),
            "Wallet client ready"
        );
        self.state
            .send_replace(WalletClientState::found(provider, Connection { client, contract }));
        Ok(())
    }

    /// Account and chain switches both invalidate everything derived so far.
    fn arm_listeners(&self, provider: &Arc<dyn WalletProvider>) {
        let Ok(mut registrations) = self.registrations.lock() else {
            return;
        };

        for kind in [ProviderEventKind::AccountsChanged, ProviderEventKind::ChainChanged] {
            let resets = self.resets.clone();
            let id = provider.on(
                kind,
                Arc::new(move |event: &ProviderEvent| {
                    metrics::record_session_reset(event.kind().as_str());
                    let _ = resets.send(event.clone());
                }),
            );
            registrations.push((provider.clone(), id));
        }
    }

    /// Remove every listener this gateway registered.
    pub fn disarm(&self) {
        if let Ok(mut registrations) = self.registrations.lock() {
            for (provider, id) in registrations.drain(..) {
                provider.remove_listener(id);
            }
        }
    }
}
