//! Truffle artifact loading.
//!
//! Resolves `{artifacts_dir}/{name}.json` and picks the deployment address
//! recorded for the provider's network, like `TruffleContract.deployed()`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ContractConfig;
use crate::contract::{ContractHandle, ContractLoader, RpcFaucetContract};
use crate::error::{FaucetError, FaucetResult};
use crate::provider::WalletProvider;

/// Subset of a truffle build artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct TruffleArtifact {
    #[serde(rename = "contractName", default)]
    pub contract_name: Option<String>,

    /// Deployments keyed by network id.
    #[serde(default)]
    pub networks: HashMap<String, NetworkDeployment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkDeployment {
    pub address: Address,
}

impl TruffleArtifact {
    /// Deployment for the given network id, falling back to the chain id key.
    pub fn deployment(&self, network_id: u64, chain_id: u64) -> Option<Address> {
        self.networks
            .get(&network_id.to_string())
            .or_else(|| self.networks.get(&chain_id.to_string()))
            .map(|d| d.address)
    }
}

/// Loads faucet deployments from truffle artifacts on disk.
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    artifacts_dir: PathBuf,
    address_override: Option<Address>,
}

impl ArtifactLoader {
    pub fn new(artifacts_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifacts_dir: artifacts_dir.into(),
            address_override: None,
        }
    }

    pub fn from_config(config: &ContractConfig) -> FaucetResult<Self> {
        let address_override = config
            .address
            .as_deref()
            .map(|a| {
                a.parse::<Address>()
                    .map_err(|e| FaucetError::Config(format!("invalid contract address '{}': {}", a, e)))
            })
            .transpose()?;

        Ok(Self {
            artifacts_dir: PathBuf::from(&config.artifacts_dir),
            address_override,
        })
    }

    /// Use a fixed deployment address instead of the artifact's network table.
    pub fn with_address(mut self, address: Address) -> Self {
        self.address_override = Some(address);
        self
    }

    fn read_artifact(&self, name: &str) -> FaucetResult<TruffleArtifact> {
        let path = self.artifacts_dir.join(format!("{}.json", name));
        let content = std::fs::read_to_string(&path).map_err(|e| {
            FaucetError::ContractLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            FaucetError::ContractLoad(format!("malformed artifact {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl ContractLoader for ArtifactLoader {
    async fn load_contract(
        &self,
        name: &str,
        provider: Arc<dyn WalletProvider>,
    ) -> FaucetResult<Arc<dyn ContractHandle>> {
        let address = match self.address_override {
            Some(address) => address,
            None => {
                let artifact = self.read_artifact(name)?;
                let network_id = provider
                    .network_id()
                    .await
                    .map_err(|e| FaucetError::ContractLoad(e.to_string()))?;
                let chain_id = provider
                    .chain_id()
                    .await
                    .map_err(|e| FaucetError::ContractLoad(e.to_string()))?;

                artifact.deployment(network_id, chain_id).ok_or_else(|| {
                    FaucetError::ContractLoad(format!(
                        "{} has not been deployed to network {}",
                        name, network_id
                    ))
                })?
            }
        };

        tracing::info!(contract = name, address = %address, "Contract loaded");
        Ok(Arc::new(RpcFaucetContract::new(address, provider)))
    }
}
