//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML config file.
//! Every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the faucet client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FaucetConfig {
    /// Wallet provider discovery and RPC settings.
    pub provider: ProviderConfig,

    /// Which contract to load and where its artifacts live.
    pub contract: ContractConfig,

    /// Deposit/withdraw amounts and confirmation policy.
    pub transactions: TransactionConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Wallet provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// JSON-RPC endpoint of the wallet node. No URL means no provider is injected.
    pub rpc_url: Option<String>,

    /// How long discovery waits for the provider to answer, in seconds.
    pub detect_timeout_secs: u64,

    /// Per-request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Interval between account/chain samples used to raise change events.
    pub event_poll_interval_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            detect_timeout_secs: 3,
            rpc_timeout_secs: 10,
            event_poll_interval_ms: 1000,
        }
    }
}

/// Contract loading configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Contract name; the artifact is `{artifacts_dir}/{name}.json`.
    pub name: String,

    /// Directory holding truffle build artifacts.
    pub artifacts_dir: String,

    /// Explicit deployment address, bypassing the artifact network lookup.
    pub address: Option<String>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            name: "Faucet".to_string(),
            artifacts_dir: "public/contracts".to_string(),
            address: None,
        }
    }
}

/// Transaction configuration.
///
/// The faucet deposits exactly 1 ether and withdraws exactly 0.1 ether. The
/// amounts are exposed only so development chains with a modified contract
/// can be exercised; production configs should leave them unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Ether sent with each deposit. Defaults to "1".
    pub deposit_ether: String,

    /// Ether requested by each withdrawal. Defaults to "0.1".
    pub withdraw_ether: String,

    /// Maximum time to wait for a receipt, in seconds.
    pub confirmation_timeout_secs: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            deposit_ether: "1".to_string(),
            withdraw_ether: "0.1".to_string(),
            confirmation_timeout_secs: 120,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Bind address of the scrape endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "faucet_client=info,faucet=info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}
