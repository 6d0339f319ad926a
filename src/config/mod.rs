//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! faucet.toml (optional)
//!     → loader.rs (parse, apply FAUCET_* env overrides)
//!     → validation.rs (semantic checks)
//!     → FaucetConfig (validated, immutable)
//!     → SessionSettings / RpcDetector / ArtifactLoader
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{ContractConfig, FaucetConfig, ObservabilityConfig, ProviderConfig, TransactionConfig};
