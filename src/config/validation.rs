//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are collected
//! and returned together rather than stopping at the first one.

use alloy::primitives::{Address, U256};

use crate::config::schema::FaucetConfig;
use crate::units::to_wei;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &FaucetConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut fail = |field, message: String| errors.push(ValidationError { field, message });

    if let Some(rpc_url) = &config.provider.rpc_url {
        if let Err(e) = rpc_url.parse::<url::Url>() {
            fail("provider.rpc_url", format!("invalid URL '{}': {}", rpc_url, e));
        }
    }
    if config.provider.detect_timeout_secs == 0 {
        fail("provider.detect_timeout_secs", "must be greater than 0".into());
    }
    if config.provider.rpc_timeout_secs == 0 {
        fail("provider.rpc_timeout_secs", "must be greater than 0".into());
    }
    if config.provider.event_poll_interval_ms == 0 {
        fail("provider.event_poll_interval_ms", "must be greater than 0".into());
    }

    if config.contract.name.trim().is_empty() {
        fail("contract.name", "must not be empty".into());
    }
    if let Some(address) = &config.contract.address {
        if address.parse::<Address>().is_err() {
            fail("contract.address", format!("invalid address '{}'", address));
        }
    }

    for (field, amount) in [
        ("transactions.deposit_ether", &config.transactions.deposit_ether),
        ("transactions.withdraw_ether", &config.transactions.withdraw_ether),
    ] {
        match to_wei(amount) {
            Ok(wei) if wei == U256::ZERO => fail(field, "must be greater than 0".into()),
            Ok(_) => {}
            Err(e) => fail(field, e.to_string()),
        }
    }
    if config.transactions.confirmation_timeout_secs == 0 {
        fail("transactions.confirmation_timeout_secs", "must be greater than 0".into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
