//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::FaucetConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `provider.rpc_url`.
pub const RPC_URL_ENV_VAR: &str = "FAUCET_RPC_URL";

/// Overrides `contract.address`.
pub const CONTRACT_ADDRESS_ENV_VAR: &str = "FAUCET_CONTRACT_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<FaucetConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: FaucetConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the file if it exists, otherwise start from defaults.
///
/// Environment overrides and validation apply in both cases.
pub fn load_or_default(path: &Path) -> Result<FaucetConfig, ConfigError> {
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "Config file not found, using defaults");
    let mut config = FaucetConfig::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides using the given lookup.
pub fn apply_env_overrides<F>(config: &mut FaucetConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(RPC_URL_ENV_VAR).filter(|v| !v.is_empty()) {
        config.provider.rpc_url = Some(url);
    }
    if let Some(address) = lookup(CONTRACT_ADDRESS_ENV_VAR).filter(|v| !v.is_empty()) {
        config.contract.address = Some(address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_file() {
        let path = std::env::temp_dir().join("faucet_client_loader_test.toml");
        fs::write(
            &path,
            r#"
            [contract]
            name = "Faucet"
            artifacts_dir = "build/contracts"

            [transactions]
            withdraw_ether = "0.25"
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.contract.artifacts_dir, "build/contracts");
        assert_eq!(config.transactions.withdraw_ether, "0.25");

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_invalid_file_reports_validation() {
        let path = std::env::temp_dir().join("faucet_client_loader_invalid.toml");
        fs::write(&path, "[transactions]\ndeposit_ether = \"lots\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("transactions.deposit_ether"));

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_env_overrides() {
        let mut config = FaucetConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            RPC_URL_ENV_VAR => Some("http://127.0.0.1:8545".to_string()),
            CONTRACT_ADDRESS_ENV_VAR => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.provider.rpc_url.as_deref(), Some("http://127.0.0.1:8545"));
        assert!(config.contract.address.is_none());
    }
}
