//! Conversion between wei and ether.

use alloy::primitives::utils::parse_ether;
use alloy::primitives::U256;

use crate::error::{FaucetError, FaucetResult};

/// Decimals of the native currency.
pub const ETHER_DECIMALS: u32 = 18;

/// Format a wei amount as a trimmed ether decimal string ("2", "1.5").
pub fn from_wei(value: U256) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10).pow(U256::from(ETHER_DECIMALS));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }

    let fraction = format!("{:0>width$}", remainder, width = ETHER_DECIMALS as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Parse an ether decimal string into wei.
pub fn to_wei(amount: &str) -> FaucetResult<U256> {
    let amount = amount.trim();
    if amount.starts_with('-') {
        return Err(FaucetError::Units(format!("negative amount '{}'", amount)));
    }
    parse_ether(amount).map_err(|e| FaucetError::Units(format!("invalid amount '{}': {}", amount, e)))
}
