//! Connection gate: may the user transact?

use alloy::primitives::Address;

use crate::session::state::WalletClientState;

/// True iff an account is authorized and the contract is loaded.
pub fn connection_eligible(account: Option<&Address>, state: &WalletClientState) -> bool {
    account.is_some() && state.contract().is_some()
}
