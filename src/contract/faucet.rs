//! Faucet contract calls submitted through the wallet provider.

use std::fmt;
use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use crate::contract::{ContractHandle, IFaucet};
use crate::error::FaucetResult;
use crate::provider::{TransactionOutcome, WalletProvider};

/// Faucet deployment driven by a wallet provider.
#[derive(Clone)]
pub struct RpcFaucetContract {
    address: Address,
    provider: Arc<dyn WalletProvider>,
}

impl RpcFaucetContract {
    pub fn new(address: Address, provider: Arc<dyn WalletProvider>) -> Self {
        Self { address, provider }
    }

    fn call_request(&self, from: Address, input: Vec<u8>) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(from)
            .with_to(self.address)
            .with_input(Bytes::from(input))
    }
}

#[async_trait]
impl ContractHandle for RpcFaucetContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn add_funds(&self, from: Address, value: U256) -> FaucetResult<TransactionOutcome> {
        let tx = self
            .call_request(from, IFaucet::addFundsCall {}.abi_encode())
            .with_value(value);

        tracing::info!(from = %from, contract = %self.address, value = %value, "Submitting addFunds");
        self.provider.send_transaction(tx).await
    }

    async fn withdraw(&self, amount: U256, from: Address) -> FaucetResult<TransactionOutcome> {
        let tx = self.call_request(
            from,
            IFaucet::withdrawCall {
                withdrawAmount: amount,
            }
            .abi_encode(),
        );

        tracing::info!(from = %from, contract = %self.address, amount = %amount, "Submitting withdraw");
        self.provider.send_transaction(tx).await
    }
}

impl fmt::Debug for RpcFaucetContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcFaucetContract")
            .field("address", &self.address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FaucetError;
    use crate::provider::{Listener, ListenerId, ProviderEventKind};
    use alloy::primitives::{address, TxKind, B256};
    use std::sync::Mutex;

    const FAUCET: Address = address!("0xfee0000000000000000000000000000000000001");
    const ALICE: Address = address!("0x00000000000000000000000000000000000a11ce");

    /// Records submitted transactions.
    #[derive(Debug, Default)]
    struct RecordingProvider {
        sent: Mutex<Vec<TransactionRequest>>,
        revert: bool,
    }

    #[async_trait]
    impl WalletProvider for RecordingProvider {
        async fn request_accounts(&self) -> FaucetResult<Vec<Address>> {
            Ok(vec![ALICE])
        }
        async fn accounts(&self) -> FaucetResult<Vec<Address>> {
            Ok(vec![ALICE])
        }
        async fn chain_id(&self) -> FaucetResult<u64> {
            Ok(1337)
        }
        async fn network_id(&self) -> FaucetResult<u64> {
            Ok(5777)
        }
        async fn balance(&self, _address: Address) -> FaucetResult<U256> {
            Ok(U256::ZERO)
        }
        async fn send_transaction(&self, tx: TransactionRequest) -> FaucetResult<TransactionOutcome> {
            self.sent.lock().unwrap().push(tx);
            if self.revert {
                return Err(FaucetError::Reverted("0xdead".into()));
            }
            Ok(TransactionOutcome {
                tx_hash: B256::repeat_byte(0xab),
                block_number: Some(7),
            })
        }
        fn on(&self, _kind: ProviderEventKind, _listener: Listener) -> ListenerId {
            0
        }
        fn remove_listener(&self, _id: ListenerId) {}
    }

    #[tokio::test]
    async fn test_add_funds_attaches_value() {
        let provider = Arc::new(RecordingProvider::default());
        let contract = RpcFaucetContract::new(FAUCET, provider.clone());
        let one_eth = U256::from(1_000_000_000_000_000_000u128);

        let outcome = contract.add_funds(ALICE, one_eth).await.unwrap();
        assert_eq!(outcome.block_number, Some(7));

        let sent = provider.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, Some(ALICE));
        assert_eq!(sent[0].to, Some(TxKind::Call(FAUCET)));
        assert_eq!(sent[0].value, Some(one_eth));
        assert_eq!(
            sent[0].input.input().cloned(),
            Some(Bytes::from(IFaucet::addFundsCall {}.abi_encode()))
        );
    }

    #[tokio::test]
    async fn test_withdraw_encodes_amount_without_value() {
        let provider = Arc::new(RecordingProvider::default());
        let contract = RpcFaucetContract::new(FAUCET, provider.clone());
        let tenth = U256::from(100_000_000_000_000_000u128);

        contract.withdraw(tenth, ALICE).await.unwrap();

        let sent = provider.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].value, None);
        let input = sent[0].input.input().cloned().unwrap();
        assert_eq!(&input[..4], IFaucet::withdrawCall::SELECTOR.as_slice());
        assert_eq!(
            input,
            Bytes::from(IFaucet::withdrawCall { withdrawAmount: tenth }.abi_encode())
        );
    }

    #[tokio::test]
    async fn test_revert_propagates() {
        let provider = Arc::new(RecordingProvider {
            revert: true,
            ..Default::default()
        });
        let contract = RpcFaucetContract::new(FAUCET, provider);

        let err = contract.withdraw(U256::from(1), ALICE).await.unwrap_err();
        assert!(matches!(err, FaucetError::Reverted(_)));
    }
}
