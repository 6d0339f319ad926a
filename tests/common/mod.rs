//! In-memory wallet, detector and contract loader for lifecycle tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use tokio::sync::Notify;

use faucet_client::contract::{ContractHandle, ContractLoader, RpcFaucetContract};
use faucet_client::error::{FaucetError, FaucetResult};
use faucet_client::provider::{
    Listener, ListenerId, ListenerRegistry, ProviderDetector, ProviderEvent, ProviderEventKind,
    TransactionOutcome, WalletProvider,
};
use faucet_client::{FaucetApp, SessionSettings};

pub const FAUCET: Address = address!("000000000000000000000000000000000000fee0");
pub const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
pub const BOB: Address = address!("0000000000000000000000000000000000000b0b");

pub const WAIT: Duration = Duration::from_secs(2);

pub fn ether(amount: &str) -> U256 {
    alloy::primitives::utils::parse_ether(amount).unwrap()
}

/// Wallet that keeps balances in memory and executes faucet calls itself.
#[derive(Debug, Default)]
pub struct FakeWallet {
    balances: Mutex<HashMap<Address, U256>>,
    accounts: Mutex<Vec<Address>>,
    authorize_on_request: Mutex<Vec<Address>>,
    listeners: ListenerRegistry,
    pub balance_queries: AtomicUsize,
    pub account_queries: AtomicUsize,
    pub account_requests: AtomicUsize,
    pub transactions: Mutex<Vec<TransactionRequest>>,
    pub fail_accounts: AtomicBool,
    pub fail_balance: AtomicBool,
    pub fail_transactions: AtomicBool,
    pub balance_delay_ms: AtomicU64,
}

impl FakeWallet {
    /// A wallet with `account` authorized and the faucet holding `faucet_balance`.
    pub fn new(account: Option<Address>, faucet_balance: U256) -> Arc<Self> {
        let wallet = Self::default();
        wallet.set_balance(FAUCET, faucet_balance);
        wallet.set_accounts(account.into_iter().collect());
        Arc::new(wallet)
    }

    pub fn set_balance(&self, address: Address, value: U256) {
        self.balances.lock().unwrap().insert(address, value);
    }

    pub fn balance_of(&self, address: Address) -> U256 {
        self.balances.lock().unwrap().get(&address).copied().unwrap_or_default()
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().unwrap() = accounts;
    }

    /// Accounts the user will approve on the next `request_accounts`.
    pub fn approve_on_request(&self, accounts: Vec<Address>) {
        *self.authorize_on_request.lock().unwrap() = accounts;
    }

    /// Simulate the user switching account or network.
    pub fn emit(&self, event: ProviderEvent) -> usize {
        self.listeners.dispatch(&event)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn balance_queries(&self) -> usize {
        self.balance_queries.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.transactions.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn request_accounts(&self) -> FaucetResult<Vec<Address>> {
        self.account_requests.fetch_add(1, Ordering::SeqCst);
        let approved = self.authorize_on_request.lock().unwrap().clone();
        self.set_accounts(approved.clone());
        self.emit(ProviderEvent::AccountsChanged(approved.clone()));
        Ok(approved)
    }

    async fn accounts(&self) -> FaucetResult<Vec<Address>> {
        self.account_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_accounts.load(Ordering::SeqCst) {
            return Err(FaucetError::Rpc("wallet locked".into()));
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn chain_id(&self) -> FaucetResult<u64> {
        Ok(1337)
    }

    async fn network_id(&self) -> FaucetResult<u64> {
        Ok(5777)
    }

    async fn balance(&self, address: Address) -> FaucetResult<U256> {
        self.balance_queries.fetch_add(1, Ordering::SeqCst);
        let delay = self.balance_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_balance.load(Ordering::SeqCst) {
            return Err(FaucetError::Rpc("node down".into()));
        }
        Ok(self.balance_of(address))
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> FaucetResult<TransactionOutcome> {
        let index = {
            let mut sent = self.transactions.lock().unwrap();
            sent.push(tx.clone());
            sent.len()
        };
        if self.fail_transactions.load(Ordering::SeqCst) {
            return Err(FaucetError::Reverted("execution reverted".into()));
        }

        let to = tx.to.and_then(|kind| kind.to().copied()).unwrap();
        let value = tx.value.unwrap_or_default();
        let mut balances = self.balances.lock().unwrap();
        let entry = balances.entry(to).or_default();
        if value > U256::ZERO {
            *entry += value;
        } else {
            // withdraw(uint256): selector followed by the amount word
            let input = tx.input.input().unwrap();
            *entry -= U256::from_be_slice(&input[4..36]);
        }

        Ok(TransactionOutcome {
            tx_hash: TxHash::repeat_byte(index as u8),
            block_number: Some(index as u64),
        })
    }

    fn on(&self, kind: ProviderEventKind, listener: Listener) -> ListenerId {
        self.listeners.register(kind, listener)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

/// Detector returning a fixed wallet, or none.
pub struct FakeDetector {
    wallet: Option<Arc<FakeWallet>>,
    pub detections: AtomicUsize,
}

impl FakeDetector {
    pub fn new(wallet: Option<Arc<FakeWallet>>) -> Arc<Self> {
        Arc::new(Self {
            wallet,
            detections: AtomicUsize::new(0),
        })
    }

    pub fn detections(&self) -> usize {
        self.detections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderDetector for FakeDetector {
    async fn detect(&self) -> Option<Arc<dyn WalletProvider>> {
        self.detections.fetch_add(1, Ordering::SeqCst);
        self.wallet
            .clone()
            .map(|wallet| wallet as Arc<dyn WalletProvider>)
    }
}

/// Loader binding the faucet at [`FAUCET`], optionally held back or failing.
#[derive(Default)]
pub struct FakeLoader {
    pub loads: AtomicUsize,
    pub fail: AtomicBool,
    pub gate: Option<Arc<Notify>>,
}

impl FakeLoader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        let loader = Self::default();
        loader.fail.store(true, Ordering::SeqCst);
        Arc::new(loader)
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContractLoader for FakeLoader {
    async fn load_contract(
        &self,
        name: &str,
        provider: Arc<dyn WalletProvider>,
    ) -> FaucetResult<Arc<dyn ContractHandle>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(FaucetError::ContractLoad(format!(
                "{} has not been deployed to network 5777",
                name
            )));
        }
        Ok(Arc::new(RpcFaucetContract::new(FAUCET, provider)))
    }
}

/// Poll `check` until it holds or [`WAIT`] elapses.
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

pub fn app(detector: Arc<FakeDetector>, loader: Arc<FakeLoader>) -> FaucetApp {
    FaucetApp::new(SessionSettings::default(), detector, loader)
}
