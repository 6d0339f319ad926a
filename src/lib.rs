//! Faucet wallet client library.
//!
//! Connects a user's wallet to a deployed faucet contract, tracks the active
//! account and network, and keeps a cached contract balance in step with the
//! chain after deposits and withdrawals.

pub mod app;
pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod observability;
pub mod provider;
pub mod session;
pub mod units;

pub use app::{FaucetApp, FaucetView};
pub use client::ChainClient;
pub use config::FaucetConfig;
pub use error::{FaucetError, FaucetResult};
pub use session::{Session, SessionSettings};
