//! `faucet`: wallet client for a deployed faucet contract.
//!
//! # Architecture Overview
//!
//! ```text
//!   faucet.toml / FAUCET_* env
//!            │
//!            ▼
//!   ┌─────────────────────────────────────────────────────────────┐
//!   │ FaucetApp (controller)                                       │
//!   │                                                              │
//!   │   Session ──────────────────────────────────────────────┐    │
//!   │   │ ProviderGateway ── detect ──▶ RpcWalletProvider      │    │
//!   │   │        │            load ───▶ ArtifactLoader         │    │
//!   │   │        ▼                                             │    │
//!   │   │ WalletClientState ─▶ AccountTracker ─▶ account       │    │
//!   │   │        │           └▶ BalanceCache  ─▶ balance       │    │
//!   │   │        │                   ▲                         │    │
//!   │   │ TransactionExecutor ─ reload signal                  │    │
//!   │   └──────────────────────────────────────────────────────┘    │
//!   │        ▲ accountsChanged / chainChanged ⇒ new Session         │
//!   └─────────────────────────────────────────────────────────────┘
//!            │
//!            ▼
//!   FaucetView (stdout, text or JSON)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::time::timeout;

use faucet_client::config::load_or_default;
use faucet_client::contract::ArtifactLoader;
use faucet_client::observability::{logging, metrics};
use faucet_client::provider::RpcDetector;
use faucet_client::{FaucetApp, FaucetView, SessionSettings};

#[derive(Parser)]
#[command(name = "faucet")]
#[command(about = "Deposit to and withdraw from a faucet contract through your wallet", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "faucet.toml")]
    config: PathBuf,

    /// Wallet JSON-RPC endpoint, overriding the config file and FAUCET_RPC_URL
    #[arg(long)]
    rpc_url: Option<String>,

    /// Print the view as JSON
    #[arg(long)]
    json: bool,

    /// Seconds to wait for the account and balance to resolve
    #[arg(long, default_value_t = 10)]
    wait_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the account, contract balance and whether you can transact
    Status,
    /// Ask the wallet to authorize an account
    Connect,
    /// Donate the configured deposit (1 ETH by default)
    Deposit,
    /// Withdraw the configured amount (0.1 ETH by default)
    Withdraw,
    /// Follow balance changes and wallet switches until Ctrl-C
    Watch,
}

enum Action {
    Deposit,
    Withdraw,
}

enum Tick {
    Shutdown,
    WalletChanged(bool),
    Updated,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(&cli.config)?;
    if let Some(rpc_url) = cli.rpc_url {
        config.provider.rpc_url = Some(rpc_url);
    }

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "faucet starting");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let settings = SessionSettings::from_config(&config)?;
    let detector = Arc::new(RpcDetector::new(
        config.provider.clone(),
        config.transactions.confirmation_timeout_secs,
    ));
    let loader = Arc::new(ArtifactLoader::from_config(&config.contract)?);

    let mut app = FaucetApp::new(settings, detector, loader);
    app.start().await?;

    let wait = Duration::from_secs(cli.wait_secs);

    match cli.command {
        Commands::Status => {
            settle(&app, wait).await;
            print_view(&app.view(), cli.json)?;
        }
        Commands::Connect => {
            let accounts = app.connect().await?;
            if accounts.is_empty() {
                println!("The wallet did not authorize any account");
            }
            for account in accounts {
                println!("Authorized: {}", account);
            }
        }
        Commands::Deposit => transact(&app, Action::Deposit, wait, cli.json).await?,
        Commands::Withdraw => transact(&app, Action::Withdraw, wait, cli.json).await?,
        Commands::Watch => watch(&mut app, wait, cli.json).await?,
    }

    Ok(())
}

/// Give the derivations a chance to resolve before printing.
async fn settle(app: &FaucetApp, wait: Duration) {
    if app.view().provider_present {
        app.wait_for_balance(wait).await;
        let _ = app.wait_until_eligible(Duration::from_secs(1)).await;
    }
}

async fn transact(
    app: &FaucetApp,
    action: Action,
    wait: Duration,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    app.wait_until_eligible(wait).await?;
    app.wait_for_balance(wait).await;

    let mut balance = app.session().subscribe_balance();
    let outcome = match action {
        Action::Deposit => app.deposit().await?,
        Action::Withdraw => app.withdraw().await?,
    };
    println!("Transaction confirmed: {}", outcome.tx_hash);

    if timeout(wait, balance.changed()).await.is_err() {
        tracing::warn!("Balance did not refresh in time");
    }
    print_view(&app.view(), json)
}

async fn watch(app: &mut FaucetApp, wait: Duration, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    settle(app, wait).await;
    print_view(&app.view(), json)?;

    let mut account = app.session().subscribe_account();
    let mut balance = app.session().subscribe_balance();

    loop {
        let tick = tokio::select! {
            _ = tokio::signal::ctrl_c() => Tick::Shutdown,
            event = app.next_event() => Tick::WalletChanged(event.is_some()),
            Ok(()) = balance.changed() => Tick::Updated,
            Ok(()) = account.changed() => Tick::Updated,
        };

        match tick {
            Tick::Shutdown | Tick::WalletChanged(false) => break,
            Tick::WalletChanged(true) => {
                if let Err(e) = app.reset().await {
                    tracing::error!(error = %e, "Rediscovery failed");
                }
                account = app.session().subscribe_account();
                balance = app.session().subscribe_balance();
                settle(app, wait).await;
                print_view(&app.view(), json)?;
            }
            Tick::Updated => print_view(&app.view(), json)?,
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_view(view: &FaucetView, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        print!("{}", view);
    }
    Ok(())
}
