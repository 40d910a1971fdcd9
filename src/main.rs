//! Soltix wallet CLI
//!
//! Connects a Solana wallet, restores its session and submits payments
//! from a terminal, using the same orchestrators a front end would.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                        WALLET CLIENT                         │
//!   │                                                              │
//!   │  ┌────────────┐   ┌──────────────┐   ┌──────────────────┐    │
//!   │  │ connection │──▶│   signing    │──▶│ extension | deep │────┼──▶ Wallet
//!   │  │  payment   │   │   channel    │   │ link (platform)  │    │
//!   │  └─────┬──────┘   └──────────────┘   └──────────────────┘    │
//!   │        │                                                     │
//!   │        ▼                                                     │
//!   │  ┌────────────┐   ┌──────────────┐                           │
//!   │  │   chain    │──▶│  rpc client  │───────────────────────────┼──▶ RPC node
//!   │  │  gateway   │   │  + failover  │                           │
//!   │  └────────────┘   └──────────────┘                           │
//!   │                                                              │
//!   │  ┌──────────────────────────────────────────────────────┐    │
//!   │  │ codec · session store · config · observability       │    │
//!   │  └──────────────────────────────────────────────────────┘    │
//!   └──────────────────────────────────────────────────────────────┘
//! ```

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use soltix_wallet::chain::gateway::{rpc_origin, DEFAULT_HISTORY_LIMIT};
use soltix_wallet::chain::Cluster;
use soltix_wallet::codec::{is_valid_address, Address};
use soltix_wallet::config::loader::load_config;
use soltix_wallet::config::Platform;
use soltix_wallet::observability::logging::init_logging;
use soltix_wallet::wallet::deeplink::{is_sign_callback, parse_signature_callback, ConsoleLinker};
use soltix_wallet::wallet::detector::NativeHost;
use soltix_wallet::wallet::providers::WALLET_PROVIDERS;
use soltix_wallet::wallet::{find_provider, WalletRuntime};

#[derive(Parser)]
#[command(name = "soltix-wallet")]
#[command(about = "Solana wallet connection and payment client", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured cluster
    #[arg(short, long)]
    network: Option<Cluster>,

    /// Override the configured platform
    #[arg(short, long)]
    platform: Option<Platform>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a string is a valid address
    Validate { address: String },
    /// Show the balance of an address
    Balance { address: String },
    /// Show cluster slot, block height and epoch
    Status,
    /// List recent transaction signatures for an address
    History {
        address: String,
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },
    /// Show details of a transaction
    Tx { signature: String },
    /// Request test funds (devnet only)
    Airdrop {
        address: String,
        #[arg(short, long, default_value_t = 1.0)]
        amount: f64,
    },
    /// List supported wallets
    Providers,
    /// Connect a wallet
    Connect { provider: String },
    /// Complete a deep-link round trip from its callback URL
    Callback { url: String },
    /// Restore the stored session
    Restore,
    /// Forget the stored session
    Disconnect,
    /// Store a wallet address as the session
    Save { address: String },
    /// Send a payment
    Pay {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: f64,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(network) = cli.network {
        config.chain.network = network;
    }
    if let Some(platform) = cli.platform {
        config.app.platform = platform;
    }

    init_logging(&config.observability);
    tracing::info!(
        network = config.chain.network.as_str(),
        rpc = %rpc_origin(&config.chain.effective_rpc_url()),
        "soltix-wallet v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let linker = Arc::new(ConsoleLinker::new(config.app.installed_schemes.clone()));
    let mut runtime = WalletRuntime::new(&config, Arc::new(NativeHost), linker)?;

    match cli.command {
        Commands::Validate { address } => {
            let valid = is_valid_address(&address);
            print_json(&serde_json::json!({ "address": address, "valid": valid }))?;
        }
        Commands::Balance { address } => {
            let address = Address::parse(&address)?;
            let lamports = runtime.gateway.client().get_balance(&address).await?;
            print_json(&serde_json::json!({
                "address": address,
                "lamports": lamports,
                "sol": soltix_wallet::chain::types::lamports_to_sol(lamports),
            }))?;
        }
        Commands::Status => match runtime.gateway.network_status().await {
            Some(status) => print_json(&status)?,
            None => {
                let reachable = runtime.gateway.client().is_healthy().await;
                eprintln!("Network status unavailable (RPC reachable: {})", reachable);
            }
        },
        Commands::History { address, limit } => {
            let address = Address::parse(&address)?;
            print_json(&runtime.gateway.recent_transactions(&address, limit).await)?;
        }
        Commands::Tx { signature } => match runtime.gateway.transaction_details(&signature).await {
            Some(details) => print_json(&details)?,
            None => eprintln!("Transaction not found"),
        },
        Commands::Airdrop { address, amount } => {
            let address = Address::parse(&address)?;
            match runtime.gateway.request_airdrop(&address, amount).await {
                Some(signature) => print_json(&serde_json::json!({ "signature": signature }))?,
                None => eprintln!("Airdrop failed (devnet only)"),
            }
        }
        Commands::Providers => print_json(&WALLET_PROVIDERS)?,
        Commands::Connect { provider } => {
            let descriptor = find_provider(&provider)
                .ok_or_else(|| format!("unknown wallet '{}'", provider))?;
            let session = runtime.connection.connect(&mut runtime.context, descriptor).await?;
            print_json(&serde_json::json!({
                "state": runtime.context.state(),
                "session": session,
            }))?;
        }
        Commands::Callback { url } => {
            if is_sign_callback(&url) {
                match parse_signature_callback(&url) {
                    Some(signature) => print_json(&serde_json::json!({ "signature": signature }))?,
                    None => eprintln!("No valid signature in callback"),
                }
            } else {
                let session = runtime.connection.handle_callback(&mut runtime.context, &url).await;
                print_json(&serde_json::json!({
                    "state": runtime.context.state(),
                    "session": session,
                }))?;
            }
        }
        Commands::Restore => {
            let session = runtime.connection.restore(&mut runtime.context).await;
            print_json(&serde_json::json!({
                "state": runtime.context.state(),
                "session": session,
            }))?;
        }
        Commands::Disconnect => {
            runtime.connection.disconnect(&mut runtime.context).await;
            print_json(&serde_json::json!({ "state": runtime.context.state() }))?;
        }
        Commands::Save { address } => {
            let address = runtime
                .connection
                .save_wallet_address(&runtime.context, &address)
                .await?;
            print_json(&serde_json::json!({ "saved": address }))?;
        }
        Commands::Pay { from, to, amount } => {
            let from = match from {
                Some(from) => from,
                None => runtime
                    .connection
                    .restore(&mut runtime.context)
                    .await
                    .map(|s| s.public_key.to_string())
                    .ok_or("no connected wallet; pass --from or connect first")?,
            };
            let result = runtime.payment.send_payment(&from, &to, amount).await?;
            print_json(&result)?;
        }
    }

    Ok(())
}
