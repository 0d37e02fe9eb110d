//! Orbit CLI entry point
//!
//! Thin wrapper over the library: argument parsing, logging setup, the
//! pre-submission confirmation prompt, and output formatting. All protocol
//! logic lives in the library modules.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orbit::config::Config;
use orbit::context::CallContext;
use orbit::dispatch::{self, Plan};
use orbit::rpc::SolanaRpc;
use orbit::submit;
use orbit::wallet::load_sender_keypair;

#[derive(Parser, Debug)]
#[command(author, version, about = "Cross-chain call orchestrator for Solana")]
struct Args {
    /// Path to the configuration file (default: ~/.orbit/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose and submit a contract call
    Call {
        /// Target contract name (e.g. xcall, asset-manager)
        contract: String,

        /// Method to invoke on the contract
        #[arg(short, long)]
        method: String,

        /// Method parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,

        /// Target environment (mainnet or testnet)
        #[arg(short, long, default_value = "testnet")]
        env: String,

        /// Sender keypair path (default: ~/.config/solana/id.json)
        #[arg(long)]
        sender: Option<String>,

        /// RPC endpoint override
        #[arg(long)]
        url: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Inspect or modify the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Set a dotted-path key, e.g. solana-test.xcall.contract-address <addr>
    Set { key: String, value: String },
    /// Print the current configuration
    View,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config_path = args.config.unwrap_or_else(Config::default_path);

    match args.command {
        Command::Call { contract, method, params, env, sender, url, yes } => {
            run_call(&config_path, &contract, &method, &params, &env, sender, url, yes).await
        }
        Command::Config { action } => run_config(&config_path, action),
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_call(
    config_path: &std::path::Path,
    contract: &str,
    method: &str,
    params: &str,
    env: &str,
    sender: Option<String>,
    url: Option<String>,
    yes: bool,
) -> Result<()> {
    // Operation resolution comes first so an unknown pair fails before the
    // config, keypair, or network is touched
    let operation = dispatch::resolve(contract, method)?;

    let params: serde_json::Value = serde_json::from_str(params)
        .with_context(|| format!("--params is not valid JSON: {params}"))?;

    let config = Config::load(config_path)?;
    let chain = config.network(env)?;
    let signer = load_sender_keypair(sender.as_deref())?;

    let endpoint = chain.endpoint_url(url.as_deref())?;
    info!(%endpoint, env, "connecting");
    let rpc = SolanaRpc::new(endpoint);
    let ctx = CallContext::new(&signer, &rpc, chain);

    match dispatch::plan(operation, &ctx, &params).await? {
        Plan::Report(report) => {
            print!("{report}");
        }
        Plan::Transaction(composed) => {
            if !yes && !confirm(contract, method, &composed)? {
                println!("Aborted.");
                return Ok(());
            }
            let signature = submit::submit(&ctx, &composed).await?;
            println!("Transaction confirmed: {signature}");
        }
    }
    Ok(())
}

fn run_config(config_path: &std::path::Path, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Set { key, value } => {
            Config::set_key(config_path, &key, &value)?;
            println!("Set {key} in {}", config_path.display());
        }
        ConfigAction::View => {
            if config_path.exists() {
                let content = std::fs::read_to_string(config_path)
                    .with_context(|| format!("failed to read {}", config_path.display()))?;
                print!("{content}");
            } else {
                println!("No configuration at {}", config_path.display());
            }
        }
    }
    Ok(())
}

/// Interactive yes/no prompt shown before every state-mutating submission
fn confirm(contract: &str, method: &str, composed: &orbit::compose::Composed) -> Result<bool> {
    println!(
        "About to submit {contract}/{method} to program {} ({} account(s))",
        composed.instruction.program_id,
        composed.instruction.accounts.len()
    );
    print!("Proceed? [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orbit=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
