//! minefaucet-miner
//!
//! Terminal client for the mining faucet. Runs timed mining sessions for a
//! wallet address and claims the reward through a faucet node's JSON-RPC.
//!
//! Usage:
//!   minefaucet-miner mine    [--rpc <url>] [--address <0x…> | --keyfile <path>]
//!   minefaucet-miner status  [--rpc <url>] [--address <0x…> | --keyfile <path>]
//!   minefaucet-miner info    [--rpc <url>]

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use minefaucet_core::constants::{RECORD_POLL_SECS, SESSION_TICK_MS};
use minefaucet_core::format::{format_allowance, format_duration_ms};
use minefaucet_core::{Address, FaucetError};
use minefaucet_lifecycle::{
    run, Clock, Command as LoopCommand, Controller, LoopConfig, SystemClock, WalletProvider,
};
use minefaucet_rpc::FaucetRpcClient;

mod input;
mod render;
mod wallet;

use input::{Input, HELP};
use render::{TerminalDisplay, TerminalNotifier};
use wallet::{resolve_address, KeyfileWallet};

const DEFAULT_LOG_FILTER: &str = "warn,minefaucet_lifecycle=info,minefaucet_rpc=info,minefaucet_miner=info";

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "minefaucet-miner",
    version,
    about = "Mine timed sessions and claim faucet rewards"
)]
struct Args {
    /// Node RPC endpoint.
    #[arg(long, global = true, default_value = "http://127.0.0.1:8545")]
    rpc: String,

    /// Wallet address to mine for. Overrides the keyfile.
    #[arg(long, global = true)]
    address: Option<String>,

    /// Path to the keyfile (JSON `{"address": "0x…"}`).
    #[arg(long, global = true, default_value = "~/.minefaucet/wallet.json")]
    keyfile: PathBuf,

    /// Session progress refresh interval in milliseconds.
    #[arg(long, global = true, default_value_t = SESSION_TICK_MS)]
    session_tick_ms: u64,

    /// Claim-record poll interval in seconds (0 disables polling).
    #[arg(long, global = true, default_value_t = RECORD_POLL_SECS)]
    poll_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive mining session; reads commands from stdin.
    Mine,

    /// Print the claim record and cooldown for the wallet.
    Status,

    /// Print faucet parameters reported by the node.
    Info,
}

// ── Main ─────────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let keyfile = expand_tilde(&args.keyfile);
    let client = FaucetRpcClient::new(&args.rpc)?;

    match args.command {
        Command::Mine => {
            let address = resolve_address(args.address.as_deref(), &keyfile)?;
            let config = LoopConfig {
                session_tick: Duration::from_millis(args.session_tick_ms.max(1)),
                record_poll: (args.poll_secs > 0).then(|| Duration::from_secs(args.poll_secs)),
                ..LoopConfig::default()
            };
            cmd_mine(client, address, config).await
        }

        Command::Status => {
            let address = resolve_address(args.address.as_deref(), &keyfile)?
                .ok_or(FaucetError::NoAddress)
                .context("pass --address or create a keyfile")?;
            cmd_status(&client, &address).await
        }

        Command::Info => {
            let info = client.get_info().await?;
            println!("Node:             {}", client.url());
            println!("Token:            {}", info.token);
            println!("Reward per claim: {} {}", info.reward_per_claim, info.token);
            println!("Allowance cap:    {} {}", info.allowance_cap, info.token);
            println!(
                "Session length:   {}",
                format_duration_ms(info.session_duration_ms)
            );
            Ok(())
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn cmd_mine(
    client: FaucetRpcClient,
    address: Option<Address>,
    config: LoopConfig,
) -> anyhow::Result<()> {
    let client = Arc::new(client);
    let controller = Controller::new(Arc::clone(&client), Arc::clone(&client), TerminalNotifier);

    let mut wallet = KeyfileWallet::new(address);
    let (tx, rx) = mpsc::channel(16);
    match wallet.connect() {
        Ok(session) => tx.send(LoopCommand::Wallet(session)).await?,
        Err(e) => warn!(error = %e, "starting without a wallet; use `connect <0x…>`"),
    }

    println!("{HELP}");
    // Plain thread: a blocked stdin read must not hold the runtime open on exit.
    std::thread::spawn(move || read_commands(wallet, tx));

    let mut display = TerminalDisplay::default();
    let controller = run(controller, rx, &mut display, &SystemClock, &config).await;
    display.finish();

    if let Some(record) = controller.record() {
        info!(
            total_claimed = record.total_claimed,
            remaining_allowance = record.remaining_allowance,
            "session ended"
        );
    }
    Ok(())
}

/// Translate stdin lines into loop commands until `quit` or EOF.
fn read_commands(mut wallet: KeyfileWallet, tx: mpsc::Sender<LoopCommand>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let input = match line.parse::<Input>() {
            Ok(i) => i,
            Err(msg) => {
                println!("\n{msg}");
                continue;
            }
        };

        let cmd = match input {
            Input::Start => LoopCommand::Start,
            Input::Claim => LoopCommand::Claim,
            Input::Refresh => LoopCommand::Refresh,
            Input::Connect(Some(address)) => LoopCommand::Wallet(wallet.connect_to(address)),
            Input::Connect(None) => match wallet.connect() {
                Ok(session) => LoopCommand::Wallet(session),
                Err(e) => {
                    println!("\n{e}; use `connect <0x…>`");
                    continue;
                }
            },
            Input::Disconnect => LoopCommand::Wallet(wallet.disconnect()),
            Input::Help => {
                println!("\n{HELP}");
                continue;
            }
            Input::Quit => LoopCommand::Quit,
        };

        let quit = cmd == LoopCommand::Quit;
        if tx.blocking_send(cmd).is_err() || quit {
            break;
        }
    }
}

async fn cmd_status(client: &FaucetRpcClient, address: &Address) -> anyhow::Result<()> {
    let record = client.get_claim_record(address).await?;
    println!("Wallet:     {address}");

    let Some(record) = record else {
        println!("Claimed:    {}", format_allowance(0));
        println!("Cooldown:   none (no claims yet)");
        return Ok(());
    };

    println!("Claimed:    {}", format_allowance(record.total_claimed));
    println!("Remaining:  {}", record.remaining_allowance);
    if !record.is_consistent() {
        warn!(?record, "claim record does not add up to the allowance cap");
    }

    let cooldown_ms = record.cooldown_remaining_ms(SystemClock.now_ms());
    if cooldown_ms == 0 {
        println!("Cooldown:   none, ready to mine");
    } else {
        let at = Utc
            .timestamp_opt(record.next_claim_time, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| record.next_claim_time.to_string());
        println!("Cooldown:   {} (until {at})", format_duration_ms(cooldown_ms));
    }
    if record.is_exhausted() {
        println!("Allowance exhausted; further claims will be refused.");
    }
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.clone()
}
