mod app;
mod config;
mod contract;
mod error;
mod orchestrator;
mod positions;
mod rpc;
mod session;
mod signing;
mod storage;
mod tabs;
mod units;
mod unlock;

#[cfg(test)]
mod testing;

use alloy_primitives::Address;
use anyhow::Context;
use app::{AppState, StakingApp, UiEvent};
use clap::Parser;
use config::tiers::LOCK_TIERS;
use config::{AppConfig, ConfigOverrides};
use orchestrator::{StakeRequest, WithdrawRequest};
use signing::RpcWalletProvider;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Terminal client for the HackerBoost ether staking contract
#[derive(Parser, Debug)]
#[command(name = "hackerboost-staking", version, about)]
struct Args {
    /// JSON-RPC endpoint of the wallet provider (env: STAKING_RPC_URL)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Staking contract address (env: STAKING_CONTRACT_ADDRESS)
    #[arg(long)]
    contract: Option<String>,

    /// Persist the effective endpoint and contract address
    #[arg(long)]
    save_settings: bool,
}

const HELP: &str = "\
Commands:
  connect                 connect the wallet
  disconnect              forget the wallet session
  account <address>       the wallet switched to another account
  balance                 show the wallet balance
  stake-tab | unstake-tab switch panels (unstake loads positions)
  refresh                 reload positions
  positions               list loaded positions
  tiers                   list lock periods
  stake <amount> <days>   stake ether for a lock period
  withdraw <id>           close an open position
  help | quit";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Event(UiEvent),
    Balance,
    Positions,
    Tiers,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (name, args.as_slice()) {
        ("connect", []) => Command::Event(UiEvent::Connect),
        ("disconnect", []) => Command::Event(UiEvent::Disconnect),
        ("account", [address]) => {
            let address = Address::from_str(address).map_err(|_| format!("'{}' is not an address", address))?;
            Command::Event(UiEvent::AccountChanged(address))
        }
        ("balance", []) => Command::Balance,
        ("stake-tab", []) => Command::Event(UiEvent::SwitchToStake),
        ("unstake-tab", []) => Command::Event(UiEvent::SwitchToUnstake),
        ("refresh", []) => Command::Event(UiEvent::Refresh),
        ("positions", []) => Command::Positions,
        ("tiers", []) => Command::Tiers,
        ("stake", [amount, days]) => {
            let lock_days = days.parse().map_err(|_| format!("'{}' is not a number of days", days))?;
            Command::Event(UiEvent::SubmitStake(StakeRequest {
                amount_display_unit: amount.to_string(),
                lock_days,
            }))
        }
        ("withdraw", [id]) => {
            let position_id = id
                .trim_start_matches('#')
                .parse()
                .map_err(|_| format!("'{}' is not a position id", id))?;
            Command::Event(UiEvent::SubmitWithdraw(WithdrawRequest { position_id }))
        }
        ("help", []) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        _ => return Err(format!("Unknown command '{}'. Type 'help'.", line.trim())),
    };
    Ok(Some(command))
}

fn render_positions(state: &AppState) -> String {
    if state.address.is_none() {
        return "Connect a wallet to see your positions.".to_string();
    }
    if state.positions.is_empty() {
        return "No positions loaded. Use 'unstake-tab' or 'refresh'.".to_string();
    }
    state
        .positions
        .iter()
        .map(|p| {
            let status = if !p.open {
                "closed".to_string()
            } else if p.days_remaining == 0 {
                "unlocked".to_string()
            } else {
                format!("{} days left", p.days_remaining)
            };
            format!(
                "#{:<4} {} ETH @ {}% (+{} ETH)  {}",
                p.position_id, p.ether_staked, p.percent_interest, p.ether_interest, status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_status(state: &AppState) -> String {
    let wallet = match state.address {
        Some(address) => address.to_string(),
        None => "not connected".to_string(),
    };
    format!("[{}] {}", state.tab, wallet)
}

async fn run(app: &mut StakingApp) -> anyhow::Result<()> {
    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::Tiers => {
                for tier in LOCK_TIERS {
                    println!("{:>3}  {}", tier.days, tier.label());
                }
            }
            Command::Positions => println!("{}", render_positions(app.state())),
            Command::Balance => match app.handle(UiEvent::RefreshBalance).await {
                Ok(()) => {
                    let balance = app.state().balance.unwrap_or_default();
                    println!("Balance: {} ETH", units::format_display(balance, 4));
                }
                Err(e) => println!("{}", e.user_message()),
            },
            Command::Event(event) => {
                let shows_positions = matches!(
                    event,
                    UiEvent::SwitchToUnstake | UiEvent::Refresh | UiEvent::SubmitWithdraw(_)
                );
                let submits = matches!(event, UiEvent::SubmitStake(_) | UiEvent::SubmitWithdraw(_));
                if let (true, Some(blocker)) = (submits, app.state().submit_blocker()) {
                    println!("{}", blocker.user_message());
                    continue;
                }
                match app.handle(event).await {
                    Ok(()) => {
                        let state = app.state();
                        if let (true, Some(confirmation)) = (submits, &state.last_confirmation) {
                            println!("{} confirmed in block {}", confirmation.kind, confirmation.block_number);
                        }
                        println!("{}", render_status(state));
                        if shows_positions {
                            println!("{}", render_positions(state));
                        }
                    }
                    Err(e) => println!("{}", e.user_message()),
                }
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = storage::load_settings();
    let overrides = ConfigOverrides {
        rpc_url: args.rpc_url,
        contract_address: args.contract,
    };
    let config = AppConfig::from_env(&settings, &overrides).context("Invalid configuration")?;
    log::info!("Using {} with contract {}", config.rpc_url, config.contract_address);

    if args.save_settings {
        storage::save_settings(&config.to_settings()).context("Could not save settings")?;
    }

    let provider = Arc::new(RpcWalletProvider::new(&config.rpc_url));
    let mut app = StakingApp::from_config(&config, Some(provider));
    run(&mut app).await
}
