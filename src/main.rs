use std::path::PathBuf;

use alloy_primitives::{Address, U256};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lockbox::config::{self, Config};
use lockbox::{
    is_withdrawal_eligible, now_secs, Gateway, TransactionIntent, Vault, VaultError,
    WithdrawalFlow, WithdrawalState,
};

#[derive(Debug, Parser)]
#[command(
    name = "lockbox",
    version,
    about = "Lockbox: inspect and withdraw from a time-lock vault through a MultiBaas gateway"
)]
struct Args {
    /// Config file (defaults to $LOCKBOX_CONFIG or ~/.config/lockbox/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// MultiBaas deployment URL (e.g. https://abc123.multibaas.com)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Chain identifier (e.g. ethereum)
    #[arg(long, global = true)]
    chain: Option<String>,

    /// Contract label registered with the gateway
    #[arg(long, global = true)]
    label: Option<String>,

    /// Address alias of the deployed contract
    #[arg(long, global = true)]
    alias: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the resolved configuration (API key redacted)
    Config,
    /// Probe the gateway's chain status
    Status,
    /// Read the unlock time and report eligibility
    UnlockTime {
        /// Evaluate eligibility at this unix time instead of now
        #[arg(long)]
        now: Option<u64>,
    },
    /// Build the unsigned withdraw transaction for a wallet to sign
    Withdraw {
        /// Connected wallet address
        #[arg(long)]
        from: Option<String>,

        /// Skip the client-side eligibility pre-check
        #[arg(long)]
        force: bool,
    },
    /// List recent withdrawal events
    Events,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = resolve_config(&args)?;

    let vault = Vault::new(config).context("Failed to build gateway client")?;

    match args.command {
        Command::Config => show_config(vault.config()),
        Command::Status => {
            let status = vault.chain_status().await?;
            println!("chain id:     {}", status.chain_id);
            println!("block number: {}", status.block_number);
        }
        Command::UnlockTime { now } => {
            let now = now.unwrap_or_else(now_secs);
            let unlock_time = vault.unlock_time().await?;
            println!("unlock time: {} ({})", unlock_time, format_timestamp(unlock_time));
            if is_withdrawal_eligible(unlock_time, now) {
                println!("status:      eligible for withdrawal");
            } else {
                println!("status:      locked");
            }
        }
        Command::Withdraw { from, force } => {
            let caller = from
                .as_deref()
                .map(|s| s.parse::<Address>())
                .transpose()
                .context("Invalid --from address")?;

            let intent = request_withdrawal(&vault, caller, force, now_secs()).await?;

            if !intent.is_withdraw_call() {
                tracing::warn!(data = ?intent.data, "calldata does not target withdraw()");
            }
            println!("{}", serde_json::to_string_pretty(&intent)?);
        }
        Command::Events => {
            let events = vault.withdrawal_events().await?;
            if events.is_empty() {
                println!("no withdrawals");
            }
            for event in events {
                println!(
                    "{}  amount={} wei  when={}  tx={}",
                    event.block_number.map(|n| n.to_string()).unwrap_or_else(|| "-".into()),
                    event.amount,
                    format_timestamp(event.when),
                    event.tx_hash.as_deref().unwrap_or("-"),
                );
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lockbox=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file, then environment, then command-line flags
fn resolve_config(args: &Args) -> Result<Config> {
    let file = match &args.config {
        Some(path) => config::load_from(path)?,
        None => config::load()?,
    };
    let mut config = file.with_env()?;

    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(chain) = &args.chain {
        config.chain = chain.clone();
    }
    if let Some(label) = &args.label {
        config.contract_label = label.clone();
    }
    if let Some(alias) = &args.alias {
        config.address_alias = alias.clone();
    }
    Ok(config.trimmed())
}

/// Gate and wallet first, then the eligibility pre-check unless `force`
async fn request_withdrawal<G: Gateway>(
    vault: &Vault<G>,
    caller: Option<Address>,
    force: bool,
    now: u64,
) -> Result<TransactionIntent> {
    if force {
        return Ok(vault.withdraw(caller).await?);
    }
    if !vault.is_configured() {
        return Err(VaultError::NotConfigured.into());
    }
    if caller.is_none() {
        return Err(VaultError::WalletNotConnected.into());
    }

    let mut flow = WithdrawalFlow::new();
    if let WithdrawalState::Locked { unlock_time } = *flow.fetch(vault, now).await? {
        bail!(
            "Vault is locked until {} ({}); pass --force to ask anyway",
            unlock_time,
            format_timestamp(unlock_time)
        );
    }
    Ok(flow.withdraw(vault, caller, now).await?)
}

fn show_config(config: &Config) {
    println!("{config:#?}");
    let missing = config.missing_fields();
    if missing.is_empty() {
        println!("configured: yes");
    } else {
        println!("configured: no (missing {})", missing.join(", "));
    }
}

fn format_timestamp(ts: U256) -> String {
    u64::try_from(ts)
        .ok()
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "out of range".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use lockbox::ErrorKind;

    fn vault_for(endpoint: String) -> Vault {
        Vault::new(Config {
            endpoint,
            api_key: "key".into(),
            contract_label: "lock".into(),
            address_alias: "lock".into(),
            chain: "ethereum".into(),
            request_timeout_secs: Some(5),
        })
        .unwrap()
    }

    fn vault_kind(err: &anyhow::Error) -> Option<ErrorKind> {
        err.downcast_ref::<VaultError>().map(VaultError::kind)
    }

    #[tokio::test]
    async fn test_withdraw_without_wallet_skips_precheck() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.any_request();
                then.status(200);
            })
            .await;

        let err = request_withdrawal(&vault_for(server.base_url()), None, false, 0)
            .await
            .unwrap_err();
        assert_eq!(vault_kind(&err), Some(ErrorKind::WalletNotConnected));
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_withdraw_unconfigured_wins_over_wallet() {
        let mut vault_config = vault_for("http://127.0.0.1:1".into()).config().clone();
        vault_config.chain.clear();
        let vault = Vault::new(vault_config).unwrap();

        let err = request_withdrawal(&vault, None, false, 0).await.unwrap_err();
        assert_eq!(vault_kind(&err), Some(ErrorKind::NotConfigured));
    }

    #[tokio::test]
    async fn test_withdraw_refused_while_locked() {
        let server = MockServer::start_async().await;
        let withdraw = server
            .mock_async(|when, then| {
                when.method(POST).path_contains("/methods/withdraw");
                then.status(200);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path_contains("/methods/unlockTime");
                then.status(200).json_body(serde_json::json!({
                    "status": 200,
                    "message": "success",
                    "result": {"kind": "MethodCallResponse", "output": "1700000000"}
                }));
            })
            .await;

        let caller: Address = "0x00000000000000000000000000000000000000Aa".parse().unwrap();
        let err = request_withdrawal(&vault_for(server.base_url()), Some(caller), false, 1)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("locked"));
        assert_eq!(withdraw.hits_async().await, 0);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(U256::ZERO), "1970-01-01 00:00:00 UTC");
        assert_eq!(
            format_timestamp(U256::from(1_704_067_200u64)),
            "2024-01-01 00:00:00 UTC"
        );
        assert_eq!(format_timestamp(U256::MAX), "out of range");
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "lockbox",
            "--config",
            "/nonexistent/lockbox.toml",
            "--chain",
            "sepolia",
            "--alias",
            "lock2",
            "status",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.chain, "sepolia");
        assert_eq!(config.address_alias, "lock2");
    }
}
