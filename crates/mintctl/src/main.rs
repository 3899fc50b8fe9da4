//! mintctl - interactive operator console for a jetton minter.

use anyhow::{Context, Result};
use clap::Parser;
use minter_common::{Address, ConsoleConfig};
use mintctl::client::JettonGateway;
use mintctl::console::StdConsole;
use mintctl::poll::PollPolicy;
use mintctl::session::Session;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mintctl")]
#[command(about = "Operator console for a deployed jetton minter", long_about = None)]
#[command(version)]
struct Cli {
    /// Gateway JSON-RPC endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Gateway API key
    #[arg(long)]
    api_key: Option<String>,

    /// Operator wallet address (raw form, e.g. 0:3f5e...)
    #[arg(long)]
    wallet: Option<String>,

    /// Minter address; skips the first address prompt
    #[arg(long)]
    minter: Option<String>,

    /// Expected minter code hash (hex sha2-256)
    #[arg(long)]
    expected_code_hash: Option<String>,

    /// Settlement poll attempts
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Seconds between poll attempts
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Config file path (default: ~/.config/mintctl/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_code_hash(hex_hash: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(hex_hash).context("expected code hash is not hex")?;
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected code hash must be 32 bytes"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::load_default()?,
    };
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(api_key) = cli.api_key {
        config.api_key = Some(api_key);
    }
    if let Some(wallet) = cli.wallet {
        config.wallet = Some(wallet);
    }
    if let Some(hash) = cli.expected_code_hash {
        config.expected_code_hash = Some(hash);
    }
    if let Some(max_attempts) = cli.max_attempts {
        config.poll.max_attempts = max_attempts;
    }
    if let Some(interval) = cli.poll_interval {
        config.poll.interval_secs = interval;
    }

    let wallet: Option<Address> = config
        .wallet
        .as_deref()
        .map(str::parse)
        .transpose()
        .context("operator wallet address")?;
    let expected_code_hash = config
        .expected_code_hash
        .as_deref()
        .map(parse_code_hash)
        .transpose()?;
    let initial_target: Option<Address> = cli
        .minter
        .as_deref()
        .map(str::parse)
        .transpose()
        .context("minter address")?;
    let policy = PollPolicy {
        max_attempts: config.poll.max_attempts,
        interval: Duration::from_secs(config.poll.interval_secs),
    };

    info!("mintctl v{} starting", env!("CARGO_PKG_VERSION"));
    let gateway = JettonGateway::new(config.endpoint.clone(), config.api_key.clone(), wallet);
    let console = StdConsole::new();

    Session {
        api: &gateway,
        console: &console,
        wallet,
        expected_code_hash,
        policy,
        initial_target,
    }
    .run()
    .await
}
