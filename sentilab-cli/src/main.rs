//! SentiLab CLI: fetch quotes, price history and the confidence index.
//!
//! Commands:
//! - `quotes`: latest quotes for the given symbols (default: the sector table)
//! - `history`: monthly price series for one symbol
//! - `cci`: consumer confidence proxy series
//! - `correlate`: confidence index joined with a sector's monthly closes
//! - `status`: probe the active provider with one live quote
//! - `sectors`: print the sector table
//!
//! Results are printed as pretty JSON on stdout. Fallback notices go to the
//! log on stderr (`RUST_LOG` controls verbosity).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sentilab_core::{ClientConfig, Interval, MarketDataClient, ProviderKind, Range, SectorTable};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sentilab",
    about = "SentiLab CLI: sector quotes and consumer sentiment data"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to <config dir>/sentilab/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured market data provider (yahoo, alpha-vantage).
    #[arg(long, global = true)]
    provider: Option<ProviderKind>,

    /// Path to a TOML sector table. Defaults to the SPDR sector funds.
    #[arg(long, global = true)]
    sectors: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Latest quotes.
    Quotes {
        /// Symbols to quote. Defaults to every ticker in the sector table.
        symbols: Vec<String>,
    },
    /// Monthly price series for one symbol.
    History {
        symbol: String,

        /// Sampling interval: 1d, 1wk or 1mo.
        #[arg(long, default_value = "1mo")]
        interval: Interval,

        /// Look-back range: 1mo, 3mo, 6mo, 1y, 2y or 5y.
        #[arg(long, default_value = "2y")]
        range: Range,
    },
    /// Consumer confidence proxy series.
    Cci,
    /// Confidence index joined with a sector's monthly closes.
    Correlate { ticker: String },
    /// Probe the active provider.
    Status,
    /// Print the sector table.
    Sectors,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let sectors = match &cli.sectors {
        Some(path) => SectorTable::from_file(path)
            .with_context(|| format!("loading sector table {}", path.display()))?,
        None => SectorTable::default(),
    };

    let config = load_config(cli.config.as_deref(), cli.provider)?;
    let client = MarketDataClient::from_config(&config)
        .context("building market data client")?
        .with_sectors(sectors);
    debug!(provider = client.provider_name(), "client ready");

    match cli.command {
        Commands::Quotes { symbols } => {
            let symbols = if symbols.is_empty() {
                client.sectors().tickers()
            } else {
                symbols
            };
            let quotes = client.fetch_stock_data(&symbols).await;
            // Request order, not hash order.
            let ordered: Vec<_> = symbols.iter().filter_map(|s| quotes.get(s)).collect();
            print_json(&ordered)
        }
        Commands::History {
            symbol,
            interval,
            range,
        } => print_json(&client.fetch_historical_data(&symbol, interval, range).await),
        Commands::Cci => print_json(&client.fetch_consumer_confidence_index().await),
        Commands::Correlate { ticker } => {
            print_json(&client.fetch_sector_correlation(&ticker).await)
        }
        Commands::Status => print_json(&client.check_status().await),
        Commands::Sectors => print_json(&client.sectors().sectors),
    }
}

/// Explicit path, then the per-user default if it exists, then built-in defaults.
/// API keys missing from the file are taken from the environment.
fn load_config(path: Option<&Path>, provider: Option<ProviderKind>) -> Result<ClientConfig> {
    let default_path = dirs::config_dir().map(|d| d.join("sentilab").join("config.toml"));

    let mut config = match (path, default_path) {
        (Some(path), _) => ClientConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        (None, Some(default)) if default.is_file() => ClientConfig::from_file(&default)
            .with_context(|| format!("loading config {}", default.display()))?,
        _ => ClientConfig::default(),
    }
    .with_env();

    if let Some(provider) = provider {
        config.provider = provider;
    }
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
