//! Reverter - Z-Score Mean Reversion Bot
//!
//! Polls Jupiter for the pair price and swaps when it strays from the mean.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reverter::adapters::cli::{CliApp, Command, QuoteCmd, RunCmd, StatusCmd, SwapCmd};
use reverter::adapters::log_file::DailyLogFile;
use reverter::adapters::jupiter::{JupiterClient, JupiterConfig, JupiterSwapExecutor};
use reverter::adapters::paper::PaperSwapExecutor;
use reverter::adapters::solana::{parse_commitment, SolanaClient, WalletManager};
use reverter::application::{resolve_pair, TradingOrchestrator};
use reverter::config::{load_config, Config, LoggingSection, SolanaSection};
use reverter::domain::{JsonSnapshotFile, PriceStore, RestoreStatus, Signal, SwapOrder};
use reverter::ports::{PriceSource, SwapExecutor};
use reverter::strategy::{analyze, StrategyConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in the config file)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    let config_path = app.command.config_path().to_path_buf();
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    init_logging(app.verbose, app.debug, &config.logging)?;

    match app.command {
        Command::Run(cmd) => run_command(cmd, config).await,
        Command::Status(cmd) => status_command(cmd, config).await,
        Command::Quote(cmd) => quote_command(cmd, config).await,
        Command::Swap(cmd) => swap_command(cmd, config).await,
    }
}

fn init_logging(verbose: bool, debug: bool, logging: &LoggingSection) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    // Daily plain-text log file, rolled over at UTC midnight
    let file_layer = if logging.log_to_file {
        let dir = shellexpand::tilde(&logging.log_dir).into_owned();
        let file = DailyLogFile::new(&dir, "bot")
            .with_context(|| format!("Failed to create log directory {}", dir))?;
        Some(fmt::layer().with_ansi(false).with_writer(file))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

fn jupiter_client(config: &Config) -> Result<JupiterClient> {
    JupiterClient::with_config(JupiterConfig::from(&config.jupiter))
        .context("Failed to create Jupiter client")
}

fn history_store(config: &Config) -> PriceStore {
    PriceStore::new(
        Box::new(JsonSnapshotFile::new(config.storage.history_path())),
        config.strategy.history_capacity,
    )
}

/// Paper executor, or the live Jupiter executor with the configured wallet
fn build_executor(config: &Config, jupiter: &JupiterClient, paper: bool) -> Result<Arc<dyn SwapExecutor>> {
    if paper {
        tracing::warn!(category = "System", "PAPER TRADING MODE - no real transactions");
        return Ok(Arc::new(PaperSwapExecutor::new()));
    }

    let wallet = load_wallet(&config.solana)?;
    let commitment = parse_commitment(&config.solana.commitment)?;
    let solana = SolanaClient::with_commitment(config.solana.get_rpc_url(), commitment);

    tracing::info!(category = "System", "Wallet: {}", wallet.public_key());
    Ok(Arc::new(JupiterSwapExecutor::new(
        jupiter.clone(),
        solana,
        wallet,
        config.jupiter.slippage_bps,
    )))
}

async fn run_command(cmd: RunCmd, config: Config) -> Result<()> {
    tracing::info!(category = "System", "Starting reverter...");

    let jupiter = jupiter_client(&config)?;
    let executor = build_executor(&config, &jupiter, cmd.paper)?;
    let prices: Arc<dyn PriceSource> = Arc::new(jupiter.clone());

    let (orchestrator, _restore) = TradingOrchestrator::start(
        StrategyConfig::from(&config),
        &jupiter,
        &config.tokens.base_mint,
        &config.tokens.quote_mint,
        &config.tokens.symbol,
        prices,
        executor,
        history_store(&config),
    )
    .await
    .context("Failed to start trading engine")?;

    let orchestrator =
        orchestrator.with_poll_interval(Duration::from_secs(config.strategy.poll_interval_secs));

    // Setup Ctrl+C handler
    let orch = orchestrator.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!(category = "System", "Shutdown signal received");
        orch.stop().await;
    });

    orchestrator.run().await;
    tracing::info!(category = "System", "Reverter stopped");
    Ok(())
}

async fn status_command(_cmd: StatusCmd, config: Config) -> Result<()> {
    match load_wallet(&config.solana) {
        Ok(wallet) => {
            let solana = SolanaClient::new(config.solana.get_rpc_url());
            let balance = solana
                .get_balance(&wallet.public_key())
                .await
                .context("Failed to get balance")?;

            println!("Wallet: {}", wallet.public_key());
            println!("Balance: {} lamports ({:.4} SOL)", balance, balance as f64 / 1e9);
        }
        Err(e) => println!("Wallet: not available ({})", e),
    }

    let mut store = history_store(&config);
    let restore = store.restore();
    let instrument = config.tokens.base_mint.as_str();

    println!("History file: {}", config.storage.history_path().display());
    match restore {
        RestoreStatus::Fresh => println!("History: empty"),
        RestoreStatus::Degraded(reason) => println!("History: unreadable ({})", reason),
        RestoreStatus::Restored { .. } => {
            println!(
                "History: {} / {} samples for {}",
                store.len(instrument),
                store.capacity(),
                config.tokens.symbol
            );
        }
    }

    if let Some(latest) = store.latest(instrument) {
        println!("Latest price: {:.6} at {}", latest.price, latest.timestamp);
    }

    let strategy = StrategyConfig::from(&config);
    match analyze(&store.window(instrument, strategy.mean_period), &strategy) {
        Some(z) => println!(
            "Z-score: {:.3} (mean {:.6}, std {:.6}) -> {}",
            z.z_score,
            z.mean,
            z.std_dev,
            z.signal(strategy.deviation_threshold)
        ),
        None => println!(
            "Z-score: not enough data ({} of {} samples)",
            store.len(instrument),
            strategy.mean_period
        ),
    }

    Ok(())
}

async fn quote_command(_cmd: QuoteCmd, config: Config) -> Result<()> {
    let jupiter = jupiter_client(&config)?;
    let pair = resolve_pair(
        &jupiter,
        &config.tokens.base_mint,
        &config.tokens.quote_mint,
        &config.tokens.symbol,
    )
    .await
    .context("Failed to resolve token decimals")?;

    let price = jupiter
        .current_price(&pair)
        .await
        .context("Failed to get quote")?;

    println!("{} price: {:.6}", pair.symbol, price);
    Ok(())
}

async fn swap_command(cmd: SwapCmd, config: Config) -> Result<()> {
    let jupiter = jupiter_client(&config)?;
    let pair = resolve_pair(
        &jupiter,
        &config.tokens.base_mint,
        &config.tokens.quote_mint,
        &config.tokens.symbol,
    )
    .await
    .context("Failed to resolve token decimals")?;

    let signal = Signal::from(cmd.side);
    let amount = cmd
        .amount
        .unwrap_or_else(|| StrategyConfig::from(&config).size_for(signal));
    let Some(order) = SwapOrder::for_signal(signal, &pair, amount)? else {
        bail!("Nothing to swap for {}", signal);
    };

    let executor = build_executor(&config, &jupiter, cmd.paper)?;
    tracing::info!(
        category = "Trade",
        "{} {} ({} base units) {} -> {}",
        signal,
        amount,
        order.amount,
        order.input_mint,
        order.output_mint
    );

    let signature = executor
        .execute_trade(&order)
        .await
        .context("Swap failed")?;

    println!("Swap confirmed: {}", signature);
    Ok(())
}

/// Load the wallet from WALLET_PRIVATE_KEY or the keypair file, with helpful errors
fn load_wallet(solana: &SolanaSection) -> Result<WalletManager> {
    if let Some(secret) = solana.get_private_key() {
        return WalletManager::from_base58(&secret)
            .context("WALLET_PRIVATE_KEY is set but is not a valid base58 secret key");
    }

    let keypair_path = solana.get_keypair_path();

    // Check if file exists first for a clearer error message
    if !keypair_path.exists() {
        bail!(
            "Wallet file not found: {}\n\n\
             A wallet is required for live trading.\n\n\
             To create a new wallet, run:\n  \
             solana-keygen new --outfile {}\n\n\
             Or set WALLET_PRIVATE_KEY (base58) in your .env file",
            keypair_path.display(),
            keypair_path.display()
        );
    }

    WalletManager::from_file(&keypair_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load wallet from '{}': {}\n\n\
             The file exists but may be corrupted or in the wrong format.\n\
             Expected format: JSON array of bytes (e.g., [1,2,3,...])",
            keypair_path.display(),
            e
        )
    })
}
