//! CLI Commands
//!
//! Argument definitions for the reverter binary. Handlers live in `main.rs`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::domain::signal::Signal;

/// Reverter - Z-Score Mean Reversion Bot for Solana/Jupiter
#[derive(Parser, Debug)]
#[command(
    name = "reverter",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Z-score mean reversion trading bot for Solana/Jupiter",
    long_about = "Reverter polls Jupiter for the pair price, keeps a rolling price history \
                  and swaps when the latest price deviates from the rolling mean by more \
                  than the configured number of standard deviations."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the trading loop
    Run(RunCmd),

    /// Show wallet balance and price history stats
    Status(StatusCmd),

    /// Fetch the current pair price
    Quote(QuoteCmd),

    /// Execute a single swap
    Swap(SwapCmd),
}

impl Command {
    /// Configuration file used by the command
    pub fn config_path(&self) -> &Path {
        match self {
            Command::Run(cmd) => &cmd.config,
            Command::Status(cmd) => &cmd.config,
            Command::Quote(cmd) => &cmd.config,
            Command::Swap(cmd) => &cmd.config,
        }
    }
}

/// Start trading loop
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/mainnet.toml")]
    pub config: PathBuf,

    /// Run in paper trading mode (no real transactions)
    #[arg(short, long)]
    pub paper: bool,
}

/// Check bot status
#[derive(Parser, Debug)]
pub struct StatusCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/mainnet.toml")]
    pub config: PathBuf,
}

/// Get the current price
#[derive(Parser, Debug)]
pub struct QuoteCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/mainnet.toml")]
    pub config: PathBuf,
}

/// Swap direction
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Spend the quote token for the base token
    Buy,
    /// Spend the base token for the quote token
    Sell,
}

impl From<Side> for Signal {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => Signal::Buy,
            Side::Sell => Signal::Sell,
        }
    }
}

/// Execute swap
#[derive(Parser, Debug)]
pub struct SwapCmd {
    /// Direction of the swap
    #[arg(value_enum, value_name = "SIDE")]
    pub side: Side,

    /// Amount in whole tokens of the input side (defaults to the configured size for the side)
    #[arg(short, long, value_name = "AMOUNT")]
    pub amount: Option<f64>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/mainnet.toml")]
    pub config: PathBuf,

    /// Simulate the swap (no real transaction)
    #[arg(short, long)]
    pub paper: bool,
}
