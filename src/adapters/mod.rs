//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Jupiter: price quotes, token decimals and live swap execution
//! - Solana: RPC client and wallet management
//! - Paper: simulated swap execution
//! - CLI: Command-line interface definitions
//! - Log file: daily rolling log sink

pub mod jupiter;
pub mod solana;
pub mod paper;
pub mod cli;
pub mod log_file;

pub use jupiter::{JupiterClient, JupiterSwapExecutor};
pub use solana::{SolanaClient, WalletManager};
pub use paper::PaperSwapExecutor;
pub use cli::CliApp;
pub use log_file::DailyLogFile;
