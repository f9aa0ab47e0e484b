//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/mainnet.toml.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::history::DEFAULT_HISTORY_CAPACITY;
use crate::domain::persistence::DEFAULT_HISTORY_FILE;

/// Main configuration structure matching config/mainnet.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub strategy: StrategySection,
    pub tokens: TokensSection,
    pub jupiter: JupiterSection,
    pub solana: SolanaSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Strategy configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct StrategySection {
    /// Number of most recent samples used for mean and std deviation
    pub mean_period: usize,
    /// Z-score magnitude that triggers a trade (2.0 = two standard deviations)
    pub deviation_threshold: f64,
    /// Trade size in whole tokens of the swap's input instrument
    pub trade_size: f64,
    /// Quote tokens spent per Buy (falls back to `trade_size`)
    #[serde(default)]
    pub buy_trade_size: Option<f64>,
    /// Seconds between price polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Samples kept per instrument
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

/// Tokens configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct TokensSection {
    /// Traded token mint (SOL)
    pub base_mint: String,
    /// Pricing token mint (USDC)
    pub quote_mint: String,
    /// Display symbol of the base token (for logging and the history file)
    pub symbol: String,
}

/// Jupiter API configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct JupiterSection {
    /// Swap API base URL (quote + swap endpoints)
    pub api_url: String,
    /// Token API base URL (token metadata endpoint)
    #[serde(default = "default_token_api_url")]
    pub token_api_url: String,
    /// Optional API key for higher rate limits (get from jup.ag)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Slippage tolerance in basis points (0.5% = 50 bps)
    pub slippage_bps: u16,
    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries on rate limiting and server errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl JupiterSection {
    /// Get API key with environment variable fallback
    /// Checks JUPITER_API_KEY env var if config value is empty/None
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("JUPITER_API_KEY").ok().filter(|k| !k.is_empty())
    }
}

/// Solana RPC configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct SolanaSection {
    /// RPC endpoint (use private RPC for production)
    pub rpc_url: String,
    /// Commitment level: "processed", "confirmed", "finalized"
    #[serde(default = "default_commitment")]
    pub commitment: String,
    /// Wallet keypair path (NEVER commit this file!)
    pub keypair_path: String,
}

impl SolanaSection {
    /// Get RPC URL with environment variable override
    /// Checks SOLANA_RPC_URL env var first, falls back to config value
    pub fn get_rpc_url(&self) -> String {
        std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| self.rpc_url.clone())
    }

    /// Get keypair path with environment variable override, `~` expanded
    pub fn get_keypair_path(&self) -> PathBuf {
        let raw = std::env::var("SOLANA_KEYPAIR_PATH").unwrap_or_else(|_| self.keypair_path.clone());
        PathBuf::from(shellexpand::tilde(&raw).into_owned())
    }

    /// Base58 secret key from WALLET_PRIVATE_KEY, if set
    pub fn get_private_key(&self) -> Option<String> {
        std::env::var("WALLET_PRIVATE_KEY").ok().filter(|k| !k.trim().is_empty())
    }
}

/// History storage section (optional)
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    /// Directory holding the history snapshot
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Snapshot file name inside `data_dir`
    #[serde(default = "default_history_file")]
    pub history_file: String,
}

impl StorageSection {
    pub fn history_path(&self) -> PathBuf {
        Path::new(shellexpand::tilde(&self.data_dir).as_ref()).join(&self.history_file)
    }
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_file: default_history_file(),
        }
    }
}

/// Logging configuration section (optional)
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Also write a daily log file (bot_YYYY-MM-DD.log)
    #[serde(default)]
    pub log_to_file: bool,
    /// Directory for daily log files
    #[serde(default = "default_data_dir")]
    pub log_dir: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_to_file: false,
            log_dir: default_data_dir(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    3
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_token_api_url() -> String {
    "https://api.jup.ag/tokens/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

fn default_data_dir() -> String {
    "logs".to_string()
}

fn default_history_file() -> String {
    DEFAULT_HISTORY_FILE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::strategy::params::StrategyConfig::from(self)
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        if self.strategy.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_secs must be > 0".to_string(),
            ));
        }

        if self.strategy.history_capacity < self.strategy.mean_period {
            return Err(ConfigError::ValidationError(format!(
                "history_capacity ({}) must be >= mean_period ({})",
                self.strategy.history_capacity, self.strategy.mean_period
            )));
        }

        // Validate tokens
        if self.tokens.base_mint.is_empty() {
            return Err(ConfigError::ValidationError(
                "base_mint cannot be empty".to_string(),
            ));
        }

        if self.tokens.quote_mint.is_empty() {
            return Err(ConfigError::ValidationError(
                "quote_mint cannot be empty".to_string(),
            ));
        }

        if self.tokens.base_mint == self.tokens.quote_mint {
            return Err(ConfigError::ValidationError(
                "base_mint and quote_mint must differ".to_string(),
            ));
        }

        // Validate Jupiter
        if self.jupiter.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_url cannot be empty".to_string(),
            ));
        }

        if self.jupiter.slippage_bps > 10_000 {
            return Err(ConfigError::ValidationError(format!(
                "slippage_bps must be 0-10000, got {}",
                self.jupiter.slippage_bps
            )));
        }

        // Validate Solana
        if self.solana.rpc_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "rpc_url cannot be empty".to_string(),
            ));
        }

        if !matches!(
            self.solana.commitment.to_ascii_lowercase().as_str(),
            "processed" | "confirmed" | "finalized"
        ) {
            return Err(ConfigError::ValidationError(format!(
                "commitment must be processed, confirmed or finalized, got {}",
                self.solana.commitment
            )));
        }

        if self.storage.history_file.is_empty() {
            return Err(ConfigError::ValidationError(
                "history_file cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// Conversion from Config to StrategyConfig
impl From<&Config> for crate::strategy::params::StrategyConfig {
    fn from(config: &Config) -> Self {
        crate::strategy::params::StrategyConfig {
            mean_period: config.strategy.mean_period,
            deviation_threshold: config.strategy.deviation_threshold,
            trade_size: config.strategy.trade_size,
            buy_trade_size: config.strategy.buy_trade_size,
        }
    }
}

impl From<&JupiterSection> for crate::adapters::jupiter::JupiterConfig {
    fn from(section: &JupiterSection) -> Self {
        crate::adapters::jupiter::JupiterConfig {
            api_base_url: section.api_url.trim_end_matches('/').to_string(),
            token_api_url: section.token_api_url.trim_end_matches('/').to_string(),
            api_key: section.get_api_key(),
            slippage_bps: section.slippage_bps,
            timeout: std::time::Duration::from_secs(section.timeout_secs),
            max_retries: section.max_retries,
        }
    }
}
