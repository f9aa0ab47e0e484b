//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, ConfigError, JupiterSection, LoggingSection, SolanaSection, StorageSection,
    StrategySection, TokensSection, load_config,
};
