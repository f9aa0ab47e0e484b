//! Market data ports: current pair price and token decimals

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::trade::TradingPair;

/// Price or token metadata fetch failed
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Request failed: {0}")]
    RequestError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, try again later")]
    RateLimited,

    #[error("Token not found: {0}")]
    TokenNotFound(String),

    #[error("Quote produced an unusable price: {0}")]
    InvalidPrice(f64),
}

/// Source of the current pair price (quote units per whole base token)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn current_price(&self, pair: &TradingPair) -> Result<f64, QuoteError>;
}

/// Token decimal precision lookup, used once at startup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenInfoSource: Send + Sync {
    async fn decimals(&self, mint: &str) -> Result<u8, QuoteError>;
}
