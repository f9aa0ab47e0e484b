use async_trait::async_trait;
use thiserror::Error;

use crate::domain::trade::SwapOrder;

#[derive(Debug, Error)]
pub enum SwapError {
    #[error("Quote request failed: {0}")]
    QuoteFailed(String),
    #[error("Swap build failed: {0}")]
    BuildFailed(String),
    #[error("Transaction signing failed: {0}")]
    SigningError(String),
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
    #[error("Slippage tolerance exceeded")]
    SlippageExceeded,
    #[error("Invalid trade amount: {0}")]
    InvalidAmount(String),
}

/// Submits a swap and waits for confirmation.
///
/// Returns the transaction signature. The executor owns the wallet it
/// signs with.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapExecutor: Send + Sync {
    async fn execute_trade(&self, order: &SwapOrder) -> Result<String, SwapError>;
}
