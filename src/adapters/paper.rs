//! Paper Trading Executor
//!
//! A `SwapExecutor` that never touches the network. Orders are logged and
//! recorded, and a synthetic `PAPER-<hex>` signature is returned so the rest
//! of the engine runs exactly as it does live.

use async_trait::async_trait;
use rand::Rng;
use std::sync::Mutex;
use tracing::info;

use crate::domain::trade::SwapOrder;
use crate::ports::execution::{SwapError, SwapExecutor};

/// Prefix of every synthetic signature
pub const PAPER_SIGNATURE_PREFIX: &str = "PAPER-";

#[derive(Debug, Default)]
pub struct PaperSwapExecutor {
    executed: Mutex<Vec<SwapOrder>>,
}

impl PaperSwapExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders "executed" so far, oldest first
    pub fn executed(&self) -> Vec<SwapOrder> {
        self.executed
            .lock()
            .map(|orders| orders.clone())
            .unwrap_or_default()
    }

    fn synthetic_signature() -> String {
        let bytes: [u8; 16] = rand::thread_rng().gen();
        let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        format!("{}{}", PAPER_SIGNATURE_PREFIX, hex)
    }
}

#[async_trait]
impl SwapExecutor for PaperSwapExecutor {
    async fn execute_trade(&self, order: &SwapOrder) -> Result<String, SwapError> {
        if order.amount == 0 {
            return Err(SwapError::InvalidAmount("zero amount".to_string()));
        }

        let signature = Self::synthetic_signature();
        info!(
            category = "Trade",
            "[PAPER] {} {} base units {} -> {} ({})",
            order.signal,
            order.amount,
            order.input_mint,
            order.output_mint,
            signature
        );

        if let Ok(mut orders) = self.executed.lock() {
            orders.push(order.clone());
        }

        Ok(signature)
    }
}
