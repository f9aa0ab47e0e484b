//! Jupiter Swap Executor
//!
//! Live implementation of the `SwapExecutor` port:
//! quote -> build swap -> decode -> sign -> send -> confirm.

use async_trait::async_trait;
use solana_sdk::transaction::VersionedTransaction;

use crate::adapters::solana::{SolanaClient, WalletManager};
use crate::domain::trade::SwapOrder;
use crate::ports::execution::{SwapError, SwapExecutor};
use super::client::JupiterClient;
use super::quote::QuoteRequest;
use super::swap::{SwapRequest, SwapResponse};

/// Executes swaps through Jupiter, signing with the configured wallet
#[derive(Clone)]
pub struct JupiterSwapExecutor {
    jupiter: JupiterClient,
    solana: SolanaClient,
    wallet: WalletManager,
    slippage_bps: u16,
}

impl JupiterSwapExecutor {
    pub fn new(
        jupiter: JupiterClient,
        solana: SolanaClient,
        wallet: WalletManager,
        slippage_bps: u16,
    ) -> Self {
        Self {
            jupiter,
            solana,
            wallet,
            slippage_bps,
        }
    }

    pub fn wallet_address(&self) -> String {
        self.wallet.public_key()
    }
}

/// Decode the unsigned transaction returned by the swap endpoint
pub fn decode_swap_transaction(swap: &SwapResponse) -> Result<VersionedTransaction, SwapError> {
    let bytes = swap
        .transaction_bytes()
        .map_err(|e| SwapError::BuildFailed(format!("Invalid base64 transaction: {}", e)))?;

    bincode::deserialize(&bytes)
        .map_err(|e| SwapError::BuildFailed(format!("Invalid transaction bytes: {}", e)))
}

#[async_trait]
impl SwapExecutor for JupiterSwapExecutor {
    async fn execute_trade(&self, order: &SwapOrder) -> Result<String, SwapError> {
        let quote_request = QuoteRequest::new(
            order.input_mint.clone(),
            order.output_mint.clone(),
            order.amount,
            self.slippage_bps,
        );

        let quote = self
            .jupiter
            .get_quote(&quote_request)
            .await
            .map_err(|e| SwapError::QuoteFailed(e.to_string()))?;

        tracing::debug!(
            category = "Trade",
            "Quote: {} -> {} base units via {:?} (impact {}%)",
            quote.in_amount,
            quote.out_amount,
            quote.route_labels(),
            quote.price_impact()
        );

        let quote_json = serde_json::to_value(&quote)
            .map_err(|e| SwapError::BuildFailed(e.to_string()))?;
        let swap_request = SwapRequest::new(self.wallet.public_key(), quote_json);
        let swap = self.jupiter.get_swap_transaction(&swap_request).await?;

        let unsigned = decode_swap_transaction(&swap)?;
        let signed = self
            .wallet
            .sign_versioned(unsigned)
            .map_err(|e| SwapError::SigningError(e.to_string()))?;

        self.solana
            .send_and_confirm_versioned(&signed)
            .await
            .map_err(|e| SwapError::TransactionFailed(e.to_string()))
    }
}
