//! Jupiter Quote Types
//!
//! Request and response structures for the Jupiter quote API.

use serde::{Deserialize, Serialize};

/// Request parameters for getting a swap quote
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Input token mint address
    pub input_mint: String,
    /// Output token mint address
    pub output_mint: String,
    /// Amount in base units of the input mint
    pub amount: u64,
    /// Slippage tolerance in basis points (1 = 0.01%)
    pub slippage_bps: u16,
}

impl QuoteRequest {
    /// Create a new quote request with required parameters
    pub fn new(input_mint: String, output_mint: String, amount: u64, slippage_bps: u16) -> Self {
        Self {
            input_mint,
            output_mint,
            amount,
            slippage_bps,
        }
    }
}

/// Response from Jupiter quote API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub input_mint: String,
    pub output_mint: String,
    /// Input amount in base units
    pub in_amount: String,
    /// Output amount in base units
    pub out_amount: String,
    /// Minimum output amount after slippage
    pub other_amount_threshold: String,
    /// Swap mode (ExactIn or ExactOut)
    pub swap_mode: String,
    pub slippage_bps: u16,
    #[serde(default)]
    pub price_impact_pct: String,
    pub route_plan: Vec<RoutePlanStep>,
    #[serde(default)]
    pub context_slot: Option<u64>,
    /// Everything else the API returns. The swap endpoint expects the quote
    /// back verbatim, so unknown fields must survive a round trip.
    #[serde(flatten)]
    pub extra: std::collections::HashMap<String, serde_json::Value>,
}

impl QuoteResponse {
    /// Get output amount as u64
    pub fn output_amount(&self) -> u64 {
        self.out_amount.parse().unwrap_or(0)
    }

    /// Get price impact as f64 percentage
    pub fn price_impact(&self) -> f64 {
        self.price_impact_pct.parse().unwrap_or(0.0)
    }

    /// DEX labels along the route, for logging
    pub fn route_labels(&self) -> Vec<String> {
        self.route_plan
            .iter()
            .map(|step| step.swap_info.label.clone())
            .collect()
    }
}

/// A step in the route plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlanStep {
    pub swap_info: SwapInfo,
    /// Percentage of the trade going through this route
    pub percent: u8,
}

/// Information about a single swap in the route
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapInfo {
    pub amm_key: String,
    /// Label for the DEX (e.g., "Raydium", "Orca")
    pub label: String,
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount: String,
    pub out_amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_mint: Option<String>,
}
