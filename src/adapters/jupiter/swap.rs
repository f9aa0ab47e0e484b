//! Jupiter Swap Types
//!
//! Request and response structures for the Jupiter swap API, which turns a
//! quote into a serialized, unsigned transaction.

use serde::{Deserialize, Serialize};

/// Request parameters for building a swap transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    /// User's public key (wallet address)
    pub user_public_key: String,
    /// The full quote response from /quote endpoint
    pub quote_response: serde_json::Value,
    /// Whether to use dynamic compute unit limit calculation
    #[serde(default = "default_dynamic_compute_unit_limit")]
    pub dynamic_compute_unit_limit: bool,
}

fn default_dynamic_compute_unit_limit() -> bool {
    true
}

impl SwapRequest {
    pub fn new(user_public_key: String, quote_response: serde_json::Value) -> Self {
        Self {
            user_public_key,
            quote_response,
            dynamic_compute_unit_limit: true,
        }
    }
}

/// Response from Jupiter swap API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    /// Base64 encoded serialized transaction ready to sign and send
    pub swap_transaction: String,
    /// Last valid block height for this transaction
    pub last_valid_block_height: u64,
    /// Prioritization fee applied (in lamports)
    #[serde(default)]
    pub prioritization_fee_lamports: u64,
}

impl SwapResponse {
    /// Get the transaction bytes from base64
    pub fn transaction_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.decode(&self.swap_transaction)
    }
}
