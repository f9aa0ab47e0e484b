//! Jupiter Token Types
//!
//! Token metadata returned by the Jupiter token API (`/token/{mint}`).

use serde::{Deserialize, Serialize};

/// Token information from Jupiter API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token mint address
    pub address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    /// Number of decimals
    pub decimals: u8,
    #[serde(rename = "logoURI", default)]
    pub logo_uri: Option<String>,
    /// Tags (e.g., "verified", "strict", "community")
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub daily_volume: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_info_parsing() {
        let json = r#"{
            "address": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "name": "USD Coin",
            "symbol": "USDC",
            "decimals": 6,
            "logoURI": "https://example.com/usdc.png",
            "tags": ["verified", "community", "strict"],
            "daily_volume": 512345678.9,
            "created_at": "2024-04-26T10:56:58.893768Z",
            "freeze_authority": "7dGbd2QZcCKcTndnHcTL8q7SMVXAkp688NTQYwrRCrar",
            "mint_authority": "BJE5MMbqXjVwjAF7oxwPYXnTXDyspzZyt4vwenNw5ruG",
            "permanent_delegate": null,
            "extensions": { "coingeckoId": "usd-coin" }
        }"#;

        let token: TokenInfo = serde_json::from_str(json).unwrap();
        assert_eq!(token.decimals, 6);
        assert_eq!(token.symbol, "USDC");
        assert!(token.tags.iter().any(|t| t == "verified"));
    }

    #[test]
    fn test_minimal_token_info() {
        let json = r#"{ "address": "So11111111111111111111111111111111111111112", "decimals": 9 }"#;
        let token: TokenInfo = serde_json::from_str(json).unwrap();
        assert_eq!(token.decimals, 9);
        assert!(token.tags.is_empty());
    }
}
