//! Jupiter API Client
//!
//! HTTP client for the Jupiter swap and token APIs.
//! Handles quote fetching, swap building and token metadata lookups,
//! with retry on rate limits and server errors.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::trade::TradingPair;
use crate::ports::execution::SwapError;
use crate::ports::market_data::{PriceSource, QuoteError, TokenInfoSource};
use super::quote::{QuoteRequest, QuoteResponse};
use super::swap::{SwapRequest, SwapResponse};
use super::token::TokenInfo;

#[derive(Debug, Error)]
pub enum JupiterError {
    #[error("Failed to create HTTP client: {0}")]
    ClientError(String),
    #[error("Request failed: {0}")]
    RequestError(String),
    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Slippage tolerance exceeded")]
    SlippageExceeded,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl From<JupiterError> for QuoteError {
    fn from(e: JupiterError) -> Self {
        match e {
            JupiterError::RateLimited => QuoteError::RateLimited,
            JupiterError::NotFound(what) => QuoteError::TokenNotFound(what),
            JupiterError::ParseError(msg) => QuoteError::ParseError(msg),
            JupiterError::RequestError(msg) | JupiterError::ClientError(msg) => {
                QuoteError::RequestError(msg)
            }
            other => QuoteError::ApiError(other.to_string()),
        }
    }
}

impl From<JupiterError> for SwapError {
    fn from(e: JupiterError) -> Self {
        match e {
            JupiterError::SlippageExceeded => SwapError::SlippageExceeded,
            other => SwapError::BuildFailed(other.to_string()),
        }
    }
}

/// Jupiter API client configuration
#[derive(Debug, Clone)]
pub struct JupiterConfig {
    /// Base URL for the swap API (quote + swap)
    pub api_base_url: String,
    /// Base URL for the token API
    pub token_api_url: String,
    /// Optional API key for higher rate limits
    pub api_key: Option<String>,
    /// Slippage used for price quotes
    pub slippage_bps: u16,
    /// Request timeout
    pub timeout: Duration,
    /// Number of retry attempts
    pub max_retries: u32,
}

impl Default for JupiterConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.jup.ag/swap/v1".to_string(),
            token_api_url: "https://api.jup.ag/tokens/v1".to_string(),
            api_key: None,
            slippage_bps: 50,
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

/// Jupiter DEX aggregator client
#[derive(Debug, Clone)]
pub struct JupiterClient {
    config: JupiterConfig,
    http: Client,
}

impl JupiterClient {
    /// Create a new Jupiter client with default configuration
    pub fn new() -> Result<Self, JupiterError> {
        Self::with_config(JupiterConfig::default())
    }

    /// Create a new Jupiter client with custom configuration
    pub fn with_config(config: JupiterConfig) -> Result<Self, JupiterError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| JupiterError::ClientError(e.to_string()))?;

        Ok(Self { config, http })
    }

    /// Get a quote for a token swap
    pub async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, JupiterError> {
        let url = format!("{}/quote", self.config.api_base_url);

        let req = self.http
            .get(&url)
            .query(&[
                ("inputMint", &request.input_mint),
                ("outputMint", &request.output_mint),
                ("amount", &request.amount.to_string()),
                ("slippageBps", &request.slippage_bps.to_string()),
            ]);

        let response = self.send_with_retry(req).await?;
        self.handle_response(response).await
    }

    /// Build the swap transaction for a quote
    pub async fn get_swap_transaction(
        &self,
        request: &SwapRequest,
    ) -> Result<SwapResponse, JupiterError> {
        let url = format!("{}/swap", self.config.api_base_url);
        let req = self.http.post(&url).json(request);

        let response = self.send_with_retry(req).await?;
        self.handle_response(response).await
    }

    /// Fetch token metadata (decimals, symbol) for a mint
    pub async fn get_token_info(&self, mint: &str) -> Result<TokenInfo, JupiterError> {
        let url = format!("{}/token/{}", self.config.token_api_url, mint);
        let req = self.http.get(&url);

        let response = self.send_with_retry(req).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(JupiterError::NotFound(mint.to_string()));
        }

        // The token API answers unknown mints with `null`
        let token: Option<TokenInfo> = self.handle_response(response).await?;
        token.ok_or_else(|| JupiterError::NotFound(mint.to_string()))
    }

    /// Send a request with retry logic and rate limit handling
    async fn send_with_retry(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, JupiterError> {
        let request = match self.config.api_key {
            Some(ref api_key) => request.header("x-api-key", api_key),
            None => request,
        };

        let mut last_error = None;

        for attempt in 0..self.config.max_retries.max(1) {
            let attempt_req = request
                .try_clone()
                .ok_or_else(|| JupiterError::RequestError("Failed to clone request".into()))?;

            match attempt_req.send().await {
                Ok(response) => {
                    let status = response.status();

                    // Handle rate limiting (429) with exponential backoff
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let backoff = Duration::from_secs(2u64.pow(attempt + 1)); // 2s, 4s, 8s
                        tracing::warn!(
                            category = "System",
                            "Rate limited (429), backing off for {:?} (attempt {}/{})",
                            backoff, attempt + 1, self.config.max_retries
                        );
                        last_error = Some(JupiterError::RateLimited);
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    // Retry on server errors (5xx)
                    if status.is_server_error() {
                        last_error = Some(JupiterError::ApiError {
                            status: status.as_u16(),
                            body: "server error".to_string(),
                        });
                        tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    last_error = Some(JupiterError::RequestError(e.to_string()));
                    tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| JupiterError::RequestError("Max retries exceeded".into())))
    }

    /// Handle API response and deserialize
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, JupiterError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(JupiterError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if body.contains("SlippageToleranceExceeded") || body.contains("6001") {
                return Err(JupiterError::SlippageExceeded);
            }

            return Err(JupiterError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| JupiterError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl PriceSource for JupiterClient {
    /// Quote one whole base token into the quote token
    async fn current_price(&self, pair: &TradingPair) -> Result<f64, QuoteError> {
        let one_token = pair
            .base
            .to_base_units(1.0)
            .map_err(|e| QuoteError::ApiError(e.to_string()))?;

        let request = QuoteRequest::new(
            pair.base.mint.clone(),
            pair.quote.mint.clone(),
            one_token,
            self.config.slippage_bps,
        );

        let quote = self.get_quote(&request).await?;
        let price = pair.quote.from_base_units(quote.output_amount());

        if !price.is_finite() || price <= 0.0 {
            return Err(QuoteError::InvalidPrice(price));
        }

        Ok(price)
    }
}

#[async_trait]
impl TokenInfoSource for JupiterClient {
    async fn decimals(&self, mint: &str) -> Result<u8, QuoteError> {
        let token = self.get_token_info(mint).await?;
        Ok(token.decimals)
    }
}
