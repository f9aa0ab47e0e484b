//! Strategy Parameters
//!
//! Configuration for the mean reversion signal. Defaults: 100-sample
//! window, 2 standard deviations, 0.01 tokens per trade.

use serde::{Deserialize, Serialize};

use crate::domain::signal::Signal;

/// Smallest usable statistical window
pub const MIN_MEAN_PERIOD: usize = 2;

/// Main strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Number of most recent samples in the statistical window
    pub mean_period: usize,
    /// Z-score magnitude that triggers a signal (e.g., 2.0 = 2 std devs)
    pub deviation_threshold: f64,
    /// Whole tokens of the swap input per trade. Base tokens sold on a Sell,
    /// and quote tokens spent on a Buy unless `buy_trade_size` is set.
    pub trade_size: f64,
    /// Quote tokens spent per Buy
    #[serde(default)]
    pub buy_trade_size: Option<f64>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            mean_period: 100,
            deviation_threshold: 2.0,
            trade_size: 0.01,
            buy_trade_size: None,
        }
    }
}

impl StrategyConfig {
    /// Create a new config with custom deviation threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.deviation_threshold = threshold;
        self
    }

    /// Create a new config with custom mean period
    pub fn with_mean_period(mut self, period: usize) -> Self {
        self.mean_period = period;
        self
    }

    pub fn with_trade_size(mut self, size: f64) -> Self {
        self.trade_size = size;
        self
    }

    pub fn with_buy_trade_size(mut self, size: f64) -> Self {
        self.buy_trade_size = Some(size);
        self
    }

    /// Whole tokens of the input instrument to spend for a signal
    pub fn size_for(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Buy => self.buy_trade_size.unwrap_or(self.trade_size),
            Signal::Sell | Signal::Hold => self.trade_size,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.mean_period < MIN_MEAN_PERIOD {
            return Err(ParamsError::InvalidMeanPeriod(self.mean_period));
        }
        if !self.deviation_threshold.is_finite() || self.deviation_threshold <= 0.0 {
            return Err(ParamsError::InvalidThreshold(self.deviation_threshold));
        }
        if !self.trade_size.is_finite() || self.trade_size <= 0.0 {
            return Err(ParamsError::InvalidTradeSize(self.trade_size));
        }
        if let Some(size) = self.buy_trade_size {
            if !size.is_finite() || size <= 0.0 {
                return Err(ParamsError::InvalidTradeSize(size));
            }
        }
        Ok(())
    }
}

/// Parameter validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamsError {
    #[error("Invalid mean period: {0} (minimum 2)")]
    InvalidMeanPeriod(usize),
    #[error("Invalid deviation threshold: {0} (must be positive)")]
    InvalidThreshold(f64),
    #[error("Invalid trade size: {0} (must be positive)")]
    InvalidTradeSize(f64),
}
