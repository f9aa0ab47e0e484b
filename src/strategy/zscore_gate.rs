//! Z-Score Gate
//!
//! Pure signal generator over a price window.
//!
//! Z-Score Formula: z = (last_price - mean) / std_dev
//!
//! computed over the last `mean_period` prices with the population variance
//! (divisor `mean_period`). Below `-threshold` the price is abnormally low
//! (BUY), above `threshold` abnormally high (SELL). A flat window has no
//! deviation and never signals.

use statrs::function::erf::erf;
use statrs::statistics::Statistics;

use crate::domain::price::PriceSample;
use crate::domain::signal::Signal;
use crate::strategy::params::StrategyConfig;

/// Result of z-score calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScoreResult {
    /// Current z-score value
    pub z_score: f64,
    /// Window mean
    pub mean: f64,
    /// Window population standard deviation
    pub std_dev: f64,
    /// Most recent price in the window
    pub current_price: f64,
}

impl ZScoreResult {
    /// Check if z-score indicates oversold (below negative threshold)
    pub fn is_oversold(&self, threshold: f64) -> bool {
        self.z_score < -threshold
    }

    /// Check if z-score indicates overbought (above positive threshold)
    pub fn is_overbought(&self, threshold: f64) -> bool {
        self.z_score > threshold
    }

    /// Distance from mean in terms of standard deviations
    pub fn deviation_magnitude(&self) -> f64 {
        self.z_score.abs()
    }

    /// Standard normal CDF of the deviation magnitude, in 0.5..1.0
    pub fn confidence(&self) -> f64 {
        0.5 * (1.0 + erf(self.deviation_magnitude() / f64::sqrt(2.0)))
    }

    /// Decision rule; oversold is checked first
    pub fn signal(&self, threshold: f64) -> Signal {
        if self.is_oversold(threshold) {
            Signal::Buy
        } else if self.is_overbought(threshold) {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

/// Window statistics, or `None` when there are fewer than `mean_period`
/// samples or the slice has zero deviation.
pub fn analyze(window: &[PriceSample], config: &StrategyConfig) -> Option<ZScoreResult> {
    let period = config.mean_period;
    if period == 0 || window.len() < period {
        return None;
    }

    let slice = &window[window.len() - period..];
    let prices: Vec<f64> = slice.iter().map(|s| s.price).collect();

    let mean = prices.iter().mean();
    let std_dev = prices.iter().population_std_dev();

    if !std_dev.is_finite() || std_dev <= 0.0 {
        return None;
    }

    let current_price = *prices.last()?;
    let z_score = (current_price - mean) / std_dev;
    if !z_score.is_finite() {
        return None;
    }

    Some(ZScoreResult {
        z_score,
        mean,
        std_dev,
        current_price,
    })
}

/// BUY / SELL / HOLD for a window
pub fn evaluate(window: &[PriceSample], config: &StrategyConfig) -> Signal {
    analyze(window, config)
        .map(|r| r.signal(config.deviation_threshold))
        .unwrap_or(Signal::Hold)
}

/// Signal generator bound to a fixed configuration
#[derive(Debug, Clone)]
pub struct ZScoreGate {
    config: StrategyConfig,
}

impl ZScoreGate {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, window: &[PriceSample]) -> Option<ZScoreResult> {
        analyze(window, &self.config)
    }

    pub fn evaluate(&self, window: &[PriceSample]) -> Signal {
        evaluate(window, &self.config)
    }

    /// Get the current deviation threshold from config
    pub fn threshold(&self) -> f64 {
        self.config.deviation_threshold
    }

    /// Samples needed before a signal can fire
    pub fn mean_period(&self) -> usize {
        self.config.mean_period
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }
}
