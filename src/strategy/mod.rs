//! Strategy Layer - Z-Score Mean Reversion
//!
//! - `params`: immutable strategy configuration
//! - `zscore_gate`: pure BUY / SELL / HOLD evaluation over a price window

pub mod params;
pub mod zscore_gate;

pub use params::{ParamsError, StrategyConfig, MIN_MEAN_PERIOD};
pub use zscore_gate::{analyze, evaluate, ZScoreGate, ZScoreResult};
