//! Reverter - Z-Score Mean Reversion Trading Bot Library
//!
//! Polls Jupiter for a pair price, keeps a bounded and persisted price
//! history, and swaps when the latest price strays too far from the
//! rolling mean.
//!
//! # Modules
//!
//! - `domain`: Core types (PriceSample, PriceStore, Signal, TradeGuard)
//! - `ports`: Trait abstractions (PriceSource, TokenInfoSource, SwapExecutor)
//! - `strategy`: Signal generation (ZScoreGate)
//! - `adapters`: External implementations (Jupiter, Solana, paper, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Orchestrator (the polling loop)

pub mod domain;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;
