//! Trading pair and swap orders
//!
//! Maps a signal onto the concrete swap to submit: which mint is spent,
//! which is received, and how many base units of the input mint.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::signal::Signal;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AmountError {
    #[error("Amount {0} cannot be represented")]
    NotRepresentable(f64),
    #[error("Amount {amount} with {decimals} decimals overflows base units")]
    Overflow { amount: f64, decimals: u8 },
    #[error("Amount {amount} rounds to zero base units at {decimals} decimals")]
    Zero { amount: f64, decimals: u8 },
}

/// A token with its decimal precision, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub mint: String,
    pub decimals: u8,
}

impl Instrument {
    pub fn new(mint: impl Into<String>, decimals: u8) -> Self {
        Self {
            mint: mint.into(),
            decimals,
        }
    }

    /// Base units per whole token (10^decimals)
    pub fn scale(&self) -> Option<Decimal> {
        10u64.checked_pow(self.decimals as u32).map(Decimal::from)
    }

    /// Convert a whole-token amount to integer base units, truncating dust
    pub fn to_base_units(&self, amount: f64) -> Result<u64, AmountError> {
        let overflow = AmountError::Overflow {
            amount,
            decimals: self.decimals,
        };

        if !amount.is_finite() || amount <= 0.0 {
            return Err(AmountError::NotRepresentable(amount));
        }
        let value = Decimal::from_f64(amount).ok_or(AmountError::NotRepresentable(amount))?;
        let scale = self.scale().ok_or_else(|| overflow.clone())?;

        let raw = value
            .checked_mul(scale)
            .ok_or_else(|| overflow.clone())?
            .trunc()
            .to_u64()
            .ok_or(overflow)?;

        if raw == 0 {
            return Err(AmountError::Zero {
                amount,
                decimals: self.decimals,
            });
        }
        Ok(raw)
    }

    /// Convert integer base units back to whole tokens
    pub fn from_base_units(&self, raw: u64) -> f64 {
        raw as f64 / 10f64.powi(self.decimals as i32)
    }
}

/// The configured pair. History is keyed by the base mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingPair {
    /// Traded asset (e.g. SOL)
    pub base: Instrument,
    /// Pricing asset (e.g. USDC)
    pub quote: Instrument,
    /// Display symbol of the base asset
    pub symbol: String,
}

impl TradingPair {
    pub fn new(base: Instrument, quote: Instrument, symbol: impl Into<String>) -> Self {
        Self {
            base,
            quote,
            symbol: symbol.into(),
        }
    }

    /// Key of this pair in the price history
    pub fn instrument_id(&self) -> &str {
        &self.base.mint
    }

    /// (input, output) for a signal. Buying spends the quote asset for the
    /// base asset; selling is the configured direction.
    pub fn swap_legs(&self, signal: Signal) -> Option<(&Instrument, &Instrument)> {
        match signal {
            Signal::Buy => Some((&self.quote, &self.base)),
            Signal::Sell => Some((&self.base, &self.quote)),
            Signal::Hold => None,
        }
    }
}

/// A fully resolved swap ready for the executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapOrder {
    pub signal: Signal,
    pub input_mint: String,
    pub output_mint: String,
    /// Amount of the input mint in base units
    pub amount: u64,
    /// Same amount in whole tokens, for display
    pub ui_amount: f64,
}

impl SwapOrder {
    /// Build the order for a signal. `trade_size` is in whole tokens of the
    /// swap's input instrument. Returns `Ok(None)` for `Hold`.
    pub fn for_signal(
        signal: Signal,
        pair: &TradingPair,
        trade_size: f64,
    ) -> Result<Option<Self>, AmountError> {
        let Some((input, output)) = pair.swap_legs(signal) else {
            return Ok(None);
        };

        Ok(Some(Self {
            signal,
            input_mint: input.mint.clone(),
            output_mint: output.mint.clone(),
            amount: input.to_base_units(trade_size)?,
            ui_amount: trade_size,
        }))
    }
}
