//! Price Samples
//!
//! A single timestamped observation of the pair price, keyed by the
//! instrument (mint address) it was quoted for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PriceError {
    #[error("Invalid price: {0} (must be positive and finite)")]
    InvalidPrice(f64),
    #[error("Instrument id cannot be empty")]
    EmptyInstrument,
}

/// One observed price for an instrument.
///
/// Serialized with the field names of the on-disk history document:
/// `timestamp` as epoch milliseconds, `tokenAddress` and `symbol` as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSample {
    /// Observation time (millisecond resolution)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Price in quote units
    pub price: f64,
    /// Instrument id (mint address)
    pub token_address: String,
    /// Display symbol
    pub symbol: String,
}

impl PriceSample {
    /// Create a validated sample
    pub fn new(
        timestamp: DateTime<Utc>,
        price: f64,
        token_address: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Result<Self, PriceError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(PriceError::InvalidPrice(price));
        }

        let token_address = token_address.into();
        if token_address.is_empty() {
            return Err(PriceError::EmptyInstrument);
        }

        Ok(Self {
            timestamp: truncate_to_millis(timestamp),
            price,
            token_address,
            symbol: symbol.into(),
        })
    }

    /// Create a sample stamped with the current wall-clock time
    pub fn now(
        price: f64,
        token_address: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Result<Self, PriceError> {
        Self::new(Utc::now(), price, token_address, symbol)
    }

    /// Check the fields a deserialized sample must still satisfy
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0 && !self.token_address.is_empty()
    }
}

// Stored timestamps are epoch millis; keep in-memory samples identical to
// what a reload would produce.
fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOL: &str = "So11111111111111111111111111111111111111112";

    #[test]
    fn test_new_sample() {
        let sample = PriceSample::now(142.5, SOL, "SOL").unwrap();
        assert_eq!(sample.price, 142.5);
        assert_eq!(sample.token_address, SOL);
        assert_eq!(sample.symbol, "SOL");
        assert!(sample.is_valid());
    }

    #[test]
    fn test_rejects_non_positive_price() {
        assert_eq!(
            PriceSample::now(0.0, SOL, "SOL"),
            Err(PriceError::InvalidPrice(0.0))
        );
        assert!(PriceSample::now(-1.0, SOL, "SOL").is_err());
    }

    #[test]
    fn test_rejects_non_finite_price() {
        assert!(PriceSample::now(f64::NAN, SOL, "SOL").is_err());
        assert!(PriceSample::now(f64::INFINITY, SOL, "SOL").is_err());
    }

    #[test]
    fn test_rejects_empty_instrument() {
        assert_eq!(
            PriceSample::now(1.0, "", "SOL"),
            Err(PriceError::EmptyInstrument)
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let ts = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let sample = PriceSample::new(ts, 150.25, SOL, "SOL").unwrap();

        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["timestamp"], 1_700_000_000_123i64);
        assert_eq!(json["price"], 150.25);
        assert_eq!(json["tokenAddress"], SOL);
        assert_eq!(json["symbol"], "SOL");
    }

    #[test]
    fn test_timestamp_truncated_to_millis() {
        let ts = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        let sample = PriceSample::new(ts, 1.0, SOL, "SOL").unwrap();
        assert_eq!(sample.timestamp.timestamp_subsec_nanos(), 123_000_000);
    }
}
