use std::fmt;
use serde::{Deserialize, Serialize};

/// Trading decision produced by the signal generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    /// Price abnormally low against its recent mean
    Buy,
    /// Price abnormally high against its recent mean
    Sell,
    /// No signal
    Hold,
}

impl Signal {
    /// Whether the signal calls for a trade
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Signal::Hold)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actionable() {
        assert!(Signal::Buy.is_actionable());
        assert!(Signal::Sell.is_actionable());
        assert!(!Signal::Hold.is_actionable());
    }

    #[test]
    fn test_display() {
        assert_eq!(Signal::Buy.to_string(), "BUY");
        assert_eq!(Signal::Sell.to_string(), "SELL");
        assert_eq!(Signal::Hold.to_string(), "HOLD");
    }

    #[test]
    fn test_serialization() {
        assert_eq!(serde_json::to_string(&Signal::Sell).unwrap(), r#""SELL""#);
        let parsed: Signal = serde_json::from_str(r#""BUY""#).unwrap();
        assert_eq!(parsed, Signal::Buy);
    }
}
