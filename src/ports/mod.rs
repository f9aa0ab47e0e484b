//! Ports Layer - Trait definitions for external dependencies
//!
//! Interfaces (ports) that adapters implement:
//! - Market data (current pair price, token decimals)
//! - Trade execution (swap submission)
//!
//! History persistence has its own port, `domain::persistence::SnapshotStore`.

pub mod market_data;
pub mod execution;

pub use market_data::{PriceSource, QuoteError, TokenInfoSource};
pub use execution::{SwapError, SwapExecutor};
