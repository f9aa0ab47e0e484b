//! Domain Layer - Core types for the mean reversion engine
//!
//! Pure domain types and logic. The only I/O here is the snapshot file
//! behind the [`SnapshotStore`] trait; everything external goes through
//! the ports layer.
//!
//! - `price`: timestamped price samples
//! - `history`: bounded per-instrument price store
//! - `persistence`: durable history snapshots
//! - `signal`: BUY / SELL / HOLD decisions
//! - `trade`: trading pair, decimals and swap orders
//! - `trade_guard`: single-flight guard for trade execution

pub mod price;
pub mod history;
pub mod persistence;
pub mod signal;
pub mod trade;
pub mod trade_guard;

pub use price::{PriceSample, PriceError};
pub use history::{PriceStore, RestoreStatus, StoreError, DEFAULT_HISTORY_CAPACITY};
pub use persistence::{JsonSnapshotFile, PersistError, Snapshot, SnapshotStore, DEFAULT_HISTORY_FILE};
pub use signal::Signal;
pub use trade::{AmountError, Instrument, SwapOrder, TradingPair};
pub use trade_guard::{GuardState, TradeGuard, TradeLease};
