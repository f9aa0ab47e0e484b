//! Trading Orchestrator
//!
//! Coordinates the z-score signal with trade execution.
//! Main loop: fetch price -> append to history -> evaluate window ->
//! dispatch a trade when a signal fires and no trade is in flight.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::domain::history::{PriceStore, RestoreStatus, StoreError};
use crate::domain::price::{PriceError, PriceSample};
use crate::domain::signal::Signal;
use crate::domain::trade::{Instrument, SwapOrder, TradingPair};
use crate::domain::trade_guard::{GuardState, TradeGuard};
use crate::ports::execution::{SwapError, SwapExecutor};
use crate::ports::market_data::{PriceSource, QuoteError, TokenInfoSource};
use crate::strategy::{ParamsError, StrategyConfig, ZScoreGate, ZScoreResult};

/// Default time between price polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Fatal errors while bringing the engine up
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid strategy parameters: {0}")]
    InvalidParams(#[from] ParamsError),
    #[error("Failed to fetch decimals for {mint}: {source}")]
    DecimalsLookup {
        mint: String,
        #[source]
        source: QuoteError,
    },
}

/// Per-tick failures. Logged by `run`, never fatal.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Market data error: {0}")]
    MarketData(#[from] QuoteError),
    #[error("Rejected price sample: {0}")]
    InvalidSample(#[from] PriceError),
    #[error("History error: {0}")]
    History(#[from] StoreError),
    #[error("Execution error: {0}")]
    Execution(#[from] SwapError),
}

/// What happened to the trade side of a tick
#[derive(Debug)]
pub enum TradeDispatch {
    /// Signal was HOLD
    NotNeeded,
    /// A trade was already executing, this signal was dropped
    Busy,
    /// Trade spawned; the handle resolves to the signature
    Dispatched(JoinHandle<Result<String, SwapError>>),
}

impl TradeDispatch {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, TradeDispatch::Dispatched(_))
    }
}

/// Result of one polling iteration
#[derive(Debug)]
pub struct TickReport {
    pub price: f64,
    pub signal: Signal,
    pub analysis: Option<ZScoreResult>,
    pub dispatch: TradeDispatch,
}

/// Status snapshot of the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorStatus {
    pub is_running: bool,
    pub trade_state: GuardState,
    pub samples: usize,
    pub capacity: usize,
    pub last_price: Option<f64>,
    pub current_zscore: Option<f64>,
}

/// Fetch decimals for both mints and build the pair. Any failure is fatal.
pub async fn resolve_pair(
    tokens: &dyn TokenInfoSource,
    base_mint: &str,
    quote_mint: &str,
    symbol: &str,
) -> Result<TradingPair, StartupError> {
    let base = lookup_instrument(tokens, base_mint).await?;
    let quote = lookup_instrument(tokens, quote_mint).await?;
    Ok(TradingPair::new(base, quote, symbol))
}

async fn lookup_instrument(
    tokens: &dyn TokenInfoSource,
    mint: &str,
) -> Result<Instrument, StartupError> {
    let decimals = tokens
        .decimals(mint)
        .await
        .map_err(|source| StartupError::DecimalsLookup {
            mint: mint.to_string(),
            source,
        })?;
    Ok(Instrument::new(mint, decimals))
}

/// Main trading orchestrator
#[derive(Clone)]
pub struct TradingOrchestrator {
    gate: ZScoreGate,
    pair: TradingPair,
    prices: Arc<dyn PriceSource>,
    executor: Arc<dyn SwapExecutor>,
    store: Arc<RwLock<PriceStore>>,
    guard: TradeGuard,
    is_running: Arc<RwLock<bool>>,
    poll_interval: Duration,
}

impl TradingOrchestrator {
    /// Create a new orchestrator over an already resolved pair.
    /// The store is used as-is; see [`TradingOrchestrator::start`] for restore.
    pub fn new(
        config: StrategyConfig,
        pair: TradingPair,
        prices: Arc<dyn PriceSource>,
        executor: Arc<dyn SwapExecutor>,
        store: PriceStore,
    ) -> Result<Self, StartupError> {
        config.validate()?;

        Ok(Self {
            gate: ZScoreGate::new(config),
            pair,
            prices,
            executor,
            store: Arc::new(RwLock::new(store)),
            guard: TradeGuard::new(),
            is_running: Arc::new(RwLock::new(false)),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Full startup: validate params, resolve decimals, restore history
    /// and log the configuration banner.
    pub async fn start(
        config: StrategyConfig,
        tokens: &dyn TokenInfoSource,
        base_mint: &str,
        quote_mint: &str,
        symbol: &str,
        prices: Arc<dyn PriceSource>,
        executor: Arc<dyn SwapExecutor>,
        mut store: PriceStore,
    ) -> Result<(Self, RestoreStatus), StartupError> {
        let pair = match config.validate() {
            Ok(()) => resolve_pair(tokens, base_mint, quote_mint, symbol).await,
            Err(e) => Err(e.into()),
        }
        .map_err(|e| {
            tracing::error!(category = "Error", "Startup failed: {}", e);
            e
        })?;

        let restore = store.restore();
        match &restore {
            RestoreStatus::Fresh => {
                tracing::info!(category = "System", "No price history found, starting fresh");
            }
            RestoreStatus::Restored { instruments, samples } => {
                tracing::info!(
                    category = "System",
                    "Loaded {} price samples for {} instrument(s)",
                    samples,
                    instruments
                );
            }
            RestoreStatus::Degraded(reason) => {
                tracing::warn!(
                    category = "Error",
                    "Price history unreadable ({}), starting with empty history",
                    reason
                );
            }
        }

        let orchestrator = Self::new(config, pair, prices, executor, store)?;
        orchestrator.log_banner();
        Ok((orchestrator, restore))
    }

    fn log_banner(&self) {
        let config = self.gate.config();
        tracing::info!(category = "System", "Mean reversion engine configuration:");
        tracing::info!(category = "System", "  Token: {} ({})", self.pair.symbol, self.pair.base.mint);
        tracing::info!(category = "System", "  Quote: {}", self.pair.quote.mint);
        tracing::info!(
            category = "System",
            "  Decimals: base {} / quote {}",
            self.pair.base.decimals,
            self.pair.quote.decimals
        );
        tracing::info!(category = "System", "  Mean period: {}", config.mean_period);
        tracing::info!(category = "System", "  Deviation threshold: {}", config.deviation_threshold);
        tracing::info!(
            category = "System",
            "  Sell size: {} (base token)",
            config.size_for(Signal::Sell)
        );
        tracing::info!(
            category = "System",
            "  Buy size: {} (quote token)",
            config.size_for(Signal::Buy)
        );
        if config.buy_trade_size.is_none() {
            tracing::warn!(
                category = "System",
                "buy_trade_size is not set: a Buy spends {} of the QUOTE token, not the base token",
                config.trade_size
            );
        }
    }

    /// Set custom poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Run the main trading loop until `stop` is called
    pub async fn run(&self) {
        *self.is_running.write().await = true;

        tracing::info!(
            category = "System",
            "Starting trading loop for {} - poll interval {:?}",
            self.pair.symbol,
            self.poll_interval
        );

        while *self.is_running.read().await {
            if let Err(e) = self.tick().await {
                tracing::error!(category = "Error", "Tick failed: {}", e);
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        tracing::info!(category = "System", "Trading loop stopped");
    }

    /// Execute one polling iteration
    pub async fn tick(&self) -> Result<TickReport, OrchestratorError> {
        // 1. Fetch current price
        let price = self.prices.current_price(&self.pair).await?;
        tracing::info!(category = "Price", "{}: {:.6}", self.pair.symbol, price);

        // 2. Append to history and take the window
        let (window, storage, snapshot) = {
            let mut store = self.store.write().await;
            let sample = self.stamp_sample(&store, price)?;
            store.record(sample)?;
            (
                store.window(self.pair.instrument_id(), self.gate.mean_period()),
                store.storage(),
                store.snapshot(),
            )
        };

        // Durable write happens off the async workers and outside the lock
        match tokio::task::spawn_blocking(move || storage.save(&snapshot)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(category = "Error", "Failed to save price history: {}", e);
            }
            Err(e) => {
                tracing::error!(category = "Error", "Price history writer died: {}", e);
            }
        }

        // 3. Evaluate
        let analysis = self.gate.analyze(&window);
        let signal = analysis
            .map(|z| z.signal(self.gate.threshold()))
            .unwrap_or(Signal::Hold);

        match &analysis {
            Some(z) => tracing::info!(
                category = "Signal",
                "mean {:.6} | std {:.6} | z {:.3} | {} (confidence {:.1}%)",
                z.mean,
                z.std_dev,
                z.z_score,
                signal,
                z.confidence() * 100.0
            ),
            None => tracing::info!(
                category = "Signal",
                "Collecting data {}/{} | {}",
                window.len(),
                self.gate.mean_period(),
                signal
            ),
        }

        // 4. Dispatch
        let dispatch = if signal.is_actionable() {
            self.dispatch_trade(signal)?
        } else {
            TradeDispatch::NotNeeded
        };

        Ok(TickReport {
            price,
            signal,
            analysis,
            dispatch,
        })
    }

    /// Sample stamped with the wall clock, but never earlier than the newest
    /// stored sample. A clock stepped back (or a snapshot written by a host
    /// running ahead) would otherwise make every append fail as out of order.
    fn stamp_sample(&self, store: &PriceStore, price: f64) -> Result<PriceSample, PriceError> {
        let now = Utc::now();
        let timestamp = match store.latest(self.pair.instrument_id()) {
            Some(latest) if latest.timestamp > now => {
                tracing::warn!(
                    category = "Price",
                    "Clock is behind the latest stored sample ({} > {}), reusing its timestamp",
                    latest.timestamp,
                    now
                );
                latest.timestamp
            }
            _ => now,
        };
        PriceSample::new(timestamp, price, self.pair.instrument_id(), self.pair.symbol.as_str())
    }

    fn dispatch_trade(&self, signal: Signal) -> Result<TradeDispatch, OrchestratorError> {
        let Some(lease) = self.guard.try_acquire() else {
            tracing::info!(category = "Trade", "Trade already in progress, skipping {}", signal);
            return Ok(TradeDispatch::Busy);
        };

        let order = match SwapOrder::for_signal(signal, &self.pair, self.gate.config().size_for(signal)) {
            Ok(Some(order)) => order,
            Ok(None) => return Ok(TradeDispatch::NotNeeded),
            Err(e) => {
                tracing::error!(category = "Error", "Cannot size {} order: {}", signal, e);
                return Err(SwapError::InvalidAmount(e.to_string()).into());
            }
        };

        tracing::info!(
            category = "Trade",
            "{} {} ({} base units) {} -> {}",
            signal,
            order.ui_amount,
            order.amount,
            order.input_mint,
            order.output_mint
        );

        let executor = Arc::clone(&self.executor);
        let handle = tokio::spawn(async move {
            // Held until the task ends, however it ends
            let _lease = lease;

            let result = executor.execute_trade(&order).await;
            match &result {
                Ok(signature) => {
                    tracing::info!(category = "Trade", "{} confirmed: {}", order.signal, signature);
                }
                Err(e) => {
                    tracing::error!(category = "Error", "{} failed: {}", order.signal, e);
                }
            }
            result
        });

        Ok(TradeDispatch::Dispatched(handle))
    }

    /// Stop the trading loop
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
        tracing::info!(category = "System", "Stop signal sent to orchestrator");
    }

    /// Get current status snapshot
    pub async fn status(&self) -> OrchestratorStatus {
        let is_running = *self.is_running.read().await;
        let store = self.store.read().await;
        let instrument = self.pair.instrument_id();
        let window = store.window(instrument, self.gate.mean_period());

        OrchestratorStatus {
            is_running,
            trade_state: self.guard.state(),
            samples: store.len(instrument),
            capacity: store.capacity(),
            last_price: store.latest(instrument).map(|s| s.price),
            current_zscore: self.gate.analyze(&window).map(|z| z.z_score),
        }
    }

    /// Shared handle to the price history (read it, don't write it)
    pub fn store(&self) -> Arc<RwLock<PriceStore>> {
        Arc::clone(&self.store)
    }

    pub fn guard(&self) -> &TradeGuard {
        &self.guard
    }

    pub fn pair(&self) -> &TradingPair {
        &self.pair
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::persistence::{JsonSnapshotFile, PersistError, Snapshot, SnapshotStore};
    use crate::ports::execution::MockSwapExecutor;
    use crate::ports::market_data::{MockPriceSource, MockTokenInfoSource};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const SOL: &str = "So11111111111111111111111111111111111111112";
    const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn sol_usdc() -> TradingPair {
        TradingPair::new(Instrument::new(SOL, 9), Instrument::new(USDC, 6), "SOL")
    }

    fn small_config() -> StrategyConfig {
        StrategyConfig::default().with_mean_period(5).with_threshold(1.5)
    }

    fn store_in(dir: &TempDir) -> PriceStore {
        PriceStore::new(Box::new(JsonSnapshotFile::in_dir(dir.path())), 100)
    }

    /// Price source replaying a fixed sequence
    fn scripted_prices(prices: Vec<f64>) -> MockPriceSource {
        let queue = Mutex::new(VecDeque::from(prices));
        let mut mock = MockPriceSource::new();
        mock.expect_current_price().returning(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(QuoteError::ApiError("script exhausted".to_string()))
        });
        mock
    }

    fn orchestrator(
        prices: MockPriceSource,
        executor: MockSwapExecutor,
        dir: &TempDir,
    ) -> TradingOrchestrator {
        TradingOrchestrator::new(
            small_config(),
            sol_usdc(),
            Arc::new(prices),
            Arc::new(executor),
            store_in(dir),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_orchestrator_creation() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(MockPriceSource::new(), MockSwapExecutor::new(), &dir);
        let status = orch.status().await;

        assert!(!status.is_running);
        assert_eq!(status.trade_state, GuardState::Idle);
        assert_eq!(status.samples, 0);
        assert_eq!(status.capacity, 100);
        assert!(status.last_price.is_none());
        assert_eq!(orch.poll_interval(), DEFAULT_POLL_INTERVAL);
    }

    #[tokio::test]
    async fn test_invalid_params_rejected() {
        let dir = TempDir::new().unwrap();
        let result = TradingOrchestrator::new(
            StrategyConfig::default().with_mean_period(1),
            sol_usdc(),
            Arc::new(MockPriceSource::new()),
            Arc::new(MockSwapExecutor::new()),
            store_in(&dir),
        );
        assert!(matches!(result, Err(StartupError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_warmup_holds() {
        let dir = TempDir::new().unwrap();
        let mut executor = MockSwapExecutor::new();
        executor.expect_execute_trade().times(0);

        let orch = orchestrator(scripted_prices(vec![100.0, 101.0, 99.0]), executor, &dir);
        for _ in 0..3 {
            let report = orch.tick().await.unwrap();
            assert_eq!(report.signal, Signal::Hold);
            assert!(report.analysis.is_none());
            assert!(matches!(report.dispatch, TradeDispatch::NotNeeded));
        }

        let status = orch.status().await;
        assert_eq!(status.samples, 3);
        assert_eq!(status.last_price, Some(99.0));
    }

    #[tokio::test]
    async fn test_spike_dispatches_sell() {
        let dir = TempDir::new().unwrap();
        let mut executor = MockSwapExecutor::new();
        executor
            .expect_execute_trade()
            .withf(|order| order.signal == Signal::Sell && order.input_mint == SOL)
            .times(1)
            .returning(|_| Ok("5igSig".to_string()));

        let orch = orchestrator(
            scripted_prices(vec![100.0, 101.0, 99.0, 100.0, 130.0]),
            executor,
            &dir,
        );
        for _ in 0..4 {
            orch.tick().await.unwrap();
        }

        let report = orch.tick().await.unwrap();
        assert_eq!(report.signal, Signal::Sell);
        let TradeDispatch::Dispatched(handle) = report.dispatch else {
            panic!("expected a dispatched trade");
        };
        assert_eq!(handle.await.unwrap().unwrap(), "5igSig");
        assert!(!orch.guard().is_executing());
    }

    #[tokio::test]
    async fn test_dip_dispatches_buy_with_quote_input() {
        let dir = TempDir::new().unwrap();
        let mut executor = MockSwapExecutor::new();
        executor
            .expect_execute_trade()
            .withf(|order| {
                order.signal == Signal::Buy
                    && order.input_mint == USDC
                    && order.output_mint == SOL
                    && order.amount == 10_000
            })
            .times(1)
            .returning(|_| Ok("buySig".to_string()));

        let orch = orchestrator(
            scripted_prices(vec![100.0, 101.0, 99.0, 100.0, 70.0]),
            executor,
            &dir,
        );
        for _ in 0..4 {
            orch.tick().await.unwrap();
        }

        let report = orch.tick().await.unwrap();
        assert_eq!(report.signal, Signal::Buy);
        let TradeDispatch::Dispatched(handle) = report.dispatch else {
            panic!("expected a dispatched trade");
        };
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_buy_uses_quote_side_size() {
        let dir = TempDir::new().unwrap();
        let mut executor = MockSwapExecutor::new();
        executor
            .expect_execute_trade()
            .withf(|order| order.signal == Signal::Buy && order.amount == 1_500_000)
            .times(1)
            .returning(|_| Ok("buySig".to_string()));

        let orch = TradingOrchestrator::new(
            small_config().with_buy_trade_size(1.5),
            sol_usdc(),
            Arc::new(scripted_prices(vec![100.0, 101.0, 99.0, 100.0, 70.0])),
            Arc::new(executor),
            store_in(&dir),
        )
        .unwrap();
        for _ in 0..4 {
            orch.tick().await.unwrap();
        }

        let TradeDispatch::Dispatched(handle) = orch.tick().await.unwrap().dispatch else {
            panic!("expected a dispatched trade");
        };
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_busy_guard_skips_trade() {
        let dir = TempDir::new().unwrap();
        let mut executor = MockSwapExecutor::new();
        executor.expect_execute_trade().times(0);

        let orch = orchestrator(
            scripted_prices(vec![100.0, 101.0, 99.0, 100.0, 130.0]),
            executor,
            &dir,
        );
        for _ in 0..4 {
            orch.tick().await.unwrap();
        }

        let held = orch.guard().try_acquire().unwrap();
        let report = orch.tick().await.unwrap();
        assert_eq!(report.signal, Signal::Sell);
        assert!(matches!(report.dispatch, TradeDispatch::Busy));
        assert_eq!(orch.status().await.trade_state, GuardState::Executing);

        held.release();
        assert_eq!(orch.status().await.trade_state, GuardState::Idle);
    }

    #[tokio::test]
    async fn test_failed_trade_releases_guard() {
        let dir = TempDir::new().unwrap();
        let mut executor = MockSwapExecutor::new();
        executor
            .expect_execute_trade()
            .times(1)
            .returning(|_| Err(SwapError::TransactionFailed("blockhash expired".to_string())));

        let orch = orchestrator(
            scripted_prices(vec![100.0, 101.0, 99.0, 100.0, 130.0]),
            executor,
            &dir,
        );
        for _ in 0..4 {
            orch.tick().await.unwrap();
        }

        let report = orch.tick().await.unwrap();
        let TradeDispatch::Dispatched(handle) = report.dispatch else {
            panic!("expected a dispatched trade");
        };
        assert!(matches!(handle.await.unwrap(), Err(SwapError::TransactionFailed(_))));
        assert!(!orch.guard().is_executing());
        assert!(orch.guard().try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_quote_error_leaves_history_untouched() {
        let dir = TempDir::new().unwrap();
        let mut prices = MockPriceSource::new();
        prices
            .expect_current_price()
            .returning(|_| Err(QuoteError::RateLimited));

        let orch = orchestrator(prices, MockSwapExecutor::new(), &dir);
        let result = orch.tick().await;

        assert!(matches!(result, Err(OrchestratorError::MarketData(QuoteError::RateLimited))));
        assert_eq!(orch.status().await.samples, 0);
    }

    #[tokio::test]
    async fn test_non_positive_price_rejected() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(scripted_prices(vec![0.0]), MockSwapExecutor::new(), &dir);

        let result = orch.tick().await;
        assert!(matches!(result, Err(OrchestratorError::InvalidSample(_))));
        assert_eq!(orch.status().await.samples, 0);
    }

    #[tokio::test]
    async fn test_ticks_persist_history() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(
            scripted_prices(vec![100.0, 101.0]),
            MockSwapExecutor::new(),
            &dir,
        );
        orch.tick().await.unwrap();
        orch.tick().await.unwrap();

        let mut reloaded = store_in(&dir);
        let status = reloaded.restore();
        assert_eq!(status, RestoreStatus::Restored { instruments: 1, samples: 2 });
        assert_eq!(reloaded.window(SOL, 10).last().map(|s| s.price), Some(101.0));
    }

    /// Snapshot writer whose disk is always full
    struct FullDisk;

    impl SnapshotStore for FullDisk {
        fn load(&self) -> Result<Option<Snapshot>, PersistError> {
            Ok(None)
        }

        fn save(&self, _snapshot: &Snapshot) -> Result<(), PersistError> {
            Err(PersistError::WriteError("disk full".to_string()))
        }
    }

    #[tokio::test]
    async fn test_save_failure_does_not_fail_tick() {
        let orch = TradingOrchestrator::new(
            small_config(),
            sol_usdc(),
            Arc::new(scripted_prices(vec![100.0, 101.0])),
            Arc::new(MockSwapExecutor::new()),
            PriceStore::new(Box::new(FullDisk), 100),
        )
        .unwrap();

        orch.tick().await.unwrap();
        let report = orch.tick().await.unwrap();

        assert_eq!(report.signal, Signal::Hold);
        assert_eq!(orch.status().await.samples, 2);
    }

    #[tokio::test]
    async fn test_future_dated_history_keeps_growing() {
        let dir = TempDir::new().unwrap();
        let ahead = Utc::now() + chrono::Duration::days(1);
        {
            let mut seeded = store_in(&dir);
            seeded
                .append(PriceSample::new(ahead, 100.0, SOL, "SOL").unwrap())
                .unwrap();
        }

        let mut store = store_in(&dir);
        assert!(store.restore().is_restored());
        let orch = TradingOrchestrator::new(
            small_config(),
            sol_usdc(),
            Arc::new(scripted_prices(vec![101.0, 102.0, 103.0])),
            Arc::new(MockSwapExecutor::new()),
            store,
        )
        .unwrap();

        for _ in 0..3 {
            orch.tick().await.unwrap();
        }

        let store = orch.store();
        let store = store.read().await;
        let window = store.window(SOL, 10);
        assert_eq!(window.len(), 4);
        let ahead_ms = ahead.timestamp_millis();
        assert!(window.iter().all(|s| s.timestamp.timestamp_millis() >= ahead_ms));
        assert!(window.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_start_resolves_decimals_and_restores() {
        let dir = TempDir::new().unwrap();
        let mut tokens = MockTokenInfoSource::new();
        tokens
            .expect_decimals()
            .returning(|mint| Ok(if mint == SOL { 9 } else { 6 }));

        let (orch, restore) = TradingOrchestrator::start(
            small_config(),
            &tokens,
            SOL,
            USDC,
            "SOL",
            Arc::new(MockPriceSource::new()),
            Arc::new(MockSwapExecutor::new()),
            store_in(&dir),
        )
        .await
        .unwrap();

        assert_eq!(restore, RestoreStatus::Fresh);
        assert_eq!(orch.pair().base.decimals, 9);
        assert_eq!(orch.pair().quote.decimals, 6);
    }

    #[tokio::test]
    async fn test_start_fails_on_decimals_error() {
        let dir = TempDir::new().unwrap();
        let mut tokens = MockTokenInfoSource::new();
        tokens
            .expect_decimals()
            .returning(|mint| Err(QuoteError::TokenNotFound(mint.to_string())));

        let result = TradingOrchestrator::start(
            small_config(),
            &tokens,
            SOL,
            USDC,
            "SOL",
            Arc::new(MockPriceSource::new()),
            Arc::new(MockSwapExecutor::new()),
            store_in(&dir),
        )
        .await;

        assert!(matches!(result, Err(StartupError::DecimalsLookup { .. })));
    }

    /// Log sink shared with the test body
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_startup_failure_is_logged() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let dir = TempDir::new().unwrap();
        let mut tokens = MockTokenInfoSource::new();
        tokens
            .expect_decimals()
            .returning(|_| Err(QuoteError::RateLimited));

        let result = TradingOrchestrator::start(
            small_config(),
            &tokens,
            SOL,
            USDC,
            "SOL",
            Arc::new(MockPriceSource::new()),
            Arc::new(MockSwapExecutor::new()),
            store_in(&dir),
        )
        .await;
        assert!(result.is_err());

        let output = logs.contents();
        let line = output
            .lines()
            .find(|l| l.contains("Startup failed"))
            .expect("startup failure should be logged");
        assert!(line.contains("ERROR"));
        assert!(line.contains("category"));
        assert!(line.contains("Error"));
        assert!(line.contains(SOL));
    }

    #[tokio::test]
    async fn test_invalid_params_logged_at_startup() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let dir = TempDir::new().unwrap();
        let result = TradingOrchestrator::start(
            small_config().with_threshold(0.0),
            &MockTokenInfoSource::new(),
            SOL,
            USDC,
            "SOL",
            Arc::new(MockPriceSource::new()),
            Arc::new(MockSwapExecutor::new()),
            store_in(&dir),
        )
        .await;

        assert!(matches!(result, Err(StartupError::InvalidParams(_))));
        assert!(logs.contents().contains("Startup failed: Invalid strategy parameters"));
    }

    #[tokio::test]
    async fn test_stop_graceful() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(MockPriceSource::new(), MockSwapExecutor::new(), &dir);

        orch.stop().await;
        assert!(!orch.status().await.is_running);
    }

    #[tokio::test]
    async fn test_run_until_stopped() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(
            scripted_prices(vec![100.0, 100.5, 101.0]),
            MockSwapExecutor::new(),
            &dir,
        )
        .with_poll_interval(Duration::from_millis(5));

        let runner = orch.clone();
        let task = tokio::spawn(async move { runner.run().await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        orch.stop().await;
        task.await.unwrap();

        // Script exhaustion errors are logged, not fatal
        assert_eq!(orch.status().await.samples, 3);
    }
}
