pub mod orchestrator;

pub use orchestrator::{
    resolve_pair, OrchestratorError, OrchestratorStatus, StartupError, TickReport, TradeDispatch,
    TradingOrchestrator, DEFAULT_POLL_INTERVAL,
};
