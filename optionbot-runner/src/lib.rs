//! OptionBot Runner: persistence, backtest simulation, export, service wiring.
//!
//! This crate builds on `optionbot-core` to provide:
//! - TOML configuration and `tracing` subscriber setup
//! - File-backed strategy store with atomic writes
//! - Option-chain snapshot loading and windowing
//! - Iron condor backtest with equity-curve metrics
//! - JSONL backtest history
//! - JSON/CSV artifact export
//! - `OptionBotService`, the composition root used by front ends

pub mod backtest;
pub mod config;
pub mod export;
pub mod history;
pub mod logging;
pub mod market_data;
pub mod metrics;
pub mod service;
pub mod store;

pub use backtest::{run_backtest, BacktestError, EXPIRED_PRICE};
pub use config::{AppConfig, ConfigError, LoggingConfig};
pub use history::BacktestHistory;
pub use logging::{init_logging, LogConfig, LogFormat};
pub use market_data::{ChainQuote, MarketData, MarketDataError, MarketDay};
pub use service::{OptionBotService, ServiceError};
pub use store::{StoreError, StrategyStore};
