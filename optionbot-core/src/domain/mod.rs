//! Domain types for OptionBot

pub mod backtest;
pub mod option;
pub mod strategy;
pub mod trade;

pub use backtest::{BacktestRequest, BacktestResult, RequestError, SCHEMA_VERSION};
pub use option::{OptionContract, OptionType, CONTRACT_MULTIPLIER};
pub use strategy::{
    ExpirationBucket, IronCondorLegs, NewStrategy, Strategy, StrategyError, StrategyKind,
    StrategyPatch,
};
pub use trade::{validate_trades, Trade, TradeAction, TradeError};
