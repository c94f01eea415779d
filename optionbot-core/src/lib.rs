//! OptionBot Core: domain types, daily P&L aggregation, iron condor analytics.
//!
//! This crate is pure computation with no I/O:
//! - Domain types (option legs, trades, strategies, backtest requests/results)
//! - Daily and cumulative P&L aggregation over a trade list
//! - Iron condor leg roles, strike validation and risk profile
//! - Display formatting for statistics, chart points and trade rows

pub mod condor;
pub mod domain;
pub mod pnl;
pub mod present;

pub use pnl::{aggregate_daily_pnl, DailyPnlPoint};
