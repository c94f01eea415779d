//! Backtest request and result records.

use super::trade::Trade;
use crate::condor::CondorProfile;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current schema version for persisted backtest results.
pub const SCHEMA_VERSION: u32 = 1;

/// Parameters of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("initial capital must be a positive number, got {0}")]
    InvalidCapital(f64),
}

impl BacktestRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.start_date > self.end_date {
            return Err(RequestError::InvertedRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(RequestError::InvalidCapital(self.initial_capital));
        }
        Ok(())
    }
}

/// Outcome of a completed backtest.
///
/// Headline statistics are percentages (`total_return`, `max_drawdown`) or
/// plain ratios (`sharpe_ratio`); `max_drawdown` is zero or negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub strategy_id: String,
    pub backtest_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub trades: Vec<Trade>,
    pub created_at: DateTime<Utc>,
    /// Risk profile of the opened condor; absent when a leg was not traded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<CondorProfile>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    pub fn net_pnl(&self) -> f64 {
        self.final_capital - self.initial_capital
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BacktestRequest {
        BacktestRequest {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            initial_capital: 10_000.0,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert_eq!(request().validate(), Ok(()));
    }

    #[test]
    fn single_day_range_is_valid() {
        let mut r = request();
        r.end_date = r.start_date;
        assert_eq!(r.validate(), Ok(()));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut r = request();
        std::mem::swap(&mut r.start_date, &mut r.end_date);
        assert!(matches!(r.validate(), Err(RequestError::InvertedRange { .. })));
    }

    #[test]
    fn non_positive_capital_is_rejected() {
        let mut r = request();
        r.initial_capital = 0.0;
        assert_eq!(r.validate(), Err(RequestError::InvalidCapital(0.0)));
    }

    #[test]
    fn request_reads_camel_case_field_names() {
        let json = r#"{"startDate":"2024-01-02","endDate":"2024-01-31","initialCapital":10000}"#;
        let r: BacktestRequest = serde_json::from_str(json).unwrap();
        assert_eq!(r, request());
    }

    #[test]
    fn result_without_schema_version_defaults() {
        let json = r#"{
            "strategyId": "s", "backtestId": "b",
            "startDate": "2024-01-02", "endDate": "2024-01-03",
            "initialCapital": 10000.0, "finalCapital": 10100.0,
            "totalReturn": 1.0, "maxDrawdown": 0.0, "sharpeRatio": 0.0,
            "trades": [], "createdAt": "2024-01-03T00:00:00Z"
        }"#;
        let r: BacktestResult = serde_json::from_str(json).unwrap();
        assert_eq!(r.schema_version, SCHEMA_VERSION);
        assert!(r.profile.is_none());
        assert!((r.net_pnl() - 100.0).abs() < 1e-10);
    }
}
