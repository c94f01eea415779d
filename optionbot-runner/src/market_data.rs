//! Historical option-chain snapshot.
//!
//! The snapshot is a JSON array of [`MarketDay`] records read from disk.
//! Fetching chains from a provider is out of scope; whatever produced the
//! file is responsible for its contents.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use optionbot_core::domain::OptionType;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("failed to read market data {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse market data {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One option quote from a day's chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainQuote {
    pub strike: f64,
    pub expiration: NaiveDate,
    pub option_type: OptionType,
    /// Mid price per share.
    pub mid: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
}

/// The option chain of one symbol on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDay {
    pub symbol: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underlying_price: Option<f64>,
    #[serde(default)]
    pub options: Vec<ChainQuote>,
}

/// Loaded snapshot.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    days: Vec<MarketDay>,
}

impl MarketData {
    pub fn new(days: Vec<MarketDay>) -> Self {
        Self { days }
    }

    /// Read a JSON snapshot file.
    pub fn load(path: &Path) -> Result<Self, MarketDataError> {
        let content = std::fs::read_to_string(path).map_err(|source| MarketDataError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let days: Vec<MarketDay> =
            serde_json::from_str(&content).map_err(|source| MarketDataError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), days = days.len(), "market data loaded");
        Ok(Self { days })
    }

    pub fn days(&self) -> &[MarketDay] {
        &self.days
    }

    /// Days for `symbol` (case-insensitive) within `[start, end]`, sorted by date.
    pub fn window(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<MarketDay> {
        window(&self.days, symbol, start, end)
    }
}

/// Days for `symbol` (case-insensitive) within `[start, end]`, sorted by date.
pub fn window(days: &[MarketDay], symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<MarketDay> {
    let mut selected: Vec<MarketDay> = days
        .iter()
        .filter(|d| d.symbol.eq_ignore_ascii_case(symbol) && d.date >= start && d.date <= end)
        .cloned()
        .collect();
    selected.sort_by_key(|d| d.date);
    selected
}
