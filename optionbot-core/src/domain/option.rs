//! Option contract legs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shares per listed equity option contract.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

/// One option contract leg as traded in a backtest.
///
/// Immutable once built; owned by the [`Trade`](super::Trade) that carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    pub symbol: String,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub option_type: OptionType,
    /// Per-share premium at the time the leg was opened.
    pub premium: f64,
    /// Number of contracts (>= 1).
    pub quantity: u32,
}

impl OptionContract {
    /// Dollar value of `price` across all contracts of this leg.
    pub fn notional(&self, price: f64) -> f64 {
        price * self.quantity as f64 * CONTRACT_MULTIPLIER
    }

    /// True when this leg is the listed contract identified by strike, expiry and type.
    pub fn same_contract(&self, strike: f64, expiration: NaiveDate, option_type: OptionType) -> bool {
        self.option_type == option_type
            && self.expiration == expiration
            && (self.strike - strike).abs() < 1e-9
    }
}
