//! Trade: one executed leg action produced by a backtest.

use super::option::OptionContract;
use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    /// The action that closes a position opened with `self`.
    pub fn reverse(self) -> Self {
        match self {
            TradeAction::Buy => TradeAction::Sell,
            TradeAction::Sell => TradeAction::Buy,
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "buy"),
            TradeAction::Sell => write!(f, "sell"),
        }
    }
}

/// A single executed leg action.
///
/// `pnl` is the realized cash flow of this action and belongs to `date` only;
/// nothing downstream depends on intra-day ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Grouping key for daily P&L. Only zero-padded `YYYY-MM-DD` is accepted.
    #[serde(deserialize_with = "deserialize_iso_date")]
    pub date: NaiveDate,
    pub action: TradeAction,
    pub option: OptionContract,
    /// Per-share execution price.
    pub price: f64,
    /// Signed realized profit and loss in dollars.
    pub pnl: f64,
}

/// A trade record that breaks the data contract.
#[derive(Debug, Error, PartialEq)]
pub enum TradeError {
    #[error("trade on {date}: pnl is not a finite number")]
    NonFinitePnl { date: NaiveDate },
    #[error("trade on {date}: price {price} is negative or not finite")]
    InvalidPrice { date: NaiveDate, price: f64 },
    #[error("trade on {date}: option quantity must be at least 1")]
    ZeroQuantity { date: NaiveDate },
}

/// Parse a `YYYY-MM-DD` date, rejecting any spelling that would not
/// serialize back to the same string (`2024-1-2`, `+2024-01-02`).
fn deserialize_iso_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(de::Error::custom)?;
    if date.format("%Y-%m-%d").to_string() != raw {
        return Err(de::Error::custom(format!(
            "trade date '{raw}' is not a zero-padded YYYY-MM-DD date"
        )));
    }
    Ok(date)
}

impl Trade {
    /// Check the fields the aggregator and presenter rely on.
    pub fn validate(&self) -> Result<(), TradeError> {
        if !self.pnl.is_finite() {
            return Err(TradeError::NonFinitePnl { date: self.date });
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(TradeError::InvalidPrice {
                date: self.date,
                price: self.price,
            });
        }
        if self.option.quantity == 0 {
            return Err(TradeError::ZeroQuantity { date: self.date });
        }
        Ok(())
    }
}

/// Validate every trade, stopping at the first violation.
pub fn validate_trades(trades: &[Trade]) -> Result<(), TradeError> {
    trades.iter().try_for_each(Trade::validate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::option::OptionType;

    fn sample_trade() -> Trade {
        Trade {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            action: TradeAction::Sell,
            option: OptionContract {
                symbol: "SPY".into(),
                strike: 480.0,
                expiration: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                option_type: OptionType::Call,
                premium: 1.1,
                quantity: 1,
            },
            price: 1.1,
            pnl: 110.0,
        }
    }

    #[test]
    fn reverse_action() {
        assert_eq!(TradeAction::Buy.reverse(), TradeAction::Sell);
        assert_eq!(TradeAction::Sell.reverse(), TradeAction::Buy);
    }

    #[test]
    fn validate_accepts_well_formed_trade() {
        assert_eq!(sample_trade().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_nan_pnl() {
        let mut t = sample_trade();
        t.pnl = f64::NAN;
        assert!(matches!(t.validate(), Err(TradeError::NonFinitePnl { .. })));
    }

    #[test]
    fn validate_rejects_negative_price() {
        let mut t = sample_trade();
        t.price = -0.5;
        assert!(matches!(t.validate(), Err(TradeError::InvalidPrice { .. })));
    }

    #[test]
    fn validate_trades_reports_first_failure() {
        let mut bad = sample_trade();
        bad.option.quantity = 0;
        let trades = vec![sample_trade(), bad];
        assert!(matches!(
            validate_trades(&trades),
            Err(TradeError::ZeroQuantity { .. })
        ));
    }

    #[test]
    fn deserializes_camel_case_wire_format() {
        let json = r#"{
            "date": "2024-01-05",
            "action": "buy",
            "option": {
                "symbol": "SPY", "strike": 465.0, "expiration": "2024-01-05",
                "optionType": "put", "premium": 0.5, "quantity": 1
            },
            "price": 0.5,
            "pnl": -50.0
        }"#;
        let trade: Trade = serde_json::from_str(json).unwrap();
        assert_eq!(trade.action, TradeAction::Buy);
        assert_eq!(trade.option.option_type, OptionType::Put);
        assert_eq!(trade.pnl, -50.0);
    }

    #[test]
    fn missing_date_is_rejected_at_the_boundary() {
        let json = r#"{"action": "buy", "option": {"symbol": "SPY", "strike": 1.0,
            "expiration": "2024-01-05", "optionType": "put", "premium": 0.5, "quantity": 1},
            "price": 0.5, "pnl": -50.0}"#;
        assert!(serde_json::from_str::<Trade>(json).is_err());
    }

    fn trade_json(date: &str) -> String {
        format!(
            r#"{{"date": "{date}", "action": "sell", "option": {{"symbol": "SPY",
                "strike": 480.0, "expiration": "2024-01-02", "optionType": "call",
                "premium": 1.0, "quantity": 1}}, "price": 1.0, "pnl": 100.0}}"#
        )
    }

    #[test]
    fn non_padded_date_is_rejected() {
        for date in ["2024-1-2", "2024-01-2", "2024-1-02"] {
            let err = serde_json::from_str::<Trade>(&trade_json(date)).unwrap_err();
            assert!(err.to_string().contains(date), "{err}");
        }
    }

    #[test]
    fn non_date_strings_are_rejected() {
        for date in ["", "2024/01/02", "2024-01-02T00:00:00", "2024-02-30"] {
            assert!(serde_json::from_str::<Trade>(&trade_json(date)).is_err(), "{date}");
        }
    }

    #[test]
    fn padded_date_round_trips_unchanged() {
        let trade: Trade = serde_json::from_str(&trade_json("2024-01-02")).unwrap();
        assert_eq!(trade.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        let json = serde_json::to_value(&trade).unwrap();
        assert_eq!(json["date"], "2024-01-02");
    }
}
