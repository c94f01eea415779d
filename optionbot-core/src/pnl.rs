//! Daily P&L aggregation: trade list in, chart series out.
//!
//! Pure functions: no I/O, no shared state, input is never mutated. Only
//! dates with at least one trade appear in the output; calendar gaps are not
//! filled.

use crate::domain::Trade;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One point of the daily / cumulative P&L series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPnlPoint {
    pub date: NaiveDate,
    #[serde(rename = "dailyPnL")]
    pub daily_pnl: f64,
    #[serde(rename = "cumulativePnL")]
    pub cumulative_pnl: f64,
}

/// Group trades by date and compute daily and running P&L.
///
/// Output is strictly ascending by date with one point per distinct trade
/// date. The last point's `cumulative_pnl` equals the sum of every trade's
/// `pnl`; empty input yields an empty series.
pub fn aggregate_daily_pnl(trades: &[Trade]) -> Vec<DailyPnlPoint> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for trade in trades {
        *by_date.entry(trade.date).or_insert(0.0) += trade.pnl;
    }

    let mut running = 0.0;
    by_date
        .into_iter()
        .map(|(date, daily_pnl)| {
            running += daily_pnl;
            DailyPnlPoint {
                date,
                daily_pnl,
                cumulative_pnl: running,
            }
        })
        .collect()
}

/// Sum of `pnl` over all trades.
pub fn total_pnl(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.pnl).sum()
}

/// Capital path: `initial_capital` followed by capital after each day.
pub fn equity_curve(initial_capital: f64, points: &[DailyPnlPoint]) -> Vec<f64> {
    std::iter::once(initial_capital)
        .chain(points.iter().map(|p| initial_capital + p.cumulative_pnl))
        .collect()
}
