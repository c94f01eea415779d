//! Display formatting for backtest statistics, chart points and trade rows.
//!
//! Stateless mapping from computed values to display strings plus a sign
//! tone. Nothing here derives new numbers.

use crate::domain::{BacktestResult, Trade};
use crate::pnl::DailyPnlPoint;
use serde::Serialize;

/// Sign classification used for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    /// `Positive` for values >= 0, `Negative` otherwise.
    pub fn of(value: f64) -> Self {
        if value >= 0.0 {
            Tone::Positive
        } else {
            Tone::Negative
        }
    }
}

/// One headline statistic tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistic {
    pub title: &'static str,
    pub value: String,
    pub tone: Tone,
}

/// Tooltip detail for one chart point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointDetail {
    pub date: String,
    pub daily_pnl: String,
    pub daily_tone: Tone,
    pub cumulative_pnl: String,
    pub cumulative_tone: Tone,
}

/// One row of the trade table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRow {
    pub date: String,
    pub action: String,
    pub strike: String,
    pub option_type: String,
    pub price: String,
    pub pnl: String,
    pub pnl_tone: Tone,
}

/// Dollar amount: `$1,234.50`, `-$20.00`.
pub fn format_money(value: f64) -> String {
    let (negative, digits) = fixed2(value);
    if negative {
        format!("-${digits}")
    } else {
        format!("${digits}")
    }
}

/// Percentage value already scaled to percent: `12.35%`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", signed_fixed2(value))
}

/// Plain two-decimal ratio: `1.85`.
pub fn format_ratio(value: f64) -> String {
    signed_fixed2(value)
}

/// The four headline tiles of a backtest result.
pub fn summary_statistics(result: &BacktestResult) -> Vec<Statistic> {
    vec![
        Statistic {
            title: "Total Return",
            value: format_percent(result.total_return),
            tone: Tone::of(result.total_return),
        },
        Statistic {
            title: "Final Capital",
            value: format_money(result.final_capital),
            tone: Tone::Neutral,
        },
        Statistic {
            title: "Max Drawdown",
            value: format_percent(result.max_drawdown),
            tone: Tone::Negative,
        },
        Statistic {
            title: "Sharpe Ratio",
            value: format_ratio(result.sharpe_ratio),
            tone: Tone::Neutral,
        },
    ]
}

pub fn point_detail(point: &DailyPnlPoint) -> PointDetail {
    PointDetail {
        date: point.date.to_string(),
        daily_pnl: format_money(point.daily_pnl),
        daily_tone: Tone::of(point.daily_pnl),
        cumulative_pnl: format_money(point.cumulative_pnl),
        cumulative_tone: Tone::of(point.cumulative_pnl),
    }
}

pub fn trade_row(trade: &Trade) -> TradeRow {
    TradeRow {
        date: trade.date.to_string(),
        action: trade.action.to_string().to_uppercase(),
        strike: format_money(trade.option.strike),
        option_type: trade.option.option_type.to_string().to_uppercase(),
        price: format_money(trade.price),
        pnl: format_money(trade.pnl),
        pnl_tone: Tone::of(trade.pnl),
    }
}

fn signed_fixed2(value: f64) -> String {
    let (negative, digits) = fixed2(value);
    if negative {
        format!("-{digits}")
    } else {
        digits
    }
}

/// Round to two decimals and group thousands. Returns the sign separately so
/// values that round to zero never render as `-0.00`.
fn fixed2(value: f64) -> (bool, String) {
    let rounded = format!("{:.2}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && rounded != "0.00";
    (negative, format!("{grouped}.{frac_part}"))
}
