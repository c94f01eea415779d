//! Iron condor backtest: open on the first day of the window, close at
//! expiration or at the end of the window, whichever comes first.
//!
//! Strikes are picked from the entry-day chain by nearest delta. Exit prices
//! come from the chain on the exit day, falling back to the latest earlier
//! quote, then to [`EXPIRED_PRICE`].

use chrono::{Duration, NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use optionbot_core::condor::{CondorLeg, CondorPosition, ResolvedLeg};
use optionbot_core::domain::{
    BacktestRequest, BacktestResult, ExpirationBucket, OptionContract, RequestError, Strategy,
    Trade, TradeAction, SCHEMA_VERSION,
};
use optionbot_core::pnl::{aggregate_daily_pnl, equity_curve, total_pnl};

use crate::market_data::{self, ChainQuote, MarketDay};
use crate::metrics;

/// Exit price used when a leg has no quote on or before the exit day.
pub const EXPIRED_PRICE: f64 = 0.05;

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("invalid backtest request: {0}")]
    InvalidRequest(#[from] RequestError),
    #[error("no market data for {symbol} between {start} and {end}")]
    NoMarketData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("no {leg} quote expiring {expiration} on {date}")]
    MissingQuote {
        leg: CondorLeg,
        date: NaiveDate,
        expiration: NaiveDate,
    },
}

/// Run one iron condor backtest over `days`.
///
/// `days` may hold any symbols and dates; only the strategy's symbol within
/// the request window is used.
pub fn run_backtest(
    strategy: &Strategy,
    request: &BacktestRequest,
    days: &[MarketDay],
) -> Result<BacktestResult, BacktestError> {
    request.validate()?;

    let window = market_data::window(days, &strategy.symbol, request.start_date, request.end_date);
    let entry_day = window.first().ok_or_else(|| BacktestError::NoMarketData {
        symbol: strategy.symbol.clone(),
        start: request.start_date,
        end: request.end_date,
    })?;

    let expiration = expiration_date(strategy.expiration, entry_day.date, &window);
    let exit_date = request.end_date.min(expiration);
    debug!(
        strategy = %strategy.id,
        entry = %entry_day.date,
        %expiration,
        exit = %exit_date,
        days = window.len(),
        "backtest window resolved"
    );

    // ── Entry ──
    let mut resolved = Vec::with_capacity(CondorLeg::ALL.len());
    let mut trades = Vec::with_capacity(CondorLeg::ALL.len() * 2);
    for leg in CondorLeg::ALL {
        let Some(target) = leg.target_delta(&strategy.legs) else {
            debug!(%leg, "leg not configured, skipping");
            continue;
        };
        let quote = nearest_delta_quote(entry_day, leg, expiration, target).ok_or(
            BacktestError::MissingQuote {
                leg,
                date: entry_day.date,
                expiration,
            },
        )?;
        let option = OptionContract {
            symbol: strategy.symbol.clone(),
            strike: quote.strike,
            expiration,
            option_type: leg.option_type(),
            premium: quote.mid,
            quantity: strategy.quantity,
        };
        resolved.push(ResolvedLeg {
            leg,
            strike: quote.strike,
            premium: quote.mid,
        });
        trades.push(leg_trade(entry_day.date, leg.opening_action(), option, quote.mid));
    }

    // ── Exit ──
    let exits: Vec<Trade> = trades
        .iter()
        .map(|entry| {
            let price = exit_price(&window, &entry.option, exit_date);
            leg_trade(exit_date, entry.action.reverse(), entry.option.clone(), price)
        })
        .collect();
    trades.extend(exits);

    // ── Metrics ──
    let initial = request.initial_capital;
    let final_capital = initial + total_pnl(&trades);
    let curve = equity_curve(initial, &aggregate_daily_pnl(&trades));

    let position = CondorPosition::new(resolved, strategy.quantity);
    let profile = match position.validate_strikes() {
        Ok(()) => position.profile(),
        Err(e) => {
            if position.is_complete() {
                warn!(strategy = %strategy.id, error = %e, "condor strikes out of order");
            }
            None
        }
    };

    let result = BacktestResult {
        schema_version: SCHEMA_VERSION,
        strategy_id: strategy.id.clone(),
        backtest_id: Uuid::new_v4().to_string(),
        start_date: request.start_date,
        end_date: request.end_date,
        initial_capital: initial,
        final_capital,
        total_return: metrics::total_return_pct(initial, final_capital),
        max_drawdown: metrics::max_drawdown_pct(&curve),
        sharpe_ratio: metrics::sharpe_ratio(&curve),
        trades,
        created_at: Utc::now(),
        profile,
    };

    info!(
        strategy = %strategy.id,
        backtest_id = %result.backtest_id,
        trades = result.trades.len(),
        net_pnl = result.net_pnl(),
        "backtest complete"
    );
    Ok(result)
}

/// Expiration date of the legs for a bucket.
///
/// `Next Day` is the next trading day present in `window`, or the next
/// calendar day when the window ends on the entry day.
fn expiration_date(bucket: ExpirationBucket, entry: NaiveDate, window: &[MarketDay]) -> NaiveDate {
    match bucket {
        ExpirationBucket::ZeroDte => entry,
        ExpirationBucket::NextDay => window
            .iter()
            .map(|d| d.date)
            .find(|&d| d > entry)
            .unwrap_or(entry + Duration::days(1)),
    }
}

/// Entry-day quote for `leg` whose delta is nearest `target`.
fn nearest_delta_quote(
    day: &MarketDay,
    leg: CondorLeg,
    expiration: NaiveDate,
    target: f64,
) -> Option<ChainQuote> {
    day.options
        .iter()
        .filter(|q| q.option_type == leg.option_type() && q.expiration == expiration)
        .filter_map(|q| q.delta.map(|delta| (q, (delta - target).abs())))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(q, _)| *q)
}

/// Closing price for `option`: exit-day quote, else the latest earlier quote.
fn exit_price(window: &[MarketDay], option: &OptionContract, exit_date: NaiveDate) -> f64 {
    window
        .iter()
        .rev()
        .filter(|d| d.date <= exit_date)
        .find_map(|d| {
            d.options
                .iter()
                .find(|q| option.same_contract(q.strike, q.expiration, q.option_type))
        })
        .map(|q| q.mid)
        .unwrap_or_else(|| {
            debug!(strike = option.strike, option_type = %option.option_type, "no exit quote, using expired price");
            EXPIRED_PRICE
        })
}

/// A leg action with cash-flow sign: selling receives premium, buying pays it.
fn leg_trade(date: NaiveDate, action: TradeAction, option: OptionContract, price: f64) -> Trade {
    let cash = option.notional(price);
    let pnl = match action {
        TradeAction::Sell => cash,
        TradeAction::Buy => -cash,
    };
    Trade {
        date,
        action,
        option,
        price,
        pnl,
    }
}
