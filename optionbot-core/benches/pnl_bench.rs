//! Criterion benchmarks for the daily P&L aggregator.
//!
//! Trade lists sized like a single condor run up to multi-year daily rolls.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::NaiveDate;
use optionbot_core::aggregate_daily_pnl;
use optionbot_core::domain::{OptionContract, OptionType, Trade, TradeAction};

fn make_trades(n: usize) -> Vec<Trade> {
    let base_date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            // Eight legs per day: four opens and four closes.
            let date = base_date + chrono::Duration::days((i / 8) as i64);
            let pnl = (i as f64 * 0.7).sin() * 150.0;
            Trade {
                date,
                action: if i % 2 == 0 { TradeAction::Sell } else { TradeAction::Buy },
                option: OptionContract {
                    symbol: "SPY".into(),
                    strike: 450.0 + (i % 4) as f64 * 5.0,
                    expiration: date,
                    option_type: if i % 4 < 2 { OptionType::Put } else { OptionType::Call },
                    premium: 1.0,
                    quantity: 1,
                },
                price: 1.0,
                pnl,
            }
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_daily_pnl");
    for n in [8, 2_016, 20_160] {
        let trades = make_trades(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &trades, |b, trades| {
            b.iter(|| aggregate_daily_pnl(black_box(trades)))
        });
    }
    group.finish();
}

fn bench_shuffled_input(c: &mut Criterion) {
    let mut trades = make_trades(2_016);
    trades.reverse();
    c.bench_function("aggregate_daily_pnl/reversed_2016", |b| {
        b.iter(|| aggregate_daily_pnl(black_box(&trades)))
    });
}

criterion_group!(benches, bench_aggregate, bench_shuffled_input);
criterion_main!(benches);
