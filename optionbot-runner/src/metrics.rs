//! Performance metrics: pure functions over an equity curve.
//!
//! Percent-valued metrics are returned as percentages (`5.0` = 5%), the unit
//! stored on `BacktestResult`.

// ─── Individual metric functions ────────────────────────────────────

/// Total return in percent: (final - initial) / initial * 100.
pub fn total_return_pct(initial_capital: f64, final_capital: f64) -> f64 {
    if initial_capital <= 0.0 {
        return 0.0;
    }
    (final_capital - initial_capital) / initial_capital * 100.0
}

/// Maximum peak-to-trough drawdown in percent, zero or negative.
///
/// Returns 0.0 if equity is constant or monotonically increasing.
pub fn max_drawdown_pct(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd * 100.0
}

/// Annualized Sharpe ratio from daily returns, zero risk-free rate.
///
/// Sharpe = mean(daily returns) / std(daily returns) * sqrt(252).
/// Returns 0.0 if variance is zero or fewer than 2 returns.
pub fn sharpe_ratio(equity_curve: &[f64]) -> f64 {
    let returns = daily_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(&returns);
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * (252.0_f64).sqrt()
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Period-over-period returns of an equity curve.
pub fn daily_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn total_return_basic() {
        assert!((total_return_pct(10_000.0, 10_500.0) - 5.0).abs() < EPS);
        assert!((total_return_pct(10_000.0, 9_000.0) + 10.0).abs() < EPS);
        assert_eq!(total_return_pct(0.0, 100.0), 0.0);
    }

    #[test]
    fn drawdown_peak_to_trough() {
        let curve = [100.0, 120.0, 90.0, 110.0, 130.0];
        assert!((max_drawdown_pct(&curve) + 25.0).abs() < EPS);
    }

    #[test]
    fn drawdown_zero_when_rising() {
        assert_eq!(max_drawdown_pct(&[100.0, 101.0, 102.0]), 0.0);
        assert_eq!(max_drawdown_pct(&[]), 0.0);
        assert_eq!(max_drawdown_pct(&[100.0]), 0.0);
    }

    #[test]
    fn sharpe_undefined_cases() {
        assert_eq!(sharpe_ratio(&[100.0, 110.0]), 0.0);
        assert_eq!(sharpe_ratio(&[100.0, 100.0, 100.0]), 0.0);
    }

    #[test]
    fn sharpe_sign_follows_drift() {
        assert!(sharpe_ratio(&[100.0, 101.0, 103.0, 104.0]) > 0.0);
        assert!(sharpe_ratio(&[100.0, 99.0, 97.0, 96.0]) < 0.0);
    }

    #[test]
    fn sharpe_known_value() {
        // Returns +10% then -10%: mean 0.
        assert!(sharpe_ratio(&[100.0, 110.0, 99.0]).abs() < EPS);
    }

    #[test]
    fn returns_skip_non_positive_base() {
        assert_eq!(daily_returns(&[0.0, 10.0, 20.0]), vec![0.0, 1.0]);
    }

    proptest! {
        #[test]
        fn drawdown_is_bounded(curve in prop::collection::vec(1.0..1e6_f64, 0..50)) {
            let dd = max_drawdown_pct(&curve);
            prop_assert!(dd <= 0.0);
            prop_assert!(dd >= -100.0);
        }
    }
}
