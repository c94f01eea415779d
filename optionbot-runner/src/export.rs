//! Reporting and export: JSON and CSV artifact generation.
//!
//! Provides two export formats for backtest results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade tape and daily P&L series for spreadsheets
//!
//! Persisted results carry a `schema_version` field. Versions newer than this
//! build understands are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use optionbot_core::domain::{BacktestResult, Trade, SCHEMA_VERSION};
use optionbot_core::pnl::{aggregate_daily_pnl, DailyPnlPoint};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a trade list as CSV.
///
/// Columns: date, action, symbol, option_type, strike, expiration, quantity,
/// price, pnl
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "action",
        "symbol",
        "option_type",
        "strike",
        "expiration",
        "quantity",
        "price",
        "pnl",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.date.to_string(),
            &t.action.to_string(),
            &t.option.symbol,
            &t.option.option_type.to_string(),
            &format!("{:.2}", t.option.strike),
            &t.option.expiration.to_string(),
            &t.option.quantity.to_string(),
            &format!("{:.4}", t.price),
            &format!("{:.2}", t.pnl),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the daily P&L series as CSV with date, daily_pnl and cumulative_pnl columns.
pub fn export_daily_pnl_csv(points: &[DailyPnlPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "daily_pnl", "cumulative_pnl"])?;
    for p in points {
        wtr.write_record([
            &p.date.to_string(),
            &format!("{:.2}", p.daily_pnl),
            &format!("{:.2}", p.cumulative_pnl),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates `{backtest_id}/` under `output_dir` containing:
/// - `result.json`: the full `BacktestResult`
/// - `trades.csv`: trade tape
/// - `daily_pnl.csv`: daily and cumulative P&L
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(&result.backtest_id);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(result)?;
    write_artifact(&run_dir.join("result.json"), &json)?;

    let trades_csv = export_trades_csv(&result.trades)?;
    write_artifact(&run_dir.join("trades.csv"), &trades_csv)?;

    let daily_csv = export_daily_pnl_csv(&aggregate_daily_pnl(&result.trades))?;
    write_artifact(&run_dir.join("daily_pnl.csv"), &daily_csv)?;

    Ok(run_dir)
}

/// Load a `BacktestResult` from an artifact directory's result.json.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

fn write_artifact(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use optionbot_core::domain::{OptionContract, OptionType, TradeAction};
    use tempfile::TempDir;

    fn trade(day: u32, action: TradeAction, price: f64, pnl: f64) -> Trade {
        let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        Trade {
            date,
            action,
            option: OptionContract {
                symbol: "SPY".into(),
                strike: 505.0,
                expiration: date,
                option_type: OptionType::Put,
                premium: price,
                quantity: 1,
            },
            price,
            pnl,
        }
    }

    fn sample_result() -> BacktestResult {
        BacktestResult {
            schema_version: SCHEMA_VERSION,
            strategy_id: "s1".into(),
            backtest_id: "b1".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            initial_capital: 10_000.0,
            final_capital: 10_045.0,
            total_return: 0.45,
            max_drawdown: 0.0,
            sharpe_ratio: 0.0,
            trades: vec![
                trade(4, TradeAction::Sell, 0.9, 90.0),
                trade(5, TradeAction::Buy, 0.45, -45.0),
            ],
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 21, 0, 0).unwrap(),
            profile: None,
        }
    }

    #[test]
    fn json_round_trip() {
        let result = sample_result();
        let json = export_json(&result).unwrap();
        assert!(json.contains("\"backtestId\": \"b1\""));
        assert_eq!(import_json(&json).unwrap(), result);
    }

    #[test]
    fn import_rejects_newer_schema() {
        let mut result = sample_result();
        result.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&result).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn import_defaults_missing_schema_version() {
        let mut value = serde_json::to_value(sample_result()).unwrap();
        value.as_object_mut().unwrap().remove("schemaVersion");
        let result = import_json(&value.to_string()).unwrap();
        assert_eq!(result.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn trades_csv_columns() {
        let csv = export_trades_csv(&sample_result().trades).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "date,action,symbol,option_type,strike,expiration,quantity,price,pnl"
        );
        assert_eq!(lines[1], "2024-03-04,sell,SPY,put,505.00,2024-03-04,1,0.9000,90.00");
        assert_eq!(lines[2], "2024-03-05,buy,SPY,put,505.00,2024-03-05,1,0.4500,-45.00");
    }

    #[test]
    fn daily_pnl_csv_columns() {
        let points = aggregate_daily_pnl(&sample_result().trades);
        let csv = export_daily_pnl_csv(&points).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,daily_pnl,cumulative_pnl");
        assert_eq!(lines[1], "2024-03-04,90.00,90.00");
        assert_eq!(lines[2], "2024-03-05,-45.00,45.00");
    }

    #[test]
    fn empty_exports_have_headers_only() {
        assert_eq!(export_trades_csv(&[]).unwrap().lines().count(), 1);
        assert_eq!(export_daily_pnl_csv(&[]).unwrap().lines().count(), 1);
    }

    #[test]
    fn artifacts_written_and_reloaded() {
        let dir = TempDir::new().unwrap();
        let result = sample_result();
        let run_dir = save_artifacts(&result, dir.path()).unwrap();
        assert_eq!(run_dir, dir.path().join("b1"));
        for name in ["result.json", "trades.csv", "daily_pnl.csv"] {
            assert!(run_dir.join(name).exists(), "{name} missing");
        }
        assert_eq!(load_artifacts(&run_dir).unwrap(), result);
    }
}
