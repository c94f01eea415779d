//! OptionBot CLI: strategy management, backtests and P&L aggregation.
//!
//! Commands:
//! - `strategy list|show|create|update|delete`: manage stored strategies
//! - `backtest run`: simulate a strategy over the option-chain snapshot
//! - `backtest show|list|export`: inspect recorded backtests
//! - `pnl`: aggregate any JSON trade list into a daily P&L series

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use optionbot_core::domain::{
    validate_trades, BacktestRequest, BacktestResult, ExpirationBucket, IronCondorLegs,
    NewStrategy, Strategy, StrategyKind, StrategyPatch, Trade,
};
use optionbot_core::pnl::{aggregate_daily_pnl, total_pnl};
use optionbot_core::present::{
    format_money, point_detail, summary_statistics, trade_row, Tone,
};
use optionbot_runner::export::{export_daily_pnl_csv, save_artifacts};
use optionbot_runner::{init_logging, AppConfig, LogConfig, LogFormat, OptionBotService};

#[derive(Parser)]
#[command(
    name = "optionbot",
    version,
    about = "OptionBot CLI: iron condor backtesting and P&L reporting"
)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when the file is absent.
    #[arg(long, global = true, default_value = "optionbot.toml")]
    config: PathBuf,

    /// Log output format: pretty, json or compact. Overrides the config file.
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Log filter, e.g. `debug` or `optionbot_runner=trace`. `RUST_LOG` wins over both.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stored strategies.
    Strategy {
        #[command(subcommand)]
        action: StrategyAction,
    },
    /// Run and inspect backtests.
    Backtest {
        #[command(subcommand)]
        action: BacktestAction,
    },
    /// Aggregate a JSON trade list into daily and cumulative P&L.
    Pnl {
        /// JSON file holding an array of trades.
        trades: PathBuf,

        /// Also write the series as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum StrategyAction {
    /// List all strategies.
    List,
    /// Show one strategy.
    Show { id: String },
    /// Create a strategy.
    Create {
        /// Underlying symbol (e.g., SPY).
        #[arg(long)]
        symbol: String,

        /// Strategy kind.
        #[arg(long, default_value = "Iron Condor")]
        kind: StrategyKind,

        /// Expiration bucket: 0DTE or "Next Day".
        #[arg(long)]
        expiration: ExpirationBucket,

        #[command(flatten)]
        legs: LegArgs,

        /// Contracts per leg.
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Update fields of a strategy. Unset flags keep their current value.
    Update {
        id: String,

        #[arg(long)]
        symbol: Option<String>,

        #[arg(long)]
        kind: Option<StrategyKind>,

        #[arg(long)]
        expiration: Option<ExpirationBucket>,

        #[command(flatten)]
        legs: LegArgs,

        #[arg(long)]
        quantity: Option<u32>,
    },
    /// Delete a strategy.
    Delete { id: String },
}

/// Target deltas. Puts in [-1, 0], calls in [0, 1].
#[derive(Args)]
struct LegArgs {
    #[arg(long, allow_negative_numbers = true)]
    long_put: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    short_put: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    short_call: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    long_call: Option<f64>,
}

impl LegArgs {
    fn is_empty(&self) -> bool {
        self.long_put.is_none()
            && self.short_put.is_none()
            && self.short_call.is_none()
            && self.long_call.is_none()
    }

    /// Overlay the given flags onto `base`.
    fn overlay(&self, base: IronCondorLegs) -> IronCondorLegs {
        IronCondorLegs {
            long_put: self.long_put.or(base.long_put),
            short_put: self.short_put.or(base.short_put),
            short_call: self.short_call.or(base.short_call),
            long_call: self.long_call.or(base.long_call),
        }
    }
}

#[derive(Subcommand)]
enum BacktestAction {
    /// Simulate a strategy and record the result.
    Run {
        strategy_id: String,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: NaiveDate,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: NaiveDate,

        /// Initial capital. Defaults to the configured value.
        #[arg(long)]
        capital: Option<f64>,

        /// Print the result as JSON instead of a report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show a recorded backtest: summary, daily P&L and trades.
    Show { backtest_id: String },
    /// List recorded backtests of a strategy.
    List { strategy_id: String },
    /// Write result.json, trades.csv and daily_pnl.csv for a backtest.
    Export {
        backtest_id: String,

        /// Output directory.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;

    let mut log_config = LogConfig::from_config(&config.logging);
    if let Some(format) = cli.log_format {
        log_config = log_config.with_format(format);
    }
    if let Some(level) = cli.log_level {
        log_config.level = level;
    }
    init_logging(&log_config)?;

    let service = OptionBotService::new(&config);

    match cli.command {
        Commands::Strategy { action } => run_strategy_cmd(&service, action),
        Commands::Backtest { action } => run_backtest_cmd(&service, action),
        Commands::Pnl { trades, csv } => run_pnl_cmd(&trades, csv.as_deref()),
    }
}

// ─── strategy ───────────────────────────────────────────────────────

fn run_strategy_cmd(service: &OptionBotService, action: StrategyAction) -> Result<()> {
    match action {
        StrategyAction::List => {
            let strategies = service.list_strategies()?;
            if strategies.is_empty() {
                println!("No strategies.");
                return Ok(());
            }
            println!("{:<36}  {:<32}  {:>3}  {}", "ID", "Name", "Qty", "Created");
            println!("{}", "-".repeat(96));
            for s in &strategies {
                println!(
                    "{:<36}  {:<32}  {:>3}  {}",
                    s.id,
                    s.name,
                    s.quantity,
                    s.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        StrategyAction::Show { id } => print_strategy(&service.get_strategy(&id)?),
        StrategyAction::Create {
            symbol,
            kind,
            expiration,
            legs,
            quantity,
        } => {
            let new = NewStrategy {
                symbol,
                strategy: kind,
                expiration,
                legs: legs.overlay(IronCondorLegs::default()),
                quantity,
            };
            let created = service.create_strategy(new)?;
            println!("Created strategy {}", created.id);
            print_strategy(&created);
        }
        StrategyAction::Update {
            id,
            symbol,
            kind,
            expiration,
            legs,
            quantity,
        } => {
            let legs = if legs.is_empty() {
                None
            } else {
                Some(legs.overlay(service.get_strategy(&id)?.legs))
            };
            let patch = StrategyPatch {
                symbol,
                strategy: kind,
                expiration,
                legs,
                quantity,
            };
            if patch.is_empty() {
                bail!("nothing to update: pass at least one field flag");
            }
            let updated = service.update_strategy(&id, &patch)?;
            println!("Updated strategy {}", updated.id);
            print_strategy(&updated);
        }
        StrategyAction::Delete { id } => {
            service.delete_strategy(&id)?;
            println!("Deleted strategy {id}");
        }
    }
    Ok(())
}

fn print_strategy(s: &Strategy) {
    let delta = |d: Option<f64>| d.map_or_else(|| "-".to_string(), |d| format!("{d:.2}"));
    println!("{}", s.name);
    println!("  id:         {}", s.id);
    println!("  symbol:     {}", s.symbol);
    println!("  expiration: {}", s.expiration);
    println!("  quantity:   {}", s.quantity);
    println!(
        "  deltas:     long put {}, short put {}, short call {}, long call {}",
        delta(s.legs.long_put),
        delta(s.legs.short_put),
        delta(s.legs.short_call),
        delta(s.legs.long_call)
    );
    println!("  created:    {}", s.created_at.to_rfc3339());
}

// ─── backtest ───────────────────────────────────────────────────────

fn run_backtest_cmd(service: &OptionBotService, action: BacktestAction) -> Result<()> {
    match action {
        BacktestAction::Run {
            strategy_id,
            start,
            end,
            capital,
            json,
        } => {
            let request = BacktestRequest {
                start_date: start,
                end_date: end,
                initial_capital: capital.unwrap_or(service.default_initial_capital()),
            };
            let result = service.run_backtest(&strategy_id, &request)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_report(&result);
            }
        }
        BacktestAction::Show { backtest_id } => print_report(&service.get_backtest(&backtest_id)?),
        BacktestAction::List { strategy_id } => {
            let results = service.list_backtests(&strategy_id)?;
            if results.is_empty() {
                println!("No backtests for strategy {strategy_id}.");
                return Ok(());
            }
            println!(
                "{:<36}  {:<23}  {:>12}  {:>9}",
                "Backtest ID", "Period", "Net P&L", "Return"
            );
            println!("{}", "-".repeat(86));
            for r in &results {
                println!(
                    "{:<36}  {:<23}  {:>12}  {:>8.2}%",
                    r.backtest_id,
                    format!("{} to {}", r.start_date, r.end_date),
                    format_money(r.net_pnl()),
                    r.total_return
                );
            }
        }
        BacktestAction::Export {
            backtest_id,
            output_dir,
        } => {
            let result = service.get_backtest(&backtest_id)?;
            let run_dir = save_artifacts(&result, &output_dir)?;
            println!("Artifacts saved to: {}", run_dir.display());
        }
    }
    Ok(())
}

fn print_report(result: &BacktestResult) {
    println!("Backtest {}", result.backtest_id);
    println!("Strategy: {}", result.strategy_id);
    println!("Period:   {} to {}", result.start_date, result.end_date);
    println!("Initial:  {}", format_money(result.initial_capital));
    println!();

    for stat in summary_statistics(result) {
        println!("  {} {:<14} {:>14}", marker(stat.tone), stat.title, stat.value);
    }

    if let Some(profile) = &result.profile {
        println!();
        println!(
            "  Net credit {} | Max profit {} | Max loss {} | Breakevens {:.2} / {:.2}",
            format_money(profile.net_credit),
            format_money(profile.max_profit),
            format_money(profile.max_loss),
            profile.breakevens[0],
            profile.breakevens[1]
        );
    }

    print_daily_table(&result.trades);
    print_trade_table(&result.trades);
}

fn print_daily_table(trades: &[Trade]) {
    let points = aggregate_daily_pnl(trades);
    println!();
    println!("{:<12} {:>14}   {:>14}", "Date", "Daily P&L", "Cumulative");
    println!("{}", "-".repeat(46));
    for point in &points {
        let d = point_detail(point);
        println!(
            "{:<12} {:>14} {} {:>14} {}",
            d.date,
            d.daily_pnl,
            marker(d.daily_tone),
            d.cumulative_pnl,
            marker(d.cumulative_tone)
        );
    }
}

fn print_trade_table(trades: &[Trade]) {
    println!();
    println!(
        "{:<12} {:<6} {:>12} {:<5} {:>10} {:>12}",
        "Date", "Action", "Strike", "Type", "Price", "P&L"
    );
    println!("{}", "-".repeat(62));
    for trade in trades {
        let row = trade_row(trade);
        println!(
            "{:<12} {:<6} {:>12} {:<5} {:>10} {:>12} {}",
            row.date,
            row.action,
            row.strike,
            row.option_type,
            row.price,
            row.pnl,
            marker(row.pnl_tone)
        );
    }
}

fn marker(tone: Tone) -> char {
    match tone {
        Tone::Positive => '+',
        Tone::Negative => '-',
        Tone::Neutral => ' ',
    }
}

// ─── pnl ────────────────────────────────────────────────────────────

fn run_pnl_cmd(trades_path: &Path, csv_path: Option<&Path>) -> Result<()> {
    let content = std::fs::read_to_string(trades_path)
        .with_context(|| format!("failed to read {}", trades_path.display()))?;
    let trades: Vec<Trade> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse trades from {}", trades_path.display()))?;
    validate_trades(&trades).context("trade list failed validation")?;
    tracing::debug!(trades = trades.len(), "trade list loaded");

    print_daily_table(&trades);
    println!();
    println!("Total P&L: {}", format_money(total_pnl(&trades)));

    if let Some(path) = csv_path {
        let csv = export_daily_pnl_csv(&aggregate_daily_pnl(&trades))?;
        std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Daily P&L written to: {}", path.display());
    }
    Ok(())
}
