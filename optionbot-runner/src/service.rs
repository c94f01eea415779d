//! `OptionBotService`: the one entry point front ends call.
//!
//! Owns the strategy store, the backtest history and the market-data path.
//! Every operation reads fresh state from disk, so a failed call can simply be
//! retried.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use optionbot_core::domain::{BacktestRequest, BacktestResult, NewStrategy, Strategy, StrategyPatch};

use crate::backtest::{self, BacktestError};
use crate::config::AppConfig;
use crate::history::BacktestHistory;
use crate::market_data::{MarketData, MarketDataError};
use crate::store::{StoreError, StrategyStore};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("strategy not found: {0}")]
    StrategyNotFound(String),
    #[error("backtest not found: {0}")]
    BacktestNotFound(String),
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    MarketData(#[from] MarketDataError),
    #[error(transparent)]
    Backtest(#[from] BacktestError),
    #[error("backtest history I/O failed: {0}")]
    History(#[from] std::io::Error),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ServiceError::StrategyNotFound(id),
            other => ServiceError::Store(other),
        }
    }
}

pub struct OptionBotService {
    store: StrategyStore,
    history: BacktestHistory,
    market_data_path: PathBuf,
    default_initial_capital: f64,
}

impl OptionBotService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StrategyStore::new(config.strategies_path()),
            history: BacktestHistory::new(config.backtests_path()),
            market_data_path: config.market_data_path(),
            default_initial_capital: config.default_initial_capital,
        }
    }

    pub fn default_initial_capital(&self) -> f64 {
        self.default_initial_capital
    }

    // ── Strategies ──

    pub fn list_strategies(&self) -> Result<Vec<Strategy>, ServiceError> {
        Ok(self.store.list()?)
    }

    pub fn get_strategy(&self, id: &str) -> Result<Strategy, ServiceError> {
        self.store
            .get(id)?
            .ok_or_else(|| ServiceError::StrategyNotFound(id.to_string()))
    }

    pub fn create_strategy(&self, new: NewStrategy) -> Result<Strategy, ServiceError> {
        Ok(self.store.create(new)?)
    }

    pub fn update_strategy(&self, id: &str, patch: &StrategyPatch) -> Result<Strategy, ServiceError> {
        Ok(self.store.update(id, patch)?)
    }

    pub fn delete_strategy(&self, id: &str) -> Result<(), ServiceError> {
        Ok(self.store.delete(id)?)
    }

    // ── Backtests ──

    /// Simulate `strategy_id` over the snapshot and record the result.
    ///
    /// Nothing is written unless the simulation succeeds.
    pub fn run_backtest(
        &self,
        strategy_id: &str,
        request: &BacktestRequest,
    ) -> Result<BacktestResult, ServiceError> {
        let strategy = self.get_strategy(strategy_id)?;
        let market_data = MarketData::load(&self.market_data_path)?;
        info!(
            strategy = %strategy.id,
            start = %request.start_date,
            end = %request.end_date,
            "running backtest"
        );
        let result = backtest::run_backtest(&strategy, request, market_data.days())?;
        self.history.append(&result)?;
        Ok(result)
    }

    pub fn get_backtest(&self, backtest_id: &str) -> Result<BacktestResult, ServiceError> {
        self.history
            .find(backtest_id)?
            .ok_or_else(|| ServiceError::BacktestNotFound(backtest_id.to_string()))
    }

    pub fn list_backtests(&self, strategy_id: &str) -> Result<Vec<BacktestResult>, ServiceError> {
        Ok(self.history.for_strategy(strategy_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optionbot_core::domain::{ExpirationBucket, IronCondorLegs, StrategyKind};
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> OptionBotService {
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        OptionBotService::new(&config)
    }

    fn new_strategy() -> NewStrategy {
        NewStrategy {
            symbol: "SPY".into(),
            strategy: StrategyKind::IronCondor,
            expiration: ExpirationBucket::ZeroDte,
            legs: IronCondorLegs::new(-0.05, -0.15, 0.15, 0.05),
            quantity: 1,
        }
    }

    #[test]
    fn store_not_found_maps_to_strategy_not_found() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        assert!(matches!(
            svc.get_strategy("missing"),
            Err(ServiceError::StrategyNotFound(_))
        ));
        assert!(matches!(
            svc.delete_strategy("missing"),
            Err(ServiceError::StrategyNotFound(_))
        ));
        assert!(matches!(
            svc.update_strategy("missing", &StrategyPatch::default()),
            Err(ServiceError::StrategyNotFound(_))
        ));
    }

    #[test]
    fn strategy_crud_round_trip() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let created = svc.create_strategy(new_strategy()).unwrap();
        assert_eq!(svc.list_strategies().unwrap().len(), 1);
        assert_eq!(svc.get_strategy(&created.id).unwrap(), created);
        svc.delete_strategy(&created.id).unwrap();
        assert!(svc.list_strategies().unwrap().is_empty());
    }

    #[test]
    fn backtest_without_snapshot_fails_and_records_nothing() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let created = svc.create_strategy(new_strategy()).unwrap();
        let request = BacktestRequest {
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            initial_capital: 10_000.0,
        };
        let err = svc.run_backtest(&created.id, &request).unwrap_err();
        assert!(matches!(err, ServiceError::MarketData(MarketDataError::Read { .. })));
        assert!(svc.list_backtests(&created.id).unwrap().is_empty());
    }

    #[test]
    fn unknown_backtest_id() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            service(&dir).get_backtest("nope"),
            Err(ServiceError::BacktestNotFound(_))
        ));
    }
}
