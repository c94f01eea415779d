//! Strategy store: a JSON array of strategies in a single file.
//!
//! Every mutation rewrites the whole file through `<file>.tmp` + rename, so a
//! crash mid-write never leaves a half-written array behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use optionbot_core::domain::{NewStrategy, Strategy, StrategyError, StrategyPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("strategy not found: {0}")]
    NotFound(String),
    #[error("strategies file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Invalid(#[from] StrategyError),
    #[error("strategies file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize strategies: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// File-backed strategy repository.
#[derive(Debug, Clone)]
pub struct StrategyStore {
    path: PathBuf,
}

impl StrategyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All strategies in file order. A missing file is an empty store.
    pub fn list(&self) -> Result<Vec<Strategy>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    pub fn get(&self, id: &str) -> Result<Option<Strategy>, StoreError> {
        Ok(self.list()?.into_iter().find(|s| s.id == id))
    }

    /// Validate, assign an id and creation time, and persist.
    pub fn create(&self, new: NewStrategy) -> Result<Strategy, StoreError> {
        new.validate()?;
        let mut strategies = self.list()?;
        let strategy = new.into_strategy(Uuid::new_v4().to_string(), Utc::now());
        strategies.push(strategy.clone());
        self.write_all(&strategies)?;
        info!(id = %strategy.id, name = %strategy.name, "strategy created");
        Ok(strategy)
    }

    pub fn update(&self, id: &str, patch: &StrategyPatch) -> Result<Strategy, StoreError> {
        let mut strategies = self.list()?;
        let strategy = strategies
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply(strategy)?;
        let updated = strategy.clone();
        self.write_all(&strategies)?;
        info!(id = %updated.id, name = %updated.name, "strategy updated");
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut strategies = self.list()?;
        let before = strategies.len();
        strategies.retain(|s| s.id != id);
        if strategies.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.write_all(&strategies)?;
        info!(id, "strategy deleted");
        Ok(())
    }

    fn write_all(&self, strategies: &[Strategy]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(strategies).map_err(StoreError::Serialize)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StoreError::Io(e)
        })?;
        debug!(path = %self.path.display(), count = strategies.len(), "strategies written");
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
