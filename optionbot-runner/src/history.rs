//! Backtest history: JSONL append-only persistence.
//!
//! Each completed backtest is one JSON object per line. Appends never rewrite
//! earlier lines, and a torn or hand-edited line only loses that one record.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use optionbot_core::domain::BacktestResult;

/// JSONL history file manager.
#[derive(Debug, Clone)]
pub struct BacktestHistory {
    path: PathBuf,
}

impl BacktestHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append a result as a single line.
    pub fn append(&self, result: &BacktestResult) -> io::Result<()> {
        let json = serde_json::to_string(result)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(file, "{json}")?;
        file.flush()?;

        debug!(backtest_id = %result.backtest_id, path = %self.path.display(), "backtest appended");
        Ok(())
    }

    /// Read all results in append order.
    ///
    /// Skips blank and malformed lines (logged but not fatal).
    pub fn read_all(&self) -> io::Result<Vec<BacktestResult>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let reader = io::BufReader::new(file);
        let mut results = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<BacktestResult>(&line) {
                Ok(result) => results.push(result),
                Err(e) => warn!(line = index + 1, error = %e, "skipping malformed history line"),
            }
        }

        Ok(results)
    }

    /// Most recent result with this id.
    pub fn find(&self, backtest_id: &str) -> io::Result<Option<BacktestResult>> {
        Ok(self
            .read_all()?
            .into_iter()
            .rev()
            .find(|r| r.backtest_id == backtest_id))
    }

    /// All results for a strategy, oldest first.
    pub fn for_strategy(&self, strategy_id: &str) -> io::Result<Vec<BacktestResult>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|r| r.strategy_id == strategy_id)
            .collect())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
