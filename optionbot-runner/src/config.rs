//! Application configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration rooted at `./data`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::logging::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding all data files. Relative file names resolve against it.
    pub data_dir: PathBuf,
    pub strategies_file: PathBuf,
    pub backtests_file: PathBuf,
    /// Historical option-chain snapshot (JSON array of market days).
    pub market_data_file: PathBuf,
    /// Capital used when a backtest request does not name one.
    pub default_initial_capital: f64,
    pub logging: LoggingConfig,
}

/// Logging section of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `optionbot_runner=debug`.
    pub level: String,
    /// `pretty`, `json` or `compact`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "compact".into(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            strategies_file: PathBuf::from("strategies.json"),
            backtests_file: PathBuf::from("backtests.jsonl"),
            market_data_file: PathBuf::from("historical_data.json"),
            default_initial_capital: 10_000.0,
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load from `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_initial_capital.is_finite() || self.default_initial_capital <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "default_initial_capital must be positive, got {}",
                self.default_initial_capital
            )));
        }
        for (name, file) in [
            ("strategies_file", &self.strategies_file),
            ("backtests_file", &self.backtests_file),
            ("market_data_file", &self.market_data_file),
        ] {
            if file.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} must not be empty")));
            }
        }
        self.logging
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::Invalid(format!("logging.format: {e}")))?;
        Ok(())
    }

    pub fn strategies_path(&self) -> PathBuf {
        self.resolve(&self.strategies_file)
    }

    pub fn backtests_path(&self) -> PathBuf {
        self.resolve(&self.backtests_file)
    }

    pub fn market_data_path(&self) -> PathBuf {
        self.resolve(&self.market_data_file)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir.join(file)
        }
    }
}
