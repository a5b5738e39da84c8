//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files with environment
//! variable overrides. Every section falls back to its `Default` so a config
//! file only needs the keys it changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::strategies::ma_crossover::MaCrossoverConfig;
use crate::strategies::opening_range::OpeningRangeConfig;

/// Semantic errors in an otherwise well-formed config
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("opening window start {start} is after window end {end}")]
    InvertedWindow { start: String, end: String },

    #[error("short_period ({short}) must be less than long_period ({long})")]
    InvalidMaPeriods { short: usize, long: usize },

    #[error("moving average periods must be non-zero")]
    ZeroMaPeriod,

    #[error("lot_size must be positive, got {0}")]
    InvalidLotSize(f64),

    #[error("grid section must list at least one short and one long period")]
    EmptyGrid,

    #[error("invalid {name} strategy section: {reason}")]
    InvalidStrategy { name: String, reason: String },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub opening_range: OpeningRangeConfig,
    #[serde(default = "default_strategy_name")]
    pub strategy_name: String,
    #[serde(default = "default_strategy")]
    pub strategy: serde_json::Value,
    #[serde(default)]
    pub backtest: BacktestConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub option_chain: OptionChainConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

fn default_strategy_name() -> String {
    "ma_crossover".to_string()
}

fn default_strategy() -> serde_json::Value {
    serde_json::to_value(MaCrossoverConfig::default()).unwrap_or_else(|_| serde_json::json!({}))
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let mut config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;

        config.apply_env();
        config.validate()?;

        Ok(config)
    }

    /// Load from file when it exists, otherwise fall back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        tracing::debug!("Config file {} not found, using defaults", path.display());
        let mut config = Config::default();
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(data_dir) = std::env::var("NIFTY_DATA_DIR") {
            self.data.data_dir = data_dir;
        }
    }

    /// Parse the strategy section as MA crossover parameters
    pub fn ma_crossover(&self) -> Result<MaCrossoverConfig> {
        serde_json::from_value(self.strategy.clone())
            .context("Failed to parse ma_crossover strategy config")
    }

    /// Replace the strategy section with the given MA crossover parameters
    pub fn set_ma_crossover(&mut self, params: &MaCrossoverConfig) {
        if let Ok(value) = serde_json::to_value(params) {
            self.strategy = value;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.opening_range.validate()?;

        if self.strategy_name == "ma_crossover" {
            let ma = self.ma_crossover().map_err(|e| ConfigError::InvalidStrategy {
                name: self.strategy_name.clone(),
                reason: format!("{:#}", e),
            })?;
            ma.validate()?;
        }

        if self.backtest.lot_size <= 0.0 {
            return Err(ConfigError::InvalidLotSize(self.backtest.lot_size));
        }

        if self.grid.short_periods.is_empty() || self.grid.long_periods.is_empty() {
            return Err(ConfigError::EmptyGrid);
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig::default(),
            opening_range: OpeningRangeConfig::default(),
            strategy_name: default_strategy_name(),
            strategy: default_strategy(),
            backtest: BacktestConfig::default(),
            grid: GridConfig::default(),
            option_chain: OptionChainConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

/// Data source and download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub data_dir: String,
    pub ticker: String,
    pub period: String,
    pub interval: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            data_dir: "data".to_string(),
            ticker: "^NSEBANK".to_string(),
            period: "5d".to_string(),
            interval: "5m".to_string(),
        }
    }
}

/// Backtest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Units per lot, multiplies price points into P&L
    pub lot_size: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 100_000.0,
            lot_size: 15.0, // BANKNIFTY
        }
    }
}

/// MA period grid for optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub short_periods: Vec<usize>,
    pub long_periods: Vec<usize>,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            short_periods: (5..20).collect(),
            long_periods: (50..=100).collect(),
        }
    }
}

/// NSE option chain snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionChainConfig {
    pub symbol: String,
    /// Rows per side printed to the console
    pub rows: usize,
    pub output_dir: String,
}

impl Default for OptionChainConfig {
    fn default() -> Self {
        OptionChainConfig {
            symbol: "NIFTY".to_string(),
            rows: 10,
            output_dir: ".".to_string(),
        }
    }
}

/// Live price watch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub ticker: String,
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig {
            ticker: "BTC-USD".to_string(),
            interval_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.short_periods.len(), 15);
        assert_eq!(config.grid.long_periods.len(), 51);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "backtest": { "lot_size": 25 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.backtest.lot_size, 25.0);
        assert_eq!(config.backtest.initial_capital, 100_000.0);
        assert_eq!(config.strategy_name, "ma_crossover");
        assert_eq!(config.ma_crossover().unwrap().short_period, 14);
    }

    #[test]
    fn test_inverted_window_rejected() {
        let json = r#"{ "opening_range": { "window_start": "09:30", "window_end": "09:15" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedWindow { .. })
        ));
    }

    #[test]
    fn test_bad_ma_periods_rejected() {
        let json = r#"{ "strategy": { "short_period": 50, "long_period": 20 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidMaPeriods {
                short: 50,
                long: 20
            })
        );
    }

    #[test]
    fn test_unparseable_strategy_section_rejected() {
        let json = r#"{ "strategy": { "short_period": "fast" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidStrategy { ref name, .. }) if name == "ma_crossover"
        ));
    }

    #[test]
    fn test_set_ma_crossover_round_trips() {
        let mut config = Config::default();
        let params = MaCrossoverConfig {
            short_period: 10,
            long_period: 50,
            allow_short: false,
        };
        config.set_ma_crossover(&params);
        let parsed = config.ma_crossover().unwrap();
        assert_eq!(parsed.short_period, 10);
        assert!(!parsed.allow_short);
    }
}
