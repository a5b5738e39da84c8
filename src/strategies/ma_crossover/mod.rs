//! Moving Average Crossover Strategy
//!
//! Intraday SMA crossover with a forced exit when the trading day changes.

pub mod config;
pub mod grid_params;
pub mod strategy;

pub use config::MaCrossoverConfig;
pub use grid_params::GridParams;
pub use strategy::MaCrossoverStrategy;

use crate::Config;
use anyhow::Result;

/// Factory used by the strategy registry
pub fn create(config: &Config) -> Result<Box<dyn super::Strategy>> {
    let params = config.ma_crossover()?;
    params.validate()?;
    Ok(Box::new(MaCrossoverStrategy::new(params)))
}

/// Short description of a parameter set for tables and logs
pub fn format_params(params: &MaCrossoverConfig) -> String {
    format!(
        "Short:{} Long:{}{}",
        params.short_period,
        params.long_period,
        if params.allow_short { " L/S" } else { " L" }
    )
}
