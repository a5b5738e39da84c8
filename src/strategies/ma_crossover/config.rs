//! MA Crossover Configuration

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaCrossoverConfig {
    /// Fast SMA period (default: 14)
    pub short_period: usize,

    /// Slow SMA period (default: 26)
    pub long_period: usize,

    /// Open shorts when the fast SMA is below the slow one (default: true)
    pub allow_short: bool,
}

impl Default for MaCrossoverConfig {
    fn default() -> Self {
        Self {
            short_period: 14,
            long_period: 26,
            allow_short: true,
        }
    }
}

impl MaCrossoverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.short_period == 0 || self.long_period == 0 {
            return Err(ConfigError::ZeroMaPeriod);
        }
        if self.short_period >= self.long_period {
            return Err(ConfigError::InvalidMaPeriods {
                short: self.short_period,
                long: self.long_period,
            });
        }
        Ok(())
    }
}
