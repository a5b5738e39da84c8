//! Opening Range Configuration

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningRangeConfig {
    /// First time of day included in the reference window (default: 09:15)
    #[serde(with = "hhmm")]
    pub window_start: NaiveTime,

    /// Last time of day included in the reference window (default: 09:30)
    #[serde(with = "hhmm")]
    pub window_end: NaiveTime,
}

impl Default for OpeningRangeConfig {
    fn default() -> Self {
        Self {
            window_start: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN),
            window_end: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl OpeningRangeConfig {
    pub fn new(window_start: NaiveTime, window_end: NaiveTime) -> Result<Self, ConfigError> {
        let config = Self {
            window_start,
            window_end,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_start > self.window_end {
            return Err(ConfigError::InvertedWindow {
                start: self.window_start.format("%H:%M").to_string(),
                end: self.window_end.format("%H:%M").to_string(),
            });
        }
        Ok(())
    }

    /// Both endpoints are inclusive
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.window_start && time <= self.window_end
    }
}

/// Parse a time of day given as `HH:MM` or `HH:MM:SS`
pub fn parse_time_of_day(s: &str) -> chrono::ParseResult<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
}

mod hhmm {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let s = if time.second() == 0 {
            time.format("%H:%M").to_string()
        } else {
            time.format("%H:%M:%S").to_string()
        };
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_time_of_day(&s).map_err(serde::de::Error::custom)
    }
}
