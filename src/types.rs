//! Core data types used across the system

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for bar data
#[derive(Debug, Error)]
pub enum BarValidationError {
    #[error("high ({high}) must be >= low ({low})")]
    HighLessThanLow { high: f64, low: f64 },

    #[error("volume ({0}) must be >= 0")]
    NegativeVolume(f64),

    #[error("open ({open}) must be between low ({low}) and high ({high})")]
    OpenOutOfRange { open: f64, low: f64, high: f64 },

    #[error("close ({close}) must be between low ({low}) and high ({high})")]
    CloseOutOfRange { close: f64, low: f64, high: f64 },

    #[error("prices must be positive: open={open}, high={high}, low={low}, close={close}")]
    NonPositivePrice {
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },
}

/// One OHLC observation.
///
/// Timestamps are timezone-naive exchange wall-clock time, so 09:15 means
/// 09:15 at the exchange regardless of where the file was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    /// Create a new bar with validation
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, BarValidationError> {
        let bar = Self::new_unchecked(timestamp, open, high, low, close, volume);
        bar.validate()?;
        Ok(bar)
    }

    /// Create a bar without validation (for trusted sources or when validation is done separately)
    pub fn new_unchecked(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Validate the bar data
    pub fn validate(&self) -> Result<(), BarValidationError> {
        if self.open <= 0.0 || self.high <= 0.0 || self.low <= 0.0 || self.close <= 0.0 {
            return Err(BarValidationError::NonPositivePrice {
                open: self.open,
                high: self.high,
                low: self.low,
                close: self.close,
            });
        }

        if self.high < self.low {
            return Err(BarValidationError::HighLessThanLow {
                high: self.high,
                low: self.low,
            });
        }

        if self.volume < 0.0 {
            return Err(BarValidationError::NegativeVolume(self.volume));
        }

        if self.open < self.low || self.open > self.high {
            return Err(BarValidationError::OpenOutOfRange {
                open: self.open,
                low: self.low,
                high: self.high,
            });
        }

        if self.close < self.low || self.close > self.high {
            return Err(BarValidationError::CloseOutOfRange {
                close: self.close,
                low: self.low,
                high: self.high,
            });
        }

        Ok(())
    }

    /// Check if the bar is valid without returning detailed error
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Calendar date of the bar
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Time of day of the bar
    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "LONG"),
            Side::Sell => write!(f, "SHORT"),
        }
    }
}

/// Trading signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Long,
    Short,
    /// Close the open position
    Exit,
    Flat,
}

/// Open position held by the backtester
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
}

impl Position {
    pub fn entry_date(&self) -> NaiveDate {
        self.entry_time.date()
    }

    /// Price points gained per unit if closed at `price`
    pub fn points(&self, price: f64) -> f64 {
        match self.side {
            Side::Buy => price - self.entry_price,
            Side::Sell => self.entry_price - price,
        }
    }
}

/// Completed trade record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    /// Points scaled by lot size
    pub pnl: f64,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_valid_bar() {
        let bar = Bar::new(ts("2024-09-16 09:15:00"), 100.0, 105.0, 99.0, 103.0, 0.0);
        assert!(bar.is_ok());
        let bar = bar.unwrap();
        assert_eq!(bar.date(), NaiveDate::from_ymd_opt(2024, 9, 16).unwrap());
        assert_eq!(bar.time(), NaiveTime::from_hms_opt(9, 15, 0).unwrap());
        assert!(bar.is_bullish());
    }

    #[test]
    fn test_high_below_low_rejected() {
        let err = Bar::new(ts("2024-09-16 09:15:00"), 100.0, 98.0, 99.0, 99.0, 0.0).unwrap_err();
        assert!(matches!(err, BarValidationError::HighLessThanLow { .. }));
    }

    #[test]
    fn test_close_out_of_range_rejected() {
        let err = Bar::new(ts("2024-09-16 09:15:00"), 100.0, 105.0, 99.0, 106.0, 0.0).unwrap_err();
        assert!(matches!(err, BarValidationError::CloseOutOfRange { .. }));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let bar = Bar::new_unchecked(ts("2024-09-16 09:15:00"), 0.0, 105.0, 99.0, 100.0, 0.0);
        assert!(!bar.is_valid());
    }

    #[test]
    fn test_position_points() {
        let long = Position {
            side: Side::Buy,
            entry_price: 100.0,
            entry_time: ts("2024-09-16 09:15:00"),
        };
        let short = Position {
            side: Side::Sell,
            ..long.clone()
        };
        assert_eq!(long.points(104.0), 4.0);
        assert_eq!(short.points(104.0), -4.0);
    }
}
