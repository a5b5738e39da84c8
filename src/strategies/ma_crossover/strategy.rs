//! MA Crossover Strategy - Intraday
//!
//! Entry: fast SMA above slow SMA goes long; below goes short (if enabled)
//! Exit: the averages flip against the position, or a new trading day starts

use crate::indicators::sma;
use crate::strategies::Strategy;
use crate::{Bar, Position, Side, Signal};

use super::config::MaCrossoverConfig;

pub struct MaCrossoverStrategy {
    config: MaCrossoverConfig,
}

impl MaCrossoverStrategy {
    pub fn new(config: MaCrossoverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MaCrossoverConfig {
        &self.config
    }

    /// Current (fast, slow) SMA values, `None` until both have warmed up
    fn moving_averages(&self, bars: &[Bar]) -> Option<(f64, f64)> {
        if bars.len() < self.config.long_period {
            return None;
        }

        // Only the slow window is needed for either average
        let start = bars.len() - self.config.long_period;
        let closes: Vec<f64> = bars[start..].iter().map(|b| b.close).collect();

        let fast = sma(&closes, self.config.short_period).last().copied().flatten()?;
        let slow = sma(&closes, self.config.long_period).last().copied().flatten()?;
        Some((fast, slow))
    }
}

impl Strategy for MaCrossoverStrategy {
    fn name(&self) -> &'static str {
        "ma_crossover"
    }

    fn generate_signal(&self, bars: &[Bar], position: Option<&Position>) -> Signal {
        let Some(current) = bars.last() else {
            return Signal::Flat;
        };
        let Some((fast, slow)) = self.moving_averages(bars) else {
            return Signal::Flat;
        };

        match position {
            None => {
                if fast > slow {
                    Signal::Long
                } else if fast < slow && self.config.allow_short {
                    Signal::Short
                } else {
                    Signal::Flat
                }
            }
            Some(pos) => {
                let new_day = current.date() != pos.entry_date();
                let reversed = match pos.side {
                    Side::Buy => fast < slow,
                    Side::Sell => fast > slow,
                };
                if reversed || new_day {
                    Signal::Exit
                } else {
                    Signal::Flat
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let start = NaiveDateTime::parse_from_str("2024-09-16 09:15", "%Y-%m-%d %H:%M").unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Bar::new_unchecked(start + Duration::minutes(5 * i as i64), c, c + 1.0, c - 1.0, c, 0.0)
            })
            .collect()
    }

    fn strategy(allow_short: bool) -> MaCrossoverStrategy {
        MaCrossoverStrategy::new(MaCrossoverConfig {
            short_period: 2,
            long_period: 4,
            allow_short,
        })
    }

    #[test]
    fn test_flat_until_warmed_up() {
        let bars = bars_from_closes(&[100.0, 101.0, 102.0]);
        assert_eq!(strategy(true).generate_signal(&bars, None), Signal::Flat);
    }

    #[test]
    fn test_long_on_rising_prices() {
        let bars = bars_from_closes(&[100.0, 101.0, 102.0, 103.0]);
        assert_eq!(strategy(true).generate_signal(&bars, None), Signal::Long);
    }

    #[test]
    fn test_short_only_when_allowed() {
        let bars = bars_from_closes(&[103.0, 102.0, 101.0, 100.0]);
        assert_eq!(strategy(true).generate_signal(&bars, None), Signal::Short);
        assert_eq!(strategy(false).generate_signal(&bars, None), Signal::Flat);
    }

    #[test]
    fn test_exit_long_on_reversal() {
        let bars = bars_from_closes(&[100.0, 104.0, 103.0, 99.0, 98.0]);
        let pos = Position {
            side: Side::Buy,
            entry_price: 104.0,
            entry_time: bars[1].timestamp,
        };
        assert_eq!(strategy(true).generate_signal(&bars, Some(&pos)), Signal::Exit);
    }

    #[test]
    fn test_hold_long_while_trend_intact() {
        let bars = bars_from_closes(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let pos = Position {
            side: Side::Buy,
            entry_price: 103.0,
            entry_time: bars[3].timestamp,
        };
        assert_eq!(strategy(true).generate_signal(&bars, Some(&pos)), Signal::Flat);
    }

    #[test]
    fn test_exit_on_new_day() {
        let bars = bars_from_closes(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let pos = Position {
            side: Side::Buy,
            entry_price: 103.0,
            entry_time: bars[3].timestamp - Duration::days(1),
        };
        assert_eq!(strategy(true).generate_signal(&bars, Some(&pos)), Signal::Exit);
    }
}
