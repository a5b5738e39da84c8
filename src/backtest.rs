//! Backtesting engine
//!
//! Single-instrument, bar-by-bar simulation. Entries and exits fill at the
//! close of the signal bar, one action per bar. P&L is tracked in price
//! points scaled by the configured lot size.

use serde::{Deserialize, Serialize};

use crate::Strategy;
use crate::{Bar, Config, Position, Side, Signal, Trade};

/// Summary statistics of a backtest run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestMetrics {
    /// Positions opened, including one still open at the end
    pub trade_count: usize,
    pub successful_trades: usize,
    pub failed_trades: usize,
    pub total_gain: f64,
    /// Absolute value of losing P&L
    pub total_loss: f64,
    pub net_profit: f64,
    pub starting_value: f64,
    pub ending_value: f64,
}

impl BacktestMetrics {
    /// Successful trades over positions opened, `None` when nothing traded
    pub fn success_rate(&self) -> Option<f64> {
        if self.trade_count == 0 {
            return None;
        }
        Some(self.successful_trades as f64 / self.trade_count as f64)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub metrics: BacktestMetrics,
    /// Position left open when the data ran out (not counted in P&L)
    pub open_position: Option<Position>,
}

/// Backtest engine
pub struct Backtester {
    config: Config,
    strategy: Box<dyn Strategy>,
}

impl Backtester {
    pub fn new(config: Config, strategy: Box<dyn Strategy>) -> Self {
        Backtester { config, strategy }
    }

    /// Run backtest over chronologically sorted bars
    pub fn run(&mut self, bars: &[Bar]) -> BacktestResult {
        let lot_size = self.config.backtest.lot_size;
        let starting_value = self.config.backtest.initial_capital;

        let mut metrics = BacktestMetrics {
            starting_value,
            ending_value: starting_value,
            ..Default::default()
        };
        let mut trades = Vec::new();
        let mut position: Option<Position> = None;

        self.strategy.init();

        for (i, bar) in bars.iter().enumerate() {
            let signal = self.strategy.generate_signal(&bars[..=i], position.as_ref());

            match (signal, position.take()) {
                (Signal::Long, None) | (Signal::Short, None) => {
                    let side = if signal == Signal::Long {
                        Side::Buy
                    } else {
                        Side::Sell
                    };
                    tracing::debug!(%side, price = bar.close, time = %bar.timestamp, "Entry");
                    metrics.trade_count += 1;
                    position = Some(Position {
                        side,
                        entry_price: bar.close,
                        entry_time: bar.timestamp,
                    });
                }
                (Signal::Exit, Some(pos)) => {
                    let pnl = pos.points(bar.close) * lot_size;
                    let trade = Trade {
                        side: pos.side,
                        entry_price: pos.entry_price,
                        exit_price: bar.close,
                        entry_time: pos.entry_time,
                        exit_time: bar.timestamp,
                        pnl,
                    };

                    if trade.is_win() {
                        metrics.total_gain += pnl;
                        metrics.successful_trades += 1;
                    } else {
                        metrics.total_loss += pnl.abs();
                        metrics.failed_trades += 1;
                    }

                    self.strategy.notify_trade(&trade);
                    trades.push(trade);
                }
                (_, current) => position = current,
            }
        }

        metrics.net_profit = metrics.total_gain - metrics.total_loss;
        metrics.ending_value = starting_value + metrics.net_profit;

        if let Some(ref pos) = position {
            tracing::debug!(side = %pos.side, entry = pos.entry_price, "Position still open at end of data");
        }

        BacktestResult {
            trades,
            metrics,
            open_position: position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::ma_crossover::{MaCrossoverConfig, MaCrossoverStrategy};
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDateTime};

    fn bars(start: &str, closes: &[f64]) -> Vec<Bar> {
        let start = NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M").unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Bar::new_unchecked(start + Duration::minutes(5 * i as i64), c, c + 1.0, c - 1.0, c, 0.0)
            })
            .collect()
    }

    fn backtester(allow_short: bool, lot_size: f64) -> Backtester {
        let mut config = Config::default();
        config.backtest.lot_size = lot_size;
        let strategy = MaCrossoverStrategy::new(MaCrossoverConfig {
            short_period: 2,
            long_period: 3,
            allow_short,
        });
        Backtester::new(config, Box::new(strategy))
    }

    #[test]
    fn test_long_trade_closed_on_reversal() {
        // Bar 2: fast 101.5 > slow 101 -> long at 102
        // Bar 3: 104 -> hold. Bar 4: 95 -> fast 99.5 < slow 100.33 -> exit at 95
        let data = bars("2024-09-16 09:15", &[100.0, 101.0, 102.0, 104.0, 95.0]);
        let result = backtester(false, 15.0).run(&data);

        assert_eq!(result.metrics.trade_count, 1);
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.side, Side::Buy);
        assert_relative_eq!(trade.entry_price, 102.0);
        assert_relative_eq!(trade.exit_price, 95.0);
        assert_relative_eq!(trade.pnl, -105.0);
        assert_eq!(result.metrics.failed_trades, 1);
        assert_relative_eq!(result.metrics.total_loss, 105.0);
        assert_relative_eq!(result.metrics.net_profit, -105.0);
        assert_relative_eq!(result.metrics.ending_value, 100_000.0 - 105.0);
    }

    #[test]
    fn test_short_trade_pnl() {
        // Bar 2: fast 99.5 < slow 100 -> short at 99
        // Bar 3: 97 -> hold. Bar 4: 105 -> fast 101 > slow 100.33 -> exit at 105
        let data = bars("2024-09-16 09:15", &[101.0, 100.0, 99.0, 97.0, 105.0]);
        let result = backtester(true, 1.0).run(&data);

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].side, Side::Sell);
        assert_relative_eq!(result.trades[0].pnl, -6.0);

        // Short at 99, exit at 95 when fast 91.5 > slow 91
        let data = bars("2024-09-16 09:15", &[101.0, 100.0, 99.0, 90.0, 88.0, 95.0]);
        let result = backtester(true, 15.0).run(&data);
        assert_eq!(result.trades.len(), 1);
        assert_relative_eq!(result.trades[0].pnl, 60.0);
        assert_eq!(result.metrics.successful_trades, 1);
        assert_relative_eq!(result.metrics.total_gain, 60.0);
    }

    #[test]
    fn test_position_closed_at_day_change() {
        let mut data = bars("2024-09-16 15:10", &[100.0, 101.0, 102.0, 103.0]);
        data.extend(bars("2024-09-17 09:15", &[104.0, 105.0]));
        let result = backtester(false, 15.0).run(&data);

        // Long at 102 on 2024-09-16, forced out at the first bar of the next day
        let first = &result.trades[0];
        assert_eq!(first.entry_time.date(), data[2].timestamp.date());
        assert_eq!(first.exit_time, data[4].timestamp);
        assert_relative_eq!(first.pnl, (104.0 - 102.0) * 15.0);
        assert_eq!(result.metrics.successful_trades, 1);

        // Re-entered on the following bar, still open at the end
        assert_eq!(result.metrics.trade_count, 2);
        assert!(result.open_position.is_some());
        assert_eq!(result.metrics.success_rate(), Some(0.5));
    }

    #[test]
    fn test_zero_pnl_counts_as_failure() {
        // Long at 102, exit on the next day at the same price
        let mut data = bars("2024-09-16 15:10", &[100.0, 101.0, 102.0]);
        data.extend(bars("2024-09-17 09:15", &[102.0]));
        let result = backtester(false, 15.0).run(&data);

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.metrics.failed_trades, 1);
        assert_relative_eq!(result.metrics.total_loss, 0.0);
    }

    #[test]
    fn test_no_trades_on_short_data() {
        let data = bars("2024-09-16 09:15", &[100.0, 101.0]);
        let result = backtester(true, 15.0).run(&data);
        assert!(result.trades.is_empty());
        assert_eq!(result.metrics.trade_count, 0);
        assert_eq!(result.metrics.success_rate(), None);
        assert_relative_eq!(result.metrics.ending_value, 100_000.0);
    }
}
