//! MA crossover grid search
//!
//! Runs one backtest per parameter combination, in parallel with rayon or
//! sequentially, and ranks the results.

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;

use crate::backtest::Backtester;
use crate::strategies::ma_crossover::{MaCrossoverConfig, MaCrossoverStrategy};
use crate::{Bar, Config};

/// Optimization result for a single parameter combination
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub params: MaCrossoverConfig,
    pub net_profit: f64,
    pub total_trades: usize,
    pub successful_trades: usize,
    pub failed_trades: usize,
    /// Fraction in [0, 1], 0 when nothing traded
    pub success_rate: f64,
}

/// Grid optimizer for the MA crossover strategy
pub struct Optimizer {
    base_config: Config,
}

impl Optimizer {
    pub fn new(base_config: Config) -> Self {
        Optimizer { base_config }
    }

    fn evaluate(&self, bars: &[Bar], params: &MaCrossoverConfig) -> OptimizationResult {
        let strategy = Box::new(MaCrossoverStrategy::new(*params));
        let mut backtester = Backtester::new(self.base_config.clone(), strategy);
        let result = backtester.run(bars);

        OptimizationResult {
            params: *params,
            net_profit: result.metrics.net_profit,
            total_trades: result.metrics.trade_count,
            successful_trades: result.metrics.successful_trades,
            failed_trades: result.metrics.failed_trades,
            success_rate: result.metrics.success_rate().unwrap_or(0.0),
        }
    }

    /// Run every combination in parallel. Results keep the input order.
    pub fn optimize(&self, bars: &[Bar], combos: &[MaCrossoverConfig]) -> Vec<OptimizationResult> {
        tracing::info!("Testing {} parameter combinations", combos.len());

        combos
            .par_iter()
            .map(|params| self.evaluate(bars, params))
            .collect()
    }

    /// Run optimization with progress tracking
    pub fn optimize_with_progress(
        &self,
        bars: &[Bar],
        combos: &[MaCrossoverConfig],
        progress_bar: &ProgressBar,
    ) -> Vec<OptimizationResult> {
        tracing::info!(
            "Testing {} parameter combinations with progress tracking",
            combos.len()
        );

        combos
            .par_iter()
            .map(|params| {
                let result = self.evaluate(bars, params);
                progress_bar.inc(1);
                result
            })
            .collect()
    }

    /// Run optimization sequentially (no parallelism)
    pub fn optimize_sequential(
        &self,
        bars: &[Bar],
        combos: &[MaCrossoverConfig],
    ) -> Vec<OptimizationResult> {
        tracing::info!(
            "Testing {} parameter combinations sequentially",
            combos.len()
        );

        combos.iter().map(|params| self.evaluate(bars, params)).collect()
    }

    /// Highest net profit; ties go to the earliest combination
    pub fn best(results: &[OptimizationResult]) -> Option<&OptimizationResult> {
        results.iter().fold(None, |best, r| match best {
            Some(b) if b.net_profit >= r.net_profit => Some(b),
            _ => Some(r),
        })
    }

    /// Sort optimization results by specified metric, best first
    pub fn sort_results(results: &mut [OptimizationResult], sort_by: &str) {
        match sort_by {
            "win_rate" => results.sort_by(|a, b| {
                b.success_rate
                    .partial_cmp(&a.success_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            "trades" => results.sort_by(|a, b| b.total_trades.cmp(&a.total_trades)),
            _ => results.sort_by(|a, b| {
                b.net_profit
                    .partial_cmp(&a.net_profit)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
        }
    }
}
