//! Trading Strategies Module
//!
//! - `opening_range`: per-day opening-range breakout scan (pure analysis)
//! - `ma_crossover`: signal strategy driven by the backtester
//!
//! Signal strategies implement [`Strategy`] and are created by name through
//! the registry below.

pub mod ma_crossover;
pub mod opening_range;

use crate::{Bar, Config, Position, Signal, Trade};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::OnceLock;

// =============================================================================
// Strategy Trait
// =============================================================================

/// Trading strategy trait driven bar by bar by the backtester.
pub trait Strategy: Send + Sync {
    /// Strategy identifier (must match config's strategy_name)
    fn name(&self) -> &'static str;

    /// Generate trading signal for the bars seen so far.
    ///
    /// With no position, `Long`/`Short` open one. With a position, `Exit`
    /// closes it. `Flat` means do nothing.
    fn generate_signal(&self, bars: &[Bar], position: Option<&Position>) -> Signal;

    /// Notification when a trade is closed
    fn notify_trade(&mut self, trade: &Trade) {
        tracing::debug!(
            side = %trade.side,
            entry = trade.entry_price,
            exit = trade.exit_price,
            pnl = trade.pnl,
            "Trade closed"
        );
    }

    /// Initialize strategy (called once before the run starts)
    fn init(&mut self) {}
}

// =============================================================================
// Strategy Registry
// =============================================================================

/// Factory function type for creating strategies from config
pub type StrategyFactory = fn(&Config) -> Result<Box<dyn Strategy>>;

static REGISTRY: OnceLock<HashMap<&'static str, StrategyFactory>> = OnceLock::new();

fn get_registry() -> &'static HashMap<&'static str, StrategyFactory> {
    REGISTRY.get_or_init(|| {
        let mut map = HashMap::new();
        map.insert("ma_crossover", ma_crossover::create as StrategyFactory);
        map
    })
}

/// Create a strategy from configuration
pub fn create_strategy(config: &Config) -> Result<Box<dyn Strategy>> {
    let registry = get_registry();

    let factory = registry
        .get(config.strategy_name.as_str())
        .ok_or_else(|| {
            let available: Vec<_> = registry.keys().copied().collect();
            anyhow::anyhow!(
                "Unknown strategy: '{}'. Available: {}",
                config.strategy_name,
                available.join(", ")
            )
        })?;

    factory(config)
}

/// Get list of available strategy names
pub fn available_strategies() -> Vec<&'static str> {
    get_registry().keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_strategy() {
        let config = Config::default();
        let strategy = create_strategy(&config).unwrap();
        assert_eq!(strategy.name(), "ma_crossover");
    }

    #[test]
    fn test_unknown_strategy_lists_available() {
        let config = Config {
            strategy_name: "nope".to_string(),
            ..Config::default()
        };
        let err = create_strategy(&config).err().unwrap().to_string();
        assert!(err.contains("nope"));
        assert!(err.contains("ma_crossover"));
        assert!(available_strategies().contains(&"ma_crossover"));
    }
}
