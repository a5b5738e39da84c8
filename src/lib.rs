//! Nifty Intraday Strategies
//!
//! Analysis and backtesting tools for intraday index trading on
//! 5-minute candles, featuring an opening-range breakout scan, an SMA
//! crossover backtester with grid optimization, and market data clients.
//!
//! # Opening-Range Scan
//! ```no_run
//! use nifty_strategies::data::load_csv;
//! use nifty_strategies::strategies::opening_range::{classify, OpeningRangeConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let bars = load_csv("niftyBank_data_5d_5m.csv")?;
//!     let report = classify(&bars, &OpeningRangeConfig::default());
//!     println!(
//!         "Breakouts: {}, Breakdowns: {}",
//!         report.total_breakouts(),
//!         report.total_breakdowns()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! # Market Data Clients
//!
//! - **Yahoo Finance**: public chart endpoint for index and crypto candles
//! - **NSE**: option chain snapshot for index options
//!
//! ```no_run
//! use nifty_strategies::yahoo::YahooClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = YahooClient::new()?;
//!     let bars = client.get_chart("^NSEBANK", "5d", "5m").await?;
//!     println!("Fetched {} bars", bars.len());
//!     Ok(())
//! }
//! ```

pub mod backtest;
pub mod config;
pub mod data;
pub mod indicators;
pub mod nse;
pub mod optimizer;
pub mod strategies;
pub mod types;
pub mod yahoo;

pub use config::Config;
pub use strategies::Strategy;
pub use types::*;

// Re-export market data clients for convenience
pub use nse::NseClient;
pub use yahoo::YahooClient;
