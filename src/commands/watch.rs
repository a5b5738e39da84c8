//! Watch command - poll the latest 5-minute candle until Ctrl+C

use anyhow::Result;
use nifty_strategies::yahoo::YahooClient;
use nifty_strategies::{Bar, Config};
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};

use super::runtime;

pub fn run(config_path: String, ticker: Option<String>, interval_secs: Option<u64>) -> Result<()> {
    let config = Config::load_or_default(&config_path)?;
    let ticker = ticker.unwrap_or(config.watch.ticker);
    let interval_secs = interval_secs.unwrap_or(config.watch.interval_secs).max(1);

    runtime()?.block_on(run_async(ticker, interval_secs))
}

async fn run_async(ticker: String, interval_secs: u64) -> Result<()> {
    let client = YahooClient::new()?;

    info!("Watching {} every {} seconds (Ctrl+C to stop)", ticker, interval_secs);

    let mut poll_interval = interval(Duration::from_secs(interval_secs));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = poll_interval.tick() => {
                match client.get_chart(&ticker, "1d", "5m").await {
                    Ok(bars) => match bars.last() {
                        Some(last) => info!("{} {}", ticker, candle_summary(last)),
                        None => warn!("No data available, skipping update."),
                    },
                    Err(e) => error!("Error fetching data: {}", e),
                }
            }
            res = &mut shutdown => {
                if let Err(e) = res {
                    error!("Error setting up signal handler: {}", e);
                }
                info!("Received Ctrl+C, stopping watch");
                break;
            }
        }
    }

    Ok(())
}

fn candle_summary(bar: &Bar) -> String {
    format!(
        "live price: {:.2} ({} candle at {})",
        bar.close,
        if bar.is_bullish() { "bullish" } else { "bearish" },
        bar.timestamp.format("%H:%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_candle_summary() {
        let ts = NaiveDateTime::parse_from_str("2024-09-16 10:05", "%Y-%m-%d %H:%M").unwrap();
        let up = Bar::new_unchecked(ts, 100.0, 102.0, 99.0, 101.5, 0.0);
        assert_eq!(
            candle_summary(&up),
            "live price: 101.50 (bullish candle at 10:05)"
        );

        // Unchanged close counts as bearish
        let flat = Bar::new_unchecked(ts, 100.0, 101.0, 99.0, 100.0, 0.0);
        assert!(candle_summary(&flat).contains("bearish"));
    }
}
