//! Yahoo Finance API client for fetching intraday chart data
//!
//! # Example
//! ```no_run
//! use nifty_strategies::yahoo::YahooClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = YahooClient::new()?;
//!     let bars = client.get_chart("^NSEI", "1d", "5m").await?;
//!     println!("Fetched {} bars", bars.len());
//!     Ok(())
//! }
//! ```

use reqwest::Client;
use std::time::Duration as StdDuration;
use tracing::{debug, warn};

use super::types::{ChartResponse, VALID_INTERVALS, VALID_PERIODS};
use super::YahooError;
use crate::Bar;

/// Base URL for the Yahoo Finance chart API
const YAHOO_CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// The endpoint rejects requests without a browser-like user agent
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Yahoo Finance API client
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    /// Create a new client against the public endpoint
    pub fn new() -> Result<Self, YahooError> {
        Self::with_base_url(YAHOO_CHART_BASE)
    }

    /// Create a client against a different chart endpoint
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, YahooError> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(YahooClient {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch candles for a ticker
    ///
    /// # Arguments
    /// * `ticker` - Yahoo symbol (e.g., "^NSEBANK", "^NSEI", "BTC-USD")
    /// * `period` - Lookback range (e.g., "1d", "5d", "1mo")
    /// * `interval` - Candle size (e.g., "5m", "15m", "1h")
    pub async fn get_chart(
        &self,
        ticker: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<Bar>, YahooError> {
        if !VALID_PERIODS.contains(&period) {
            warn!("Unrecognized period '{}', valid: {}", period, VALID_PERIODS.join(", "));
        }
        if !VALID_INTERVALS.contains(&interval) {
            warn!(
                "Unrecognized interval '{}', valid: {}",
                interval,
                VALID_INTERVALS.join(", ")
            );
        }

        let url = format!("{}/{}", self.base_url, ticker);
        debug!(
            "Fetching chart: ticker={}, period={}, interval={}",
            ticker, period, interval
        );

        let response = self
            .client
            .get(&url)
            .query(&[("range", period), ("interval", interval)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            // Unknown tickers come back as 404 with a chart error payload
            if let Ok(parsed) = serde_json::from_str::<ChartResponse>(&body) {
                if parsed.chart.error.is_some() {
                    return parsed.into_bars(ticker);
                }
            }
            return Err(YahooError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChartResponse = serde_json::from_str(&body)?;
        let bars = parsed.into_bars(ticker)?;
        debug!("Fetched {} bars for {}", bars.len(), ticker);

        Ok(bars)
    }
}
