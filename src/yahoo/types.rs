//! Yahoo Finance chart API types
//!
//! The v8 chart endpoint returns columnar arrays: one `timestamp` array and
//! parallel `open/high/low/close/volume` arrays where missing candles are
//! `null`.

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use tracing::debug;

use super::YahooError;
use crate::Bar;

/// Ranges accepted by the chart endpoint
pub const VALID_PERIODS: &[&str] = &[
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "ytd", "max",
];

/// Candle intervals accepted by the chart endpoint
pub const VALID_INTERVALS: &[&str] = &[
    "1m", "2m", "5m", "15m", "30m", "60m", "90m", "1h", "1d",
];

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    pub gmtoffset: i64,
    pub regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

/// Unix seconds to exchange wall-clock time
fn to_exchange_time(ts: i64, gmtoffset: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(ts + gmtoffset, 0).map(|dt| dt.naive_utc())
}

impl ChartResponse {
    /// Convert the columnar response into bars in exchange local time.
    ///
    /// Candles with any null price are skipped, null volume becomes 0.
    pub fn into_bars(self, ticker: &str) -> Result<Vec<Bar>, YahooError> {
        if let Some(err) = self.chart.error {
            return Err(YahooError::NoData(format!(
                "{} ({}: {})",
                ticker, err.code, err.description
            )));
        }

        let result = self
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| YahooError::NoData(ticker.to_string()))?;

        let gmtoffset = result.meta.gmtoffset;
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
        let at = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten();

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let (Some(open), Some(high), Some(low), Some(close)) = (
                at(&quote.open, i),
                at(&quote.high, i),
                at(&quote.low, i),
                at(&quote.close, i),
            ) else {
                continue;
            };
            let Some(timestamp) = to_exchange_time(ts, gmtoffset) else {
                continue;
            };
            let volume = at(&quote.volume, i).unwrap_or(0.0);

            match Bar::new(timestamp, open, high, low, close, volume) {
                Ok(bar) => bars.push(bar),
                Err(e) => debug!("Skipping invalid candle at {}: {}", timestamp, e),
            }
        }

        if bars.is_empty() {
            return Err(YahooError::NoData(ticker.to_string()));
        }

        Ok(bars)
    }
}

/// File name prefix used for downloaded data
///
/// The two index tickers keep their familiar names, anything else is
/// reduced to its alphanumeric characters.
pub fn file_prefix(ticker: &str) -> String {
    match ticker {
        "^NSEBANK" => "niftyBank".to_string(),
        "^NSEI" => "nifty50".to_string(),
        other => other
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase(),
    }
}

/// `{prefix}_data_{period}_{interval}_{YYYYmmdd_HHMMSS}.csv`
pub fn download_filename(ticker: &str, period: &str, interval: &str, at: NaiveDateTime) -> String {
    format!(
        "{}_data_{}_{}_{}.csv",
        file_prefix(ticker),
        period,
        interval,
        at.format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "^NSEBANK", "gmtoffset": 19800, "regularMarketPrice": 51200.5},
                "timestamp": [1726458300, 1726458600, 1726458900],
                "indicators": {"quote": [{
                    "open":   [51000.0, null, 51050.0],
                    "high":   [51100.0, 51120.0, 51150.0],
                    "low":    [50950.0, 51000.0, 51010.0],
                    "close":  [51050.0, 51080.0, 51140.0],
                    "volume": [0, 0, null]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_chart_response() {
        let response: ChartResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(response.chart.result.as_ref().unwrap()[0].meta.gmtoffset, 19800);

        let bars = response.into_bars("^NSEBANK").unwrap();
        // Second candle has a null open and is skipped
        assert_eq!(bars.len(), 2);
        // 1726458300 is 2024-09-16 03:45 UTC, 09:15 in IST
        assert_eq!(bars[0].time(), NaiveTime::from_hms_opt(9, 15, 0).unwrap());
        assert_eq!(bars[1].time(), NaiveTime::from_hms_opt(9, 25, 0).unwrap());
        assert_eq!(bars[1].volume, 0.0);
    }

    #[test]
    fn test_chart_error_is_no_data() {
        let json = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let response: ChartResponse = serde_json::from_str(json).unwrap();
        let err = response.into_bars("XYZ").unwrap_err();
        assert!(matches!(err, YahooError::NoData(ref msg) if msg.contains("XYZ")));
    }

    #[test]
    fn test_empty_result_is_no_data() {
        let json = r#"{"chart": {"result": [{"meta": {"gmtoffset": 0}, "indicators": {"quote": [{}]}}], "error": null}}"#;
        let response: ChartResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.into_bars("^NSEI"), Err(YahooError::NoData(_))));
    }

    #[test]
    fn test_download_filename() {
        let at = NaiveDateTime::parse_from_str("2024-09-16 15:30:05", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(
            download_filename("^NSEBANK", "5d", "5m", at),
            "niftyBank_data_5d_5m_20240916_153005.csv"
        );
        assert_eq!(file_prefix("^NSEI"), "nifty50");
        assert_eq!(file_prefix("BTC-USD"), "btcusd");
    }
}
