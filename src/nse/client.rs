//! NSE website API client
//!
//! The API answers only requests that look like they come from a browser
//! session, so the client sends browser headers and keeps cookies.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, REFERER};
use reqwest::Client;
use std::time::Duration as StdDuration;
use tracing::debug;

use super::types::{OptionChain, OptionChainResponse};
use super::NseError;

/// Base URL for NSE website
const NSE_BASE: &str = "https://www.nseindia.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/85.0.4183.102 Safari/537.36";

/// NSE option chain client
#[derive(Debug, Clone)]
pub struct NseClient {
    client: Client,
    base_url: String,
}

impl NseClient {
    pub fn new() -> Result<Self, NseError> {
        Self::with_base_url(NSE_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, NseError> {
        let base_url = base_url.into();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
        headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
        headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));

        let client = Client::builder()
            .timeout(StdDuration::from_secs(30))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .build()?;

        Ok(NseClient { client, base_url })
    }

    /// Fetch the option chain for an index symbol (e.g., "NIFTY", "BANKNIFTY")
    pub async fn get_option_chain(&self, symbol: &str) -> Result<OptionChain, NseError> {
        let referer = format!("{}/get-quotes/derivatives?symbol={}", self.base_url, symbol);

        // The landing page sets the session cookies the API checks for
        if let Err(e) = self.client.get(&self.base_url).send().await {
            debug!("Session warm-up failed: {}", e);
        }

        let url = format!("{}/api/option-chain-indices", self.base_url);
        debug!("Fetching option chain: symbol={}", symbol);

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .header(REFERER, referer)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NseError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let parsed: OptionChainResponse = serde_json::from_str(&body)?;
        let chain = OptionChain::from_response(symbol, parsed);
        debug!(
            "Option chain {}: {} calls, {} puts",
            symbol,
            chain.calls.len(),
            chain.puts.len()
        );

        Ok(chain)
    }
}
