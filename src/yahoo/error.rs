use thiserror::Error;

#[derive(Debug, Error)]
pub enum YahooError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Yahoo Finance API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse chart response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No data found for {0}")]
    NoData(String),
}
