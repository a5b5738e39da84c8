use thiserror::Error;

#[derive(Debug, Error)]
pub enum NseError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to fetch data. Status code: {0}")]
    Status(u16),

    #[error("Failed to parse option chain: {0}")]
    Parse(#[from] serde_json::Error),
}
