//! Yahoo Finance chart client for intraday candles
//! No API key needed for the public chart endpoint.

mod client;
mod error;
mod types;

pub use client::YahooClient;
pub use error::YahooError;
pub use types::*;
