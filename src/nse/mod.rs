//! NSE option chain client
//!
//! Fetches the index option chain snapshot from the NSE website API and
//! splits it into call and put quotes.

mod client;
mod error;
mod types;

pub use client::NseClient;
pub use error::NseError;
pub use types::*;
