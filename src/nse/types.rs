//! NSE option chain API types

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw response of `/api/option-chain-indices`
#[derive(Debug, Deserialize)]
pub struct OptionChainResponse {
    pub records: Records,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Records {
    #[serde(default)]
    pub data: Vec<StrikeRecord>,
    pub underlying_value: Option<f64>,
    #[serde(default)]
    pub expiry_dates: Vec<String>,
}

/// One strike/expiry row; either side may be absent
#[derive(Debug, Deserialize)]
pub struct StrikeRecord {
    #[serde(rename = "CE")]
    pub call: Option<OptionQuote>,
    #[serde(rename = "PE")]
    pub put: Option<OptionQuote>,
}

/// Quote fields kept from each option record.
///
/// Serialized names match the API so saved CSV headers read the same.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionQuote {
    pub strike_price: f64,
    #[serde(default)]
    pub last_price: f64,
    #[serde(default)]
    pub open_interest: f64,
    #[serde(default, rename = "changeinOpenInterest")]
    pub change_in_open_interest: f64,
    #[serde(default)]
    pub total_traded_volume: f64,
}

/// Calls and puts of one snapshot, each sorted by strike
#[derive(Debug, Clone)]
pub struct OptionChain {
    pub symbol: String,
    pub underlying_value: Option<f64>,
    pub calls: Vec<OptionQuote>,
    pub puts: Vec<OptionQuote>,
}

impl OptionChain {
    pub fn from_response(symbol: &str, response: OptionChainResponse) -> Self {
        let mut calls = Vec::new();
        let mut puts = Vec::new();

        for record in response.records.data {
            if let Some(ce) = record.call {
                calls.push(ce);
            }
            if let Some(pe) = record.put {
                puts.push(pe);
            }
        }

        // Stable sort keeps expiry order within a strike
        calls.sort_by(|a, b| a.strike_price.total_cmp(&b.strike_price));
        puts.sort_by(|a, b| a.strike_price.total_cmp(&b.strike_price));

        OptionChain {
            symbol: symbol.to_string(),
            underlying_value: response.records.underlying_value,
            calls,
            puts,
        }
    }

    /// Write `{symbol}_calls_data.csv` and `{symbol}_puts_data.csv`
    pub fn save_csv(&self, dir: impl AsRef<Path>) -> Result<(PathBuf, PathBuf)> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).context("Failed to create output directory")?;

        let prefix = self.symbol.to_lowercase();
        let calls_path = dir.join(format!("{}_calls_data.csv", prefix));
        let puts_path = dir.join(format!("{}_puts_data.csv", prefix));

        write_quotes(&self.calls, &calls_path)?;
        write_quotes(&self.puts, &puts_path)?;

        Ok((calls_path, puts_path))
    }
}

fn write_quotes(quotes: &[OptionQuote], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for quote in quotes {
        writer.serialize(quote)?;
    }
    writer.flush()?;
    Ok(())
}
