//! Download command - fetch intraday candles from Yahoo Finance

use anyhow::Result;
use nifty_strategies::data::save_csv;
use nifty_strategies::yahoo::{download_filename, YahooClient, YahooError};
use nifty_strategies::Config;
use std::path::Path;
use tracing::info;

use super::runtime;

pub fn run(
    config_path: String,
    ticker: Option<String>,
    period: Option<String>,
    interval: Option<String>,
    output: Option<String>,
) -> Result<()> {
    let config = Config::load_or_default(&config_path)?;
    let ticker = ticker.unwrap_or(config.data.ticker);
    let period = period.unwrap_or(config.data.period);
    let interval = interval.unwrap_or(config.data.interval);
    let output = output.unwrap_or(config.data.data_dir);

    info!("Starting data download from Yahoo Finance");

    println!("\n{}", "=".repeat(60));
    println!("DOWNLOADING INTRADAY DATA");
    println!("{}", "=".repeat(60));
    println!("  Ticker:   {}", ticker);
    println!("  Period:   {}", period);
    println!("  Interval: {}", interval);
    println!("  Output:   {}", output);
    println!("{}\n", "=".repeat(60));

    let rt = runtime()?;
    let client = YahooClient::new()?;

    let bars = match rt.block_on(client.get_chart(&ticker, &period, &interval)) {
        Ok(bars) => bars,
        Err(YahooError::NoData(what)) => {
            println!("No data found for {}. Check the ticker and period.", what);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let filename = download_filename(
        &ticker,
        &period,
        &interval,
        chrono::Local::now().naive_local(),
    );
    let filepath = Path::new(&output).join(filename);
    save_csv(&bars, &filepath)?;

    println!("\n{}", "=".repeat(60));
    println!("DOWNLOAD COMPLETE");
    println!("{}", "=".repeat(60));
    println!("  Bars:  {}", bars.len());
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        println!("  Range: {} to {}", first.timestamp, last.timestamp);
    }
    println!("  Saved: {}", filepath.display());
    println!("{}", "=".repeat(60));

    Ok(())
}
