//! Option chain command - NSE snapshot printed and saved to CSV

use anyhow::Result;
use nifty_strategies::nse::{NseClient, OptionQuote};
use nifty_strategies::Config;
use tracing::info;

use super::runtime;

pub fn run(
    config_path: String,
    symbol: Option<String>,
    rows: Option<usize>,
    output: Option<String>,
) -> Result<()> {
    let config = Config::load_or_default(&config_path)?;
    let symbol = symbol.unwrap_or(config.option_chain.symbol);
    let rows = rows.unwrap_or(config.option_chain.rows);
    let output = output.unwrap_or(config.option_chain.output_dir);

    info!("Fetching option chain for {}", symbol);

    let rt = runtime()?;
    let client = NseClient::new()?;
    let chain = rt.block_on(client.get_option_chain(&symbol))?;
    println!("Data fetched successfully!");

    if let Some(underlying) = chain.underlying_value {
        println!("Underlying {}: {:.2}", chain.symbol, underlying);
    }

    print_quotes("Call Options Data", &chain.calls, rows);
    print_quotes("Put Options Data", &chain.puts, rows);

    let (calls_path, puts_path) = chain.save_csv(&output)?;
    println!("\nSaved {}", calls_path.display());
    println!("Saved {}", puts_path.display());

    info!(
        "Option chain saved: {} calls, {} puts",
        chain.calls.len(),
        chain.puts.len()
    );

    Ok(())
}

fn print_quotes(title: &str, quotes: &[OptionQuote], rows: usize) {
    println!("\n{}:", title);
    println!(
        "{:>10} {:>10} {:>12} {:>12} {:>14}",
        "Strike", "LTP", "OI", "Chg OI", "Volume"
    );
    println!("{}", "-".repeat(62));
    for q in quotes.iter().take(rows) {
        println!(
            "{:>10.2} {:>10.2} {:>12.0} {:>12.0} {:>14.0}",
            q.strike_price,
            q.last_price,
            q.open_interest,
            q.change_in_open_interest,
            q.total_traded_volume
        );
    }
}
