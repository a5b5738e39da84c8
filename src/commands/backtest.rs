//! Backtest command implementation

use anyhow::Result;
use nifty_strategies::data::{self, filter_bars_by_date, parse_date, parse_end_date};
use nifty_strategies::strategies::{self, ma_crossover};
use nifty_strategies::{backtest::Backtester, Config};
use tracing::{debug, info};

use super::input_path;

#[allow(clippy::too_many_arguments)]
pub fn run(
    config_path: String,
    file: String,
    short: Option<usize>,
    long: Option<usize>,
    long_only: bool,
    capital_override: Option<f64>,
    lot_size_override: Option<f64>,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    info!("Starting backtest");

    let mut config = Config::load_or_default(&config_path)?;
    info!("Loaded configuration from: {}", config_path);

    // Apply overrides
    let mut params = config.ma_crossover()?;
    if let Some(short) = short {
        params.short_period = short;
    }
    if let Some(long) = long {
        params.long_period = long;
    }
    if long_only {
        params.allow_short = false;
    }
    config.set_ma_crossover(&params);

    if let Some(capital) = capital_override {
        info!("Overriding initial capital to: ₹{:.2}", capital);
        config.backtest.initial_capital = capital;
    }
    if let Some(lot_size) = lot_size_override {
        info!("Overriding lot size to: {}", lot_size);
        config.backtest.lot_size = lot_size;
    }
    config.validate()?;

    let path = input_path(&file, &config);
    info!("Loading data from: {}", path.display());
    let bars = data::load_csv(&path)?;

    let start = start.as_deref().map(parse_date).transpose()?;
    let end = end.as_deref().map(parse_end_date).transpose()?;
    let bars = filter_bars_by_date(bars, start, end);
    debug!("{} bars after date filter", bars.len());

    info!("Creating strategy: {}", config.strategy_name);
    let strategy = strategies::create_strategy(&config)?;

    let mut backtester = Backtester::new(config.clone(), strategy);

    info!("Running backtest...");
    let result = backtester.run(&bars);
    let metrics = &result.metrics;

    // Print results
    println!("\n{}", "=".repeat(60));
    println!("BACKTEST RESULTS");
    println!("{}", "=".repeat(60));
    println!("Parameters:         {}", ma_crossover::format_params(&params));
    println!("Lot Size:           {}", config.backtest.lot_size);
    println!("Starting Value:     ₹{:.2}", metrics.starting_value);
    println!("Ending Value:       ₹{:.2}", metrics.ending_value);
    println!("{}", "-".repeat(60));
    println!("Total Trades:       {}", metrics.trade_count);
    println!("Successful Trades:  {}", metrics.successful_trades);
    println!("Failed Trades:      {}", metrics.failed_trades);
    println!("Total Gain:         ₹{:.2}", metrics.total_gain);
    println!("Total Loss:         ₹{:.2}", metrics.total_loss);
    println!("Net Profit:         ₹{:.2}", metrics.net_profit);
    match metrics.success_rate() {
        Some(rate) => println!("Success Rate:       {:.2}%", rate * 100.0),
        None => println!("Success Rate:       No trades taken"),
    }
    if let Some(pos) = &result.open_position {
        println!(
            "Open Position:      {} @ {:.2} since {}",
            pos.side, pos.entry_price, pos.entry_time
        );
    }
    println!("{}", "=".repeat(60));

    info!("Backtest completed successfully");

    Ok(())
}
