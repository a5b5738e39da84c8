//! Optimize command - MA crossover grid search with progress tracking

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use nifty_strategies::data::{self, filter_bars_by_date, parse_date, parse_end_date};
use nifty_strategies::optimizer::Optimizer;
use nifty_strategies::strategies::ma_crossover::{format_params, GridParams};
use nifty_strategies::Config;
use tracing::info;

use super::input_path;

#[allow(clippy::too_many_arguments)]
pub fn run(
    config_path: String,
    file: String,
    sort_by: String,
    top: usize,
    quick: bool,
    sequential: bool,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    let config = Config::load_or_default(&config_path)?;
    info!("Loaded configuration from: {}", config_path);

    let path = input_path(&file, &config);
    let bars = data::load_csv(&path)?;
    let start = start.as_deref().map(parse_date).transpose()?;
    let end = end.as_deref().map(parse_end_date).transpose()?;
    let bars = filter_bars_by_date(bars, start, end);

    let grid = if quick {
        GridParams::quick()
    } else {
        GridParams::from_config(&config.grid)
    };
    let allow_short = config.ma_crossover()?.allow_short;
    let combos = grid.combinations(allow_short);

    println!("\n{}", "=".repeat(60));
    println!("MA CROSSOVER OPTIMIZATION");
    println!("{}", "=".repeat(60));
    println!("  Data:          {} ({} bars)", path.display(), bars.len());
    println!("  Short periods: {:?}", grid.short_periods);
    println!("  Long periods:  {:?}", grid.long_periods);
    println!("  Parameters:    {} combinations", combos.len());
    println!(
        "  Mode:          {}",
        if sequential { "sequential" } else { "parallel" }
    );
    println!("{}\n", "=".repeat(60));

    if combos.is_empty() {
        println!("No valid combinations (short period must be below long period).");
        return Ok(());
    }

    let optimizer = Optimizer::new(config.clone());

    let mut results = if sequential {
        optimizer.optimize_sequential(&bars, &combos)
    } else {
        let pb = ProgressBar::new(combos.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("⚡ {percent:>3}%|{bar:40}| {pos}/{len} [{elapsed}<{eta}, {per_sec}]")?
                .progress_chars("█░ "),
        );
        pb.tick();
        let results = optimizer.optimize_with_progress(&bars, &combos, &pb);
        pb.finish();
        println!();
        results
    };

    let Some(best) = Optimizer::best(&results).cloned() else {
        info!("No results produced.");
        return Ok(());
    };

    println!("\n{}", "=".repeat(60));
    println!("BEST COMBINATION");
    println!("{}", "=".repeat(60));
    println!("Parameters:         {}", format_params(&best.params));
    println!("Net Profit:         ₹{:.2}", best.net_profit);
    println!("Total Trades:       {}", best.total_trades);
    println!("Successful Trades:  {}", best.successful_trades);
    println!("Failed Trades:      {}", best.failed_trades);
    if best.total_trades == 0 {
        println!("Success Rate:       No trades taken");
    } else {
        println!("Success Rate:       {:.2}%", best.success_rate * 100.0);
    }
    println!("{}", "=".repeat(60));

    Optimizer::sort_results(&mut results, &sort_by);
    info!("Total results: {}, sorted by: {}", results.len(), sort_by);

    let display_count = top.min(results.len());
    println!("\n{}", "=".repeat(80));
    println!(
        "TOP {} OPTIMIZATION RESULTS (sorted by {})",
        display_count, sort_by
    );
    println!("{}", "=".repeat(80));
    println!(
        "{:<4} {:>12} {:>7} {:>6} {:>6} {:>8} | Parameters",
        "Rank", "NetProfit", "Trades", "Wins", "Losses", "WinR%"
    );
    println!("{}", "-".repeat(80));

    for (i, result) in results.iter().take(top).enumerate() {
        println!(
            "{:<4} {:>12.2} {:>7} {:>6} {:>6} {:>8.2} | {}",
            i + 1,
            result.net_profit,
            result.total_trades,
            result.successful_trades,
            result.failed_trades,
            result.success_rate * 100.0,
            format_params(&result.params)
        );
    }
    println!("{}", "=".repeat(80));

    info!("Optimization completed successfully");

    Ok(())
}
