//! Breakout command - opening-range scan over one or more CSV files

use anyhow::{Context, Result};
use nifty_strategies::data::load_csv;
use nifty_strategies::strategies::opening_range::{
    classify_many, parse_time_of_day, BreakoutEvent, OpeningRangeConfig, OpeningRangeReport,
    Outcome,
};
use nifty_strategies::{Bar, Config};
use tracing::info;

use super::input_path;

pub fn run(
    config_path: String,
    files: Vec<String>,
    window_start: Option<String>,
    window_end: Option<String>,
    json: Option<String>,
) -> Result<()> {
    let mut config = Config::load_or_default(&config_path)?;

    if let Some(start) = window_start {
        config.opening_range.window_start =
            parse_time_of_day(&start).context(format!("Invalid window start: {}", start))?;
    }
    if let Some(end) = window_end {
        config.opening_range.window_end =
            parse_time_of_day(&end).context(format!("Invalid window end: {}", end))?;
    }
    config.opening_range.validate()?;

    let window = &config.opening_range;
    info!(
        "Opening window {} - {}",
        window.window_start.format("%H:%M"),
        window.window_end.format("%H:%M")
    );

    // Any unreadable file ends the run before a report is produced
    let inputs: Vec<(String, Vec<Bar>)> = files
        .iter()
        .map(|name| {
            let path = input_path(name, &config);
            load_csv(&path).map(|bars| (name.clone(), bars))
        })
        .collect::<Result<_>>()?;

    let bar_sets: Vec<&[Bar]> = inputs.iter().map(|(_, bars)| bars.as_slice()).collect();
    let reports = classify_many(&bar_sets, window);

    for ((name, _), report) in inputs.iter().zip(&reports) {
        print_report(name, window, report);
    }

    if let Some(json_path) = json {
        let contents = if reports.len() == 1 {
            serde_json::to_string_pretty(&reports[0])?
        } else {
            serde_json::to_string_pretty(&reports)?
        };
        std::fs::write(&json_path, contents)
            .context(format!("Failed to write report to {}", json_path))?;
        println!("Report written to {}", json_path);
    }

    info!("Breakout scan completed for {} file(s)", reports.len());

    Ok(())
}

fn print_events(title: &str, events: &[BreakoutEvent]) {
    println!("\n{} ({}):", title, events.len());
    for event in events {
        println!(
            "  {}  high_ref {:>10.2}  low_ref {:>10.2}",
            event.trigger_time, event.reference.high, event.reference.low
        );
    }
}

fn print_outcomes(title: &str, outcomes: &[Outcome]) {
    println!("\n{} ({}):", title, outcomes.len());
    for outcome in outcomes {
        println!("  {}  {}", outcome.outcome_time, outcome.direction);
    }
}

fn print_report(name: &str, window: &OpeningRangeConfig, report: &OpeningRangeReport) {
    println!("\n{}", "=".repeat(60));
    println!("OPENING RANGE BREAKOUT: {}", name);
    println!("{}", "=".repeat(60));
    println!(
        "Window: {} - {}",
        window.window_start.format("%H:%M"),
        window.window_end.format("%H:%M")
    );

    print_events("Breakouts", &report.breakouts);
    print_events("Breakdowns", &report.breakdowns);
    print_outcomes("Successful Trades", &report.successful_trades);
    print_outcomes("Failed Trades", &report.failed_trades);

    println!("\n{}", "-".repeat(60));
    println!("Total Breakouts:    {}", report.total_breakouts());
    println!("Total Breakdowns:   {}", report.total_breakdowns());
    println!("Successful Trades:  {}", report.total_successful());
    println!("Failed Trades:      {}", report.total_failed());
    match report.success_rate() {
        Some(rate) => println!("Success Rate:       {:.2}%", rate),
        None => println!("Success Rate:       N/A"),
    }
    println!("Number of Days:     {}", report.total_days);
    println!("{}", "=".repeat(60));
}
