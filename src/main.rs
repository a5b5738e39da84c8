//! Nifty intraday strategies - main entry point
//!
//! This binary provides six subcommands:
//! - breakout: Opening-range breakout scan over CSV data
//! - backtest: Run the MA crossover backtest
//! - optimize: Grid search over MA periods
//! - option-chain: NSE option chain snapshot
//! - download: Download intraday candles from Yahoo Finance
//! - watch: Poll the latest candle of a ticker

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

const DEFAULT_CONFIG: &str = "configs/nifty_5m.json";

#[derive(Parser, Debug)]
#[command(name = "nifty-strategies")]
#[command(about = "Intraday index strategies: opening-range scan, MA crossover backtests, market data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify opening-range breakouts and their follow-through
    Breakout {
        /// CSV files with 5-minute bars
        #[arg(required = true)]
        files: Vec<String>,

        /// Path to configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: String,

        /// Opening window start (HH:MM)
        #[arg(long)]
        window_start: Option<String>,

        /// Opening window end (HH:MM)
        #[arg(long)]
        window_end: Option<String>,

        /// Write the report as JSON to this path
        #[arg(long)]
        json: Option<String>,
    },

    /// Run MA crossover backtest
    Backtest {
        /// CSV file with bars
        file: String,

        /// Path to configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: String,

        /// Short SMA period (overrides config file)
        #[arg(long)]
        short: Option<usize>,

        /// Long SMA period (overrides config file)
        #[arg(long)]
        long: Option<usize>,

        /// Disable short entries
        #[arg(long)]
        long_only: bool,

        /// Initial capital
        #[arg(long)]
        capital: Option<f64>,

        /// Lot size
        #[arg(long)]
        lot_size: Option<f64>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },

    /// Optimize MA periods (grid search from JSON config)
    Optimize {
        /// CSV file with bars
        file: String,

        /// Path to configuration file with grid section
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: String,

        /// Sort results by metric (profit, win_rate, trades)
        #[arg(long, default_value = "profit")]
        sort_by: String,

        /// Number of top results to show
        #[arg(short, long, default_value = "10")]
        top: usize,

        /// Use the small built-in grid
        #[arg(long)]
        quick: bool,

        /// Run sequentially instead of parallel
        #[arg(long)]
        sequential: bool,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },

    /// Fetch the NSE option chain snapshot
    OptionChain {
        /// Path to configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: String,

        /// Index symbol (e.g., NIFTY, BANKNIFTY)
        #[arg(short, long)]
        symbol: Option<String>,

        /// Rows per side to print
        #[arg(short, long)]
        rows: Option<usize>,

        /// Output directory for CSV files
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Download intraday candles from Yahoo Finance
    Download {
        /// Path to configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: String,

        /// Ticker (e.g., ^NSEBANK, ^NSEI)
        #[arg(long)]
        ticker: Option<String>,

        /// Lookback period (1d, 5d, 1mo, 3mo, 6mo, 1y)
        #[arg(short, long)]
        period: Option<String>,

        /// Candle interval (1m, 5m, 15m, 30m, 1h, 1d)
        #[arg(short, long)]
        interval: Option<String>,

        /// Output directory
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Log the live price and latest candle of a ticker
    Watch {
        /// Path to configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: String,

        /// Ticker (e.g., BTC-USD, ^NSEI)
        #[arg(long)]
        ticker: Option<String>,

        /// Poll interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },
}

fn setup_logging(verbose: bool, command_name: &str, file_only: bool) -> Result<()> {
    // Create logs directory
    std::fs::create_dir_all("logs")?;

    // Create log file with naming pattern: {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    // Set log level - filter out noisy external crates
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn,cookie_store=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    if file_only {
        // Optimizer: keep console clean for the progress bar
        let file_appender = tracing_appender::rolling::never("logs", &log_filename);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .init();
    } else {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(true);

        // File layer - same format but without ANSI colors
        let file_appender = tracing_appender::rolling::never("logs", &log_filename);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        info!("Logging initialized");
        info!("Log file: {}", log_path.display());
    }

    Ok(())
}

/// Log file prefix per command, and whether console logging is suppressed
fn log_target(command: &Commands) -> (&'static str, bool) {
    match command {
        Commands::Breakout { .. } => ("breakout", false),
        Commands::Backtest { .. } => ("backtest", false),
        Commands::Optimize { .. } => ("optimize", true),
        Commands::OptionChain { .. } => ("option_chain", false),
        Commands::Download { .. } => ("download", false),
        Commands::Watch { .. } => ("watch", false),
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let (command_name, file_only) = log_target(&cli.command);

    setup_logging(cli.verbose, command_name, file_only)?;

    match cli.command {
        Commands::Breakout {
            files,
            config,
            window_start,
            window_end,
            json,
        } => commands::breakout::run(config, files, window_start, window_end, json),

        Commands::Backtest {
            file,
            config,
            short,
            long,
            long_only,
            capital,
            lot_size,
            start,
            end,
        } => commands::backtest::run(
            config, file, short, long, long_only, capital, lot_size, start, end,
        ),

        Commands::Optimize {
            file,
            config,
            sort_by,
            top,
            quick,
            sequential,
            start,
            end,
        } => commands::optimize::run(config, file, sort_by, top, quick, sequential, start, end),

        Commands::OptionChain {
            config,
            symbol,
            rows,
            output,
        } => commands::option_chain::run(config, symbol, rows, output),

        Commands::Download {
            config,
            ticker,
            period,
            interval,
            output,
        } => commands::download::run(config, ticker, period, interval, output),

        Commands::Watch {
            config,
            ticker,
            interval,
        } => commands::watch::run(config, ticker, interval),
    }
}
