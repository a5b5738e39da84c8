pub mod backtest;
pub mod breakout;
pub mod download;
pub mod optimize;
pub mod option_chain;
pub mod watch;

use std::path::{Path, PathBuf};

use nifty_strategies::data::resolve_input_path;
use nifty_strategies::Config;

/// Locate an input CSV: as given, in the parent directory, then in the data directory
pub fn input_path(name: &str, config: &Config) -> PathBuf {
    let path = resolve_input_path(name);
    if path.is_file() {
        return path;
    }

    let in_data_dir = Path::new(&config.data.data_dir).join(name);
    if in_data_dir.is_file() {
        return in_data_dir;
    }

    path
}

/// Build the runtime network commands drive their client calls on
pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    use anyhow::Context;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")
}
