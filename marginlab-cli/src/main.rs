//! MarginLab CLI — run a futures backtest from a TOML config.
//!
//! Commands:
//! - `run` — execute a backtest and optionally write the output table
//! - `check` — validate a config and its data file without simulating

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use marginlab_runner::{export, load_series, run_backtest, RunConfig};

#[derive(Parser)]
#[command(
    name = "marginlab",
    about = "MarginLab CLI — futures margin-account backtesting engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to the TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Write the full output table (CSV) here.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate a config file and its bar data without simulating.
    Check {
        /// Path to the TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run { config, output } => run(&config, output.as_deref()),
        Commands::Check { config } => check(&config),
    }
}

fn run(config_path: &std::path::Path, output: Option<&std::path::Path>) -> Result<()> {
    let config = RunConfig::load(config_path)
        .with_context(|| format!("invalid config {}", config_path.display()))?;
    let result = run_backtest(&config).context("backtest failed")?;

    if let Some(path) = output {
        export::write_csv(path, &result.bars, &result.snapshots)?;
        println!("wrote {} rows to {}", result.bar_count, path.display());
    }

    println!("run id:        {}", result.run_id);
    println!("bars:          {}", result.bar_count);
    println!("episodes:      {}", result.episode_count);
    println!("liquidations:  {}", result.liquidation_count);
    println!("final equity:  {:.6}", result.final_equity_index);
    Ok(())
}

fn check(config_path: &std::path::Path) -> Result<()> {
    let config = RunConfig::load(config_path)
        .with_context(|| format!("invalid config {}", config_path.display()))?;
    let series = load_series(&config.bars_path, config.start_date, config.end_date)
        .with_context(|| format!("invalid data {}", config.bars_path.display()))?;

    println!("config ok: {}", config_path.display());
    println!("data ok:   {} bars from {}", series.bars.len(), config.bars_path.display());
    Ok(())
}
