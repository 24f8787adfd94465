//! Single-backtest runner: load → resolve → simulate.

use marginlab_core::{resolve_positions, simulate, SimError};
use marginlab_core::domain::{AccountSnapshot, Bar, TradeEpisode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigFileError, RunConfig, RunId};
use crate::data_loader::{load_series, LoadError, PositionColumn};

/// Complete result of one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub run_id: RunId,
    pub bar_count: usize,
    pub episode_count: usize,
    pub liquidation_count: usize,
    pub final_equity_index: f64,
    pub bars: Vec<Bar>,
    pub snapshots: Vec<AccountSnapshot>,
    pub episodes: Vec<TradeEpisode>,
}

/// Errors from a full run. Each layer keeps its own diagnostic; nothing is
/// emitted on failure.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigFileError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Sim(#[from] SimError),
}

/// Run one backtest from a validated configuration.
pub fn run_backtest(config: &RunConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;

    let series = load_series(&config.bars_path, config.start_date, config.end_date)?;
    let positions = match series.positions {
        PositionColumn::Resolved(sides) => sides,
        PositionColumn::Signals(signals) => {
            resolve_positions(&signals, config.simulation.execution_mode)
        }
    };

    let result = simulate(&series.bars, &positions, &config.simulation)?;
    Ok(BacktestResult {
        run_id: config.run_id(),
        bar_count: series.bars.len(),
        episode_count: result.episodes.len(),
        liquidation_count: result.liquidation_count(),
        final_equity_index: result.final_equity_index(),
        bars: series.bars,
        snapshots: result.snapshots,
        episodes: result.episodes,
    })
}
