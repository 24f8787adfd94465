//! MarginLab Runner — orchestration around `marginlab-core`.
//!
//! This crate builds on the engine to provide:
//! - TOML run-config loading with fail-fast validation and a
//!   content-addressable run id
//! - CSV bar/signal ingestion with per-row diagnostics
//! - Output-table CSV export
//! - The single-backtest runner tying it all together

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{ConfigFileError, RunConfig, RunId};
pub use data_loader::{load_series, LoadError, LoadedSeries, PositionColumn};
pub use export::{export_csv, write_csv};
pub use runner::{run_backtest, BacktestResult, RunError};
