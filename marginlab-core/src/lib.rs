//! MarginLab Core — single-instrument futures backtesting engine.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, position sides, trade episodes, account snapshots)
//! - Position resolver: sparse crossover signals → dense held-position series
//! - Equity simulator: position series + OHLC bars + margin config →
//!   per-bar account snapshots and a compounded equity index
//!
//! The simulator is a deterministic single-pass scan. Episode-scoped state
//! (entry price, contract count, cash) is carried in an explicit
//! `EpisodeState` rather than table-wide fill columns, and is reset whenever
//! the position returns to flat.

pub mod domain;
pub mod engine;

pub use domain::{AccountSnapshot, Bar, PositionSide, TradeEpisode};
pub use engine::{
    resolve_positions, simulate, ConfigError, ExecutionMode, SimConfig, SimError, SimResult,
};
