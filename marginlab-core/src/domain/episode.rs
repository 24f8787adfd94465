//! Trade episode — one maximal holding period.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PositionSide;

/// A maximal contiguous run of bars with constant nonzero position side.
///
/// Entry fields are fixed on the opening bar and never change. Exit fields
/// are `None` when the series ends with the episode still open (deferred
/// execution needs the following bar's open, which does not exist).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEpisode {
    pub side: PositionSide,
    /// Date of the opening bar; forward-filled as the episode anchor.
    pub start_date: NaiveDate,
    /// Fill price including slippage.
    pub entry_price: f64,
    /// Whole contracts; zero when the allocation cannot afford one lot.
    pub contract_num: u64,
    pub entry_fee: f64,
    /// Set when the margin check breached on any bar of the episode.
    pub liquidated: bool,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
    pub exit_fee: Option<f64>,
}

impl TradeEpisode {
    /// True when the series ended before the episode could exit.
    pub fn is_open(&self) -> bool {
        self.exit_date.is_none()
    }
}
