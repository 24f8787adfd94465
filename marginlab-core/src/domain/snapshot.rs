//! Per-bar account snapshot — one output row of the simulator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PositionSide;

/// Account state marked to one bar's close.
///
/// Episode-scoped fields (`episode_start_date` through `margin_ratio`) are
/// `None` on flat bars; `cash`, `contract_num`, and `entry_price` are
/// constant across all bars of one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub date: NaiveDate,
    pub position_side: PositionSide,
    pub episode_start_date: Option<NaiveDate>,
    pub contract_num: Option<u64>,
    pub entry_price: Option<f64>,
    pub cash: Option<f64>,
    pub unrealized_profit: Option<f64>,
    /// `cash + unrealized_profit`, with exit fee subtracted on the exit bar
    /// and forced to 0 from the first liquidated bar onward.
    pub net_value: Option<f64>,
    /// Worst-case net value using the bar's adverse intrabar extreme.
    /// Never exceeds `net_value`.
    pub net_value_floor: Option<f64>,
    /// Floor-case net value over floor-case notional exposure; `None` for
    /// zero-size episodes (no exposure to margin).
    pub margin_ratio: Option<f64>,
    pub is_liquidated: bool,
    pub bar_return: f64,
    /// Running product of `1 + bar_return`, base 1.0.
    pub equity_index: f64,
}

impl AccountSnapshot {
    /// A flat bar: no episode state, zero return.
    pub(crate) fn flat(date: NaiveDate, equity_index: f64) -> Self {
        Self {
            date,
            position_side: PositionSide::Flat,
            episode_start_date: None,
            contract_num: None,
            entry_price: None,
            cash: None,
            unrealized_profit: None,
            net_value: None,
            net_value_floor: None,
            margin_ratio: None,
            is_liquidated: false,
            bar_return: 0.0,
            equity_index,
        }
    }
}
