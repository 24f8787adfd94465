//! Equity simulator — dense position series to per-bar account snapshots.
//!
//! A single left-to-right scan over the bars. Episode-anchored state (entry
//! price, contract count, cash, liquidated flag) lives in an explicit
//! `EpisodeState` that resets whenever the position returns to flat; each
//! bar's figures are closed-form given that state and the previous bar's
//! net value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AccountSnapshot, Bar, PositionSide, TradeEpisode};
use crate::engine::config::{ConfigError, ExecutionMode, SimConfig};

/// Output of one simulation run: a snapshot per bar plus the immutable
/// episode records extracted along the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimResult {
    pub snapshots: Vec<AccountSnapshot>,
    pub episodes: Vec<TradeEpisode>,
}

impl SimResult {
    /// Equity index after the last bar; 1.0 for an empty series.
    pub fn final_equity_index(&self) -> f64 {
        self.snapshots.last().map_or(1.0, |s| s.equity_index)
    }

    pub fn liquidation_count(&self) -> usize {
        self.episodes.iter().filter(|e| e.liquidated).count()
    }
}

/// Errors that abort a run before any snapshot is produced.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("bar/position length mismatch: {bars} bars vs {positions} position entries")]
    LengthMismatch { bars: usize, positions: usize },
}

/// Episode-anchored state carried across the bars of one holding period.
#[derive(Debug, Clone)]
struct OpenEpisode {
    side: PositionSide,
    start_date: NaiveDate,
    entry_price: f64,
    contract_num: u64,
    entry_fee: f64,
    cash: f64,
    liquidated: bool,
}

#[derive(Debug, Clone)]
enum EpisodeState {
    Flat,
    Open(OpenEpisode),
}

/// Simulate the account over `bars` holding `positions`, one snapshot per bar.
///
/// `positions` is the already-resolved dense side series (see
/// [`crate::engine::resolve_positions`]); the execution mode in `cfg` only
/// selects fill pricing here. Deferred mode fills entries at the opening
/// bar's own open (the resolver already deferred the signal) and exits at
/// the following bar's open; immediate mode fills both at the signal bar's
/// close. An episode still open on the final bar of a deferred run has no
/// following open to exit into: it stays mark-to-market and its episode
/// record keeps `exit_date = None`.
pub fn simulate(
    bars: &[Bar],
    positions: &[PositionSide],
    cfg: &SimConfig,
) -> Result<SimResult, SimError> {
    cfg.validate()?;
    if bars.len() != positions.len() {
        return Err(SimError::LengthMismatch {
            bars: bars.len(),
            positions: positions.len(),
        });
    }

    let mult = cfg.contract_multiplier;
    let mut snapshots = Vec::with_capacity(bars.len());
    let mut episodes = Vec::new();
    let mut state = EpisodeState::Flat;
    let mut prev_side = PositionSide::Flat;
    let mut prev_net: Option<f64> = None;
    let mut equity_index = 1.0;

    for (t, (bar, &side)) in bars.iter().zip(positions).enumerate() {
        if side.is_flat() {
            state = EpisodeState::Flat;
            prev_side = side;
            prev_net = None;
            snapshots.push(AccountSnapshot::flat(bar.date, equity_index));
            continue;
        }

        let opening = side != prev_side;
        if opening {
            state = EpisodeState::Open(open_episode(bar, side, cfg));
        }
        let closing = t + 1 >= positions.len() || positions[t + 1] != side;

        // A nonzero side always has an open episode: either this bar opened
        // one above, or the previous bar carried it over.
        let EpisodeState::Open(mut ep) = std::mem::replace(&mut state, EpisodeState::Flat)
        else {
            prev_side = side;
            continue;
        };

        let contracts = ep.contract_num as f64;
        let sign = side.sign();

        // Mark to market at the close.
        let mut unrealized = mult * contracts * (bar.close - ep.entry_price) * sign;
        let mut net_value = ep.cash + unrealized;

        // Worst case inside the bar: adverse extreme against the side.
        let price_floor = if side == PositionSide::Long {
            bar.low
        } else {
            bar.high
        };
        let profit_floor = mult * contracts * (price_floor - ep.entry_price) * sign;
        let mut net_value_floor = ep.cash + profit_floor;
        let notional_floor = mult * contracts * price_floor;
        let margin_ratio = (notional_floor > 0.0).then(|| net_value_floor / notional_floor);
        if let Some(ratio) = margin_ratio {
            if ratio <= cfg.min_margin_ratio + cfg.commission_rate {
                ep.liquidated = true;
            }
        }

        // Exit fill on the closing bar.
        let mut exit: Option<(NaiveDate, f64, f64)> = None;
        if closing {
            let reference = match cfg.execution_mode {
                ExecutionMode::Deferred => bars.get(t + 1).map(|next| (next.date, next.open)),
                ExecutionMode::Immediate => Some((bar.date, bar.close)),
            };
            if let Some((exit_date, exit_reference)) = reference {
                let exit_price = exit_reference - cfg.slippage * sign;
                let exit_fee = exit_price * mult * contracts * cfg.commission_rate;
                unrealized = mult * contracts * (exit_price - ep.entry_price) * sign;
                net_value = ep.cash + unrealized - exit_fee;
                if net_value < 0.0 {
                    // Gap through the margin level at the exit fill.
                    ep.liquidated = true;
                }
                exit = Some((exit_date, exit_price, exit_fee));
            }
        }

        if ep.liquidated {
            net_value = 0.0;
        }
        // Keep the floor a true lower envelope of the reported value.
        net_value_floor = net_value_floor.min(net_value);

        let bar_return = if opening && (t == 0 || prev_side.is_flat()) {
            // First bar of the series, or entry out of flat: the baseline
            // is the idle account at initial cash.
            net_value / cfg.initial_cash - 1.0
        } else {
            pct_change(net_value, prev_net)
        };
        equity_index *= 1.0 + bar_return;

        snapshots.push(AccountSnapshot {
            date: bar.date,
            position_side: side,
            episode_start_date: Some(ep.start_date),
            contract_num: Some(ep.contract_num),
            entry_price: Some(ep.entry_price),
            cash: Some(ep.cash),
            unrealized_profit: Some(unrealized),
            net_value: Some(net_value),
            net_value_floor: Some(net_value_floor),
            margin_ratio,
            is_liquidated: ep.liquidated,
            bar_return,
            equity_index,
        });

        prev_net = Some(net_value);
        prev_side = side;

        if closing {
            episodes.push(TradeEpisode {
                side: ep.side,
                start_date: ep.start_date,
                entry_price: ep.entry_price,
                contract_num: ep.contract_num,
                entry_fee: ep.entry_fee,
                liquidated: ep.liquidated,
                exit_date: exit.map(|(d, _, _)| d),
                exit_price: exit.map(|(_, p, _)| p),
                exit_fee: exit.map(|(_, _, f)| f),
            });
        } else {
            state = EpisodeState::Open(ep);
        }
    }

    Ok(SimResult {
        snapshots,
        episodes,
    })
}

/// Fix entry price, size, and cash on the opening bar.
fn open_episode(bar: &Bar, side: PositionSide, cfg: &SimConfig) -> OpenEpisode {
    let reference = match cfg.execution_mode {
        ExecutionMode::Deferred => bar.open,
        ExecutionMode::Immediate => bar.close,
    };
    let entry_price = reference + cfg.slippage * side.sign();

    // Whole contracts only; under-allocation beats over-leverage. A
    // non-positive denominator cannot afford any lot.
    let margin_per_contract = cfg.contract_multiplier * entry_price * cfg.entry_margin_ratio;
    let contract_num = if margin_per_contract > 0.0 {
        (cfg.invest_cash() / margin_per_contract).floor() as u64
    } else {
        0
    };

    let entry_fee =
        entry_price * cfg.contract_multiplier * contract_num as f64 * cfg.commission_rate;

    OpenEpisode {
        side,
        start_date: bar.date,
        entry_price,
        contract_num,
        entry_fee,
        cash: cfg.initial_cash - entry_fee,
        liquidated: false,
    }
}

/// Return of `net_value` against the previous bar. Undefined ratios (no
/// previous value, or a zeroed account after liquidation) resolve to 0.
fn pct_change(net_value: f64, prev: Option<f64>) -> f64 {
    match prev {
        Some(prev) if prev != 0.0 => net_value / prev - 1.0,
        _ => 0.0,
    }
}
