//! Position resolver — sparse signals to a dense held-position series.

use crate::domain::PositionSide;
use crate::engine::config::ExecutionMode;

/// Resolve a sparse per-bar signal into the position actually held each bar.
///
/// Signals are forward-filled left to right; bars before the first signal
/// resolve to flat. In [`ExecutionMode::Deferred`] the filled series is then
/// shifted by one bar — a signal observed on bar *t* is held from bar *t+1*,
/// and bar 0 is always flat. [`ExecutionMode::Immediate`] applies no shift.
///
/// Pure total function: output has the same length and order as the input.
pub fn resolve_positions(
    signals: &[Option<PositionSide>],
    mode: ExecutionMode,
) -> Vec<PositionSide> {
    let mut held = PositionSide::Flat;
    let mut filled = Vec::with_capacity(signals.len());
    for signal in signals {
        if let Some(side) = signal {
            held = *side;
        }
        filled.push(held);
    }

    match mode {
        ExecutionMode::Immediate => filled,
        ExecutionMode::Deferred => {
            if !filled.is_empty() {
                filled.pop();
                filled.insert(0, PositionSide::Flat);
            }
            filled
        }
    }
}
