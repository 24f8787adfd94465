//! Position side — the per-bar directional state.

use serde::{Deserialize, Serialize};

/// Direction held on a bar: short (-1), flat (0), or long (+1).
///
/// Raw strategy signals are `Option<PositionSide>` — present only on the
/// bars where a crossover fires. The resolver forward-fills them into a
/// dense `PositionSide` series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionSide {
    Short,
    Flat,
    Long,
}

impl PositionSide {
    /// Signed direction as a multiplier: -1.0, 0.0, or +1.0.
    pub fn sign(self) -> f64 {
        match self {
            PositionSide::Short => -1.0,
            PositionSide::Flat => 0.0,
            PositionSide::Long => 1.0,
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            PositionSide::Short => -1,
            PositionSide::Flat => 0,
            PositionSide::Long => 1,
        }
    }

    /// Parse from the numeric encoding used in signal/position columns.
    pub fn from_i8(value: i8) -> Option<Self> {
        match value {
            -1 => Some(PositionSide::Short),
            0 => Some(PositionSide::Flat),
            1 => Some(PositionSide::Long),
            _ => None,
        }
    }

    pub fn is_flat(self) -> bool {
        self == PositionSide::Flat
    }
}
