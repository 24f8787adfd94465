//! Simulation configuration and fail-fast validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// When a signal observed on bar *t* takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionMode {
    /// Signal takes effect on bar *t+1*; entries fill at that bar's open,
    /// exits at the open of the bar after the run ends.
    Deferred,
    /// Signal takes effect on bar *t*; entries and exits fill at the
    /// signal bar's own close.
    Immediate,
}

/// Capital, cost, and margin parameters for one simulation run.
///
/// All fields are required; there are no implicit defaults. `validate`
/// rejects out-of-range values before any simulation state is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub initial_cash: f64,
    /// Fraction of initial cash allocated to each episode, in (0, 1].
    pub invest_ratio: f64,
    /// Execution price deviation per fill, in price units, signed by trade
    /// direction at the call site.
    pub slippage: f64,
    /// Commission charged on notional at entry and exit.
    pub commission_rate: f64,
    /// Margin fraction posted at entry, in (0, 1].
    pub entry_margin_ratio: f64,
    /// Exchange minimum margin fraction; breaching it liquidates.
    pub min_margin_ratio: f64,
    /// Units of the underlying per contract.
    pub contract_multiplier: f64,
    pub execution_mode: ExecutionMode,
}

impl SimConfig {
    /// Cash allocated to each episode before flooring into contracts.
    pub fn invest_cash(&self) -> f64 {
        self.initial_cash * self.invest_ratio
    }

    /// Range-check every field. The negated comparisons also reject NaN.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_cash > 0.0) {
            return Err(ConfigError::InitialCash(self.initial_cash));
        }
        if !(self.invest_ratio > 0.0 && self.invest_ratio <= 1.0) {
            return Err(ConfigError::InvestRatio(self.invest_ratio));
        }
        if !(self.slippage >= 0.0) {
            return Err(ConfigError::Slippage(self.slippage));
        }
        if !(self.commission_rate >= 0.0) {
            return Err(ConfigError::CommissionRate(self.commission_rate));
        }
        if !(self.entry_margin_ratio > 0.0 && self.entry_margin_ratio <= 1.0) {
            return Err(ConfigError::EntryMarginRatio(self.entry_margin_ratio));
        }
        if !(self.min_margin_ratio > 0.0 && self.min_margin_ratio <= 1.0) {
            return Err(ConfigError::MinMarginRatio(self.min_margin_ratio));
        }
        if !(self.contract_multiplier > 0.0) {
            return Err(ConfigError::ContractMultiplier(self.contract_multiplier));
        }
        Ok(())
    }
}

/// A configuration field out of range. Named per field so the diagnostic
/// identifies exactly what to fix.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("initial_cash must be positive, got {0}")]
    InitialCash(f64),
    #[error("invest_ratio must be in (0, 1], got {0}")]
    InvestRatio(f64),
    #[error("slippage must be non-negative, got {0}")]
    Slippage(f64),
    #[error("commission_rate must be non-negative, got {0}")]
    CommissionRate(f64),
    #[error("entry_margin_ratio must be in (0, 1], got {0}")]
    EntryMarginRatio(f64),
    #[error("min_margin_ratio must be in (0, 1], got {0}")]
    MinMarginRatio(f64),
    #[error("contract_multiplier must be positive, got {0}")]
    ContractMultiplier(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SimConfig {
        SimConfig {
            initial_cash: 100_000.0,
            invest_ratio: 1.0,
            slippage: 1.0,
            commission_rate: 0.0001,
            entry_margin_ratio: 0.1,
            min_margin_ratio: 0.08,
            contract_multiplier: 10.0,
            execution_mode: ExecutionMode::Deferred,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_initial_cash() {
        let mut cfg = valid_config();
        cfg.initial_cash = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::InitialCash(0.0)));
    }

    #[test]
    fn rejects_invest_ratio_above_one() {
        let mut cfg = valid_config();
        cfg.invest_ratio = 1.5;
        assert_eq!(cfg.validate(), Err(ConfigError::InvestRatio(1.5)));
    }

    #[test]
    fn rejects_negative_slippage() {
        let mut cfg = valid_config();
        cfg.slippage = -0.5;
        assert_eq!(cfg.validate(), Err(ConfigError::Slippage(-0.5)));
    }

    #[test]
    fn rejects_nan_fields() {
        let mut cfg = valid_config();
        cfg.commission_rate = f64::NAN;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::CommissionRate(_))
        ));
    }

    #[test]
    fn rejects_zero_margin_ratios() {
        let mut cfg = valid_config();
        cfg.entry_margin_ratio = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::EntryMarginRatio(0.0)));

        let mut cfg = valid_config();
        cfg.min_margin_ratio = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::MinMarginRatio(0.0)));
    }

    #[test]
    fn execution_mode_uses_screaming_snake_case() {
        let json = serde_json::to_string(&ExecutionMode::Deferred).unwrap();
        assert_eq!(json, "\"DEFERRED\"");
        let mode: ExecutionMode = serde_json::from_str("\"IMMEDIATE\"").unwrap();
        assert_eq!(mode, ExecutionMode::Immediate);
        assert!(serde_json::from_str::<ExecutionMode>("\"NEXT\"").is_err());
    }
}
