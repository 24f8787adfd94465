//! Serializable run configuration.

use chrono::NaiveDate;
use marginlab_core::{ConfigError, SimConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

/// Everything needed to reproduce one backtest: where the bars come from,
/// which date window to simulate, and the full simulation parameters.
///
/// Loaded from TOML. Every simulation field is required — a missing field is
/// a parse error, never a silent default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// CSV file with `date,open,high,low,close` plus a `signal` or
    /// `position_side` column.
    pub bars_path: PathBuf,

    /// Inclusive start of the simulated window. `None` keeps all bars.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Inclusive end of the simulated window.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Capital, cost, and margin parameters.
    pub simulation: SimConfig,
}

impl RunConfig {
    /// Load from a TOML file and validate every field.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RunConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigFileError> {
        self.simulation.validate()?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ConfigFileError::EmptyDateRange { start, end });
            }
        }
        Ok(())
    }

    /// Deterministic hash id for this configuration: identical configs get
    /// identical ids, so downstream artifacts can be correlated per run.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// Errors while loading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),

    #[error("start_date {start} is after end_date {end}")]
    EmptyDateRange { start: NaiveDate, end: NaiveDate },
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginlab_core::ExecutionMode;

    const VALID_TOML: &str = r#"
bars_path = "bars.csv"
start_date = "2023-01-03"

[simulation]
initial_cash = 100000.0
invest_ratio = 1.0
slippage = 1.0
commission_rate = 0.0001
entry_margin_ratio = 0.1
min_margin_ratio = 0.08
contract_multiplier = 10.0
execution_mode = "DEFERRED"
"#;

    #[test]
    fn parses_valid_toml() {
        let config: RunConfig = toml::from_str(VALID_TOML).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.execution_mode, ExecutionMode::Deferred);
        assert_eq!(
            config.start_date,
            Some(NaiveDate::from_ymd_opt(2023, 1, 3).unwrap())
        );
        assert_eq!(config.end_date, None);
    }

    #[test]
    fn rejects_unknown_execution_mode() {
        let text = VALID_TOML.replace("\"DEFERRED\"", "\"NEXT\"");
        assert!(toml::from_str::<RunConfig>(&text).is_err());
    }

    #[test]
    fn rejects_missing_field() {
        let text = VALID_TOML.replace("invest_ratio = 1.0\n", "");
        assert!(toml::from_str::<RunConfig>(&text).is_err());
    }

    #[test]
    fn validation_names_the_offending_field() {
        let text = VALID_TOML.replace("invest_ratio = 1.0", "invest_ratio = 2.0");
        let config: RunConfig = toml::from_str(&text).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invest_ratio"));
    }

    #[test]
    fn rejects_inverted_date_range() {
        let mut config: RunConfig = toml::from_str(VALID_TOML).unwrap();
        config.end_date = Some(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
        assert!(matches!(
            config.validate(),
            Err(ConfigFileError::EmptyDateRange { .. })
        ));
    }

    #[test]
    fn run_id_is_stable_and_config_sensitive() {
        let a: RunConfig = toml::from_str(VALID_TOML).unwrap();
        let b: RunConfig = toml::from_str(VALID_TOML).unwrap();
        assert_eq!(a.run_id(), b.run_id());

        let mut c = a.clone();
        c.simulation.slippage = 2.0;
        assert_ne!(a.run_id(), c.run_id());
    }
}
