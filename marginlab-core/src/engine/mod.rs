//! Engine — position resolver and equity simulator.

pub mod config;
pub mod resolver;
pub mod simulator;

pub use config::{ConfigError, ExecutionMode, SimConfig};
pub use resolver::resolve_positions;
pub use simulator::{simulate, SimError, SimResult};
