//! Domain types for MarginLab.

pub mod bar;
pub mod episode;
pub mod side;
pub mod snapshot;

pub use bar::Bar;
pub use episode::TradeEpisode;
pub use side::PositionSide;
pub use snapshot::AccountSnapshot;
