//! Domain Layer - Core data types for the DIF z-score backtester
//!
//! Pure types and accounting with no I/O:
//! - `series`: indicator/price points and the validated `AlignedSeries`
//! - `account`: cash and position of one simulation run
//! - `trade`: emitted trade events
//! - `stats`: performance summary of a finished run

pub mod series;
pub mod account;
pub mod trade;
pub mod stats;

pub use series::{AlignedSeries, DailyBar, IndicatorPoint, PricePoint, SeriesError};
pub use account::{AccountError, AccountState, PositionState};
pub use trade::{TradeAction, TradeEvent};
pub use stats::TradeStats;
