//! Ports Layer - Trait definitions for external dependencies
//!
//! The backtester only needs one thing from the outside world: the daily DIF
//! and price series. `SeriesSource` abstracts where they come from.

pub mod market_data;

pub use market_data::{load_aligned, DataError, SeriesSource};
