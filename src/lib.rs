//! difz - MACD DIF z-score momentum backtester
//!
//! Scores each day's MACD DIF value against the whole history before it and
//! drives an all-in long/flat position from that score.
//!
//! # Modules
//!
//! - `domain`: Core types (aligned series, account state, trade events, stats)
//! - `ports`: Trait abstractions (SeriesSource)
//! - `strategy`: Z-score estimation, position simulator, DIF snapshot
//! - `adapters`: External implementations (JSON files, memory, export, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Backtest and threshold sweep use cases
//! - `logging`: Tracing subscriber setup

pub mod domain;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;
pub mod logging;
