//! Application Layer - Use cases
//!
//! - `backtest`: one simulation over an aligned series
//! - `sweep`: the same simulation over a grid of thresholds

pub mod backtest;
pub mod sweep;

pub use backtest::{run_simulation, BacktestError, Backtester, SimulationReport};
pub use sweep::{best, run_sweep, threshold_grid, SweepError, SweepPoint, SweepResult};
