//! Strategy Layer - DIF z-score signal and long/flat simulation
//!
//! - `zscore`: expanding-window z-score estimator (stateless and running forms)
//! - `simulator`: flat/long state machine consuming the daily score
//! - `snapshot`: point-in-time DIF summary with buy/sell levels
//! - `params`: thresholds, warm-up and capital

pub mod params;
pub mod zscore;
pub mod simulator;
pub mod snapshot;

pub use params::{ConfigError, SimulationConfig, WindowMode};
pub use zscore::{score, ExpandingWindow, ZScoreResult};
pub use simulator::{PositionSimulator, Transition};
pub use snapshot::{snapshot, DifSnapshot, SnapshotError, Zone};
