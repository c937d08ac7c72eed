//! DIF Snapshot
//!
//! Point-in-time read of where the latest DIF value sits in its own history.
//! Unlike the backtest estimator, the statistics here include the latest
//! value itself.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::zscore::MIN_HISTORY;

/// Where the current z-score falls relative to the trading thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Zone {
    BuyZone,
    SellZone,
    Neutral,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::BuyZone => write!(f, "Buy zone"),
            Zone::SellZone => write!(f, "Sell zone"),
            Zone::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Summary of the latest DIF value against the whole series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifSnapshot {
    pub current_diff: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub z_score: f64,
    /// DIF level one standard deviation above the mean
    pub buy_diff: f64,
    /// DIF level one standard deviation below the mean
    pub sell_diff: f64,
    /// Normal CDF of the z-score (0.0 - 1.0)
    pub percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("Insufficient data: need at least 2 points, got {0}")]
    InsufficientData(usize),
    #[error("DIF series has zero variance")]
    ZeroVariance,
}

impl DifSnapshot {
    pub fn zone(&self, entry_threshold: f64, exit_threshold: f64) -> Zone {
        if self.z_score > entry_threshold {
            Zone::BuyZone
        } else if self.z_score < exit_threshold {
            Zone::SellZone
        } else {
            Zone::Neutral
        }
    }
}

/// Standard normal CDF: Φ(z) = 0.5 * (1 + erf(z / sqrt(2)))
pub fn normal_cdf(z: f64) -> f64 {
    use statrs::function::erf::erf;
    0.5 * (1.0 + erf(z / f64::sqrt(2.0)))
}

/// Summarise a DIF series, scoring its last value.
pub fn snapshot(diffs: &[f64]) -> Result<DifSnapshot, SnapshotError> {
    if diffs.len() < MIN_HISTORY {
        return Err(SnapshotError::InsufficientData(diffs.len()));
    }
    let current_diff = diffs[diffs.len() - 1];

    let n = diffs.len() as f64;
    let mean = diffs.iter().sum::<f64>() / n;
    let std_dev = (diffs.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    if std_dev == 0.0 || diffs.iter().all(|&v| v == current_diff) {
        return Err(SnapshotError::ZeroVariance);
    }

    let z_score = (current_diff - mean) / std_dev;
    Ok(DifSnapshot {
        current_diff,
        mean,
        std_dev,
        z_score,
        buy_diff: mean + std_dev,
        sell_diff: mean - std_dev,
        percentile: normal_cdf(z_score),
    })
}
