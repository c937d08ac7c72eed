//! Simulation Parameters
//!
//! Thresholds, warm-up and capital for a backtest run.
//! Defaults reproduce the reference setup: 200 warm-up days, enter above
//! z = +1, exit below z = -1, one million in starting cash.

use serde::{Deserialize, Serialize};

/// How the expanding-window statistics are computed each day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowMode {
    /// Recompute mean and std from the full history slice every day
    #[default]
    Recompute,
    /// Maintain running statistics (O(1) per day)
    Running,
}

/// Backtest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Days of history required before the first day is scored
    pub warmup: usize,
    /// Open a long position when z rises above this
    pub entry_threshold: f64,
    /// Close the position when z falls below this
    pub exit_threshold: f64,
    /// Starting cash
    pub initial_capital: f64,
    #[serde(default)]
    pub window_mode: WindowMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            warmup: 200,
            entry_threshold: 1.0,
            exit_threshold: -1.0,
            initial_capital: 1_000_000.0,
            window_mode: WindowMode::Recompute,
        }
    }
}

impl SimulationConfig {
    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_thresholds(mut self, entry: f64, exit: f64) -> Self {
        self.entry_threshold = entry;
        self.exit_threshold = exit;
        self
    }

    pub fn with_capital(mut self, capital: f64) -> Self {
        self.initial_capital = capital;
        self
    }

    pub fn with_window_mode(mut self, mode: WindowMode) -> Self {
        self.window_mode = mode;
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.entry_threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold(self.entry_threshold));
        }
        if !self.exit_threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold(self.exit_threshold));
        }
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(ConfigError::InvalidCapital(self.initial_capital));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid z-threshold: {0} (must be finite)")]
    InvalidThreshold(f64),
    #[error("Invalid initial capital: {0} (must be > 0)")]
    InvalidCapital(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.warmup, 200);
        assert_eq!(config.entry_threshold, 1.0);
        assert_eq!(config.exit_threshold, -1.0);
        assert_eq!(config.initial_capital, 1_000_000.0);
        assert_eq!(config.window_mode, WindowMode::Recompute);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = SimulationConfig::default()
            .with_warmup(20)
            .with_thresholds(1.5, -0.5)
            .with_capital(10_000.0)
            .with_window_mode(WindowMode::Running);
        assert_eq!(config.warmup, 20);
        assert_eq!(config.entry_threshold, 1.5);
        assert_eq!(config.exit_threshold, -0.5);
        assert_eq!(config.initial_capital, 10_000.0);
        assert_eq!(config.window_mode, WindowMode::Running);
    }

    #[test]
    fn test_any_finite_threshold_pair_is_valid() {
        for (entry, exit) in [(0.0, 0.0), (0.5, 1.0), (-1.0, 1.0)] {
            let config = SimulationConfig::default().with_thresholds(entry, exit);
            assert!(config.validate().is_ok(), "entry {} exit {}", entry, exit);
        }
    }

    #[test]
    fn test_non_finite_threshold() {
        let config = SimulationConfig::default().with_thresholds(f64::NAN, -1.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidThreshold(_))));

        let config = SimulationConfig::default().with_thresholds(1.0, f64::NEG_INFINITY);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidThreshold(_))));
    }

    #[test]
    fn test_invalid_capital() {
        let config = SimulationConfig::default().with_capital(0.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidCapital(0.0)));
    }

    #[test]
    fn test_window_mode_serde() {
        let mode: WindowMode = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(mode, WindowMode::Running);
    }
}
