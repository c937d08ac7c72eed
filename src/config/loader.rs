//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml structure.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::strategy::params::{SimulationConfig, WindowMode};

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub instrument: InstrumentSection,
    pub data: DataSection,
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Instrument being backtested
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentSection {
    /// Exchange code (e.g. "000001.SH")
    pub code: String,
    /// Display name (for logging)
    #[serde(default)]
    pub name: String,
}

/// Input data files
#[derive(Debug, Clone, Deserialize)]
pub struct DataSection {
    /// JSON file of daily MACD records (`t`, `diff`)
    pub macd_file: String,
    /// JSON file of daily price records (`t`, `c`)
    pub price_file: String,
}

impl DataSection {
    /// MACD file path with environment variable override
    /// Checks DIFZ_MACD_FILE env var first, falls back to config value
    pub fn get_macd_file(&self) -> PathBuf {
        let raw = std::env::var("DIFZ_MACD_FILE").unwrap_or_else(|_| self.macd_file.clone());
        expand(&raw)
    }

    /// Price file path with environment variable override
    /// Checks DIFZ_PRICE_FILE env var first, falls back to config value
    pub fn get_price_file(&self) -> PathBuf {
        let raw = std::env::var("DIFZ_PRICE_FILE").unwrap_or_else(|_| self.price_file.clone());
        expand(&raw)
    }
}

/// Expand `~` to the home directory
pub fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Simulation parameters section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Days of DIF history before the first scored day
    pub warmup: usize,
    /// Enter long when z-score rises above this
    pub entry_threshold: f64,
    /// Exit when z-score falls below this
    pub exit_threshold: f64,
    /// Starting cash
    pub initial_capital: f64,
    /// "recompute" or "running"
    pub window_mode: WindowMode,
}

impl Default for SimulationSection {
    fn default() -> Self {
        let defaults = SimulationConfig::default();
        Self {
            warmup: defaults.warmup,
            entry_threshold: defaults.entry_threshold,
            exit_threshold: defaults.exit_threshold,
            initial_capital: defaults.initial_capital,
            window_mode: defaults.window_mode,
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log to file (in addition to stdout)
    pub log_to_file: bool,
    /// Log file path
    pub log_file: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            log_to_file: false,
            log_file: "logs/difz.log".to_string(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instrument.code.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "instrument code cannot be empty".to_string(),
            ));
        }

        if self.data.macd_file.is_empty() {
            return Err(ConfigError::ValidationError(
                "macd_file cannot be empty".to_string(),
            ));
        }

        if self.data.price_file.is_empty() {
            return Err(ConfigError::ValidationError(
                "price_file cannot be empty".to_string(),
            ));
        }

        SimulationConfig::from(self)
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging level must be one of {:?}, got {}",
                LOG_LEVELS, self.logging.level
            )));
        }

        Ok(())
    }

    /// Label for log lines: "code (name)" or just the code
    pub fn instrument_label(&self) -> String {
        if self.instrument.name.is_empty() {
            self.instrument.code.clone()
        } else {
            format!("{} ({})", self.instrument.code, self.instrument.name)
        }
    }
}

impl From<&Config> for SimulationConfig {
    fn from(config: &Config) -> Self {
        SimulationConfig {
            warmup: config.simulation.warmup,
            entry_threshold: config.simulation.entry_threshold,
            exit_threshold: config.simulation.exit_threshold,
            initial_capital: config.simulation.initial_capital,
            window_mode: config.simulation.window_mode,
        }
    }
}
