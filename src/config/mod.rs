//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, ConfigError, DataSection, InstrumentSection, LoggingSection, SimulationSection, expand,
    load_config,
};
