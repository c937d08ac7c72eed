//! Adapters Layer - External System Implementations
//!
//! - json_file: series source reading downloaded API responses from disk
//! - memory: in-memory series source
//! - export: CSV/JSON trade log export
//! - cli: command-line interface handlers

pub mod json_file;
pub mod memory;
pub mod export;
pub mod cli;

pub use json_file::JsonFileSource;
pub use memory::MemorySource;
pub use cli::CliApp;
