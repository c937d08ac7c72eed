//! Tracing setup: console output plus an optional plain-text log file.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{expand, LoggingSection};

/// Pick the filter level. `--debug` beats `--verbose`, which beats the
/// config file; RUST_LOG overrides everything.
fn level(verbose: bool, debug: bool, logging: Option<&LoggingSection>) -> String {
    if debug {
        "debug".to_string()
    } else if verbose {
        "info".to_string()
    } else {
        logging
            .map(|l| l.level.to_lowercase())
            .unwrap_or_else(|| "warn".to_string())
    }
}

/// Initialize logging system.
///
/// Keep the returned guard alive for the life of the program, otherwise
/// buffered file output is lost.
pub fn init_logging(
    verbose: bool,
    debug: bool,
    logging: Option<&LoggingSection>,
) -> Result<Option<WorkerGuard>> {
    let level = level(verbose, debug, logging);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let console = fmt::layer().with_target(false);

    let (file_layer, guard) = match logging.filter(|l| l.log_to_file) {
        Some(section) => {
            let path = expand(&section.log_file);
            let file_name = path
                .file_name()
                .with_context(|| format!("log_file has no file name: {}", section.log_file))?
                .to_owned();
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| ".".into());
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(&dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}
