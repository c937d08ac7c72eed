//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the difz backtester.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::export::{write_csv, write_json};
use crate::adapters::json_file::JsonFileSource;
use crate::application::{best, run_sweep, threshold_grid, Backtester, SimulationReport};
use crate::config::{load_config, Config};
use crate::logging::init_logging;
use crate::ports::{load_aligned, SeriesSource};
use crate::strategy::{snapshot, SimulationConfig, WindowMode};

/// difz - MACD DIF z-score momentum backtester
#[derive(Parser, Debug)]
#[command(
    name = "difz",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "MACD DIF z-score momentum backtester",
    long_about = "difz scores each day's MACD DIF value against its full prior history \
                  and simulates an all-in long/flat position driven by that z-score."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (prints every trade)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the z-score backtest over historical data
    Backtest(BacktestCmd),

    /// Show where the latest DIF value sits in its history
    Snapshot(SnapshotCmd),

    /// Backtest a grid of entry/exit thresholds
    Sweep(SweepCmd),
}

impl Command {
    fn data(&self) -> &DataArgs {
        match self {
            Command::Backtest(cmd) => &cmd.data,
            Command::Snapshot(cmd) => &cmd.data,
            Command::Sweep(cmd) => &cmd.data,
        }
    }
}

/// Where to find the input series
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// MACD records JSON (overrides config)
    #[arg(long, value_name = "FILE")]
    pub macd: Option<PathBuf>,

    /// Price records JSON (overrides config)
    #[arg(long, value_name = "FILE")]
    pub prices: Option<PathBuf>,

    /// Instrument code (overrides config)
    #[arg(long, value_name = "CODE")]
    pub code: Option<String>,
}

/// Run backtest
#[derive(Parser, Debug)]
pub struct BacktestCmd {
    #[command(flatten)]
    pub data: DataArgs,

    /// Override warm-up offset (days)
    #[arg(long, value_name = "DAYS")]
    pub warmup: Option<usize>,

    /// Override entry z-score threshold
    #[arg(long, value_name = "Z", allow_hyphen_values = true)]
    pub entry: Option<f64>,

    /// Override exit z-score threshold
    #[arg(long, value_name = "Z", allow_hyphen_values = true)]
    pub exit: Option<f64>,

    /// Override starting capital
    #[arg(long, value_name = "AMOUNT")]
    pub capital: Option<f64>,

    /// Use running (O(1) per day) window statistics
    #[arg(long)]
    pub running: bool,

    /// Print the trade log
    #[arg(short, long)]
    pub trades: bool,

    /// Export trades to CSV
    #[arg(long, value_name = "FILE")]
    pub export_csv: Option<PathBuf>,

    /// Export the full report to JSON
    #[arg(long, value_name = "FILE")]
    pub export_json: Option<PathBuf>,
}

/// DIF snapshot
#[derive(Parser, Debug)]
pub struct SnapshotCmd {
    #[command(flatten)]
    pub data: DataArgs,
}

/// Threshold sweep
#[derive(Parser, Debug)]
pub struct SweepCmd {
    #[command(flatten)]
    pub data: DataArgs,

    /// Entry thresholds to try
    #[arg(long, value_name = "Z,..", value_delimiter = ',', allow_hyphen_values = true,
          default_values_t = vec![0.5, 1.0, 1.5, 2.0])]
    pub entries: Vec<f64>,

    /// Exit thresholds to try
    #[arg(long, value_name = "Z,..", value_delimiter = ',', allow_hyphen_values = true,
          default_values_t = vec![0.0, -0.5, -1.0, -1.5])]
    pub exits: Vec<f64>,

    /// Export results to JSON
    #[arg(long, value_name = "FILE")]
    pub export_json: Option<PathBuf>,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = match &app.command.data().config {
        Some(path) => Some(
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        ),
        None => None,
    };

    // Held until the command finishes so file logs are flushed
    let _guard = init_logging(app.verbose, app.debug, config.as_ref().map(|c| &c.logging))?;

    match app.command {
        Command::Backtest(cmd) => backtest_command(cmd, config.as_ref()).await,
        Command::Snapshot(cmd) => snapshot_command(cmd, config.as_ref()).await,
        Command::Sweep(cmd) => sweep_command(cmd, config.as_ref()).await,
    }
}

/// Resolve input files from flags first, then config
fn build_source(data: &DataArgs, config: Option<&Config>) -> Result<JsonFileSource> {
    let macd = match (&data.macd, config) {
        (Some(path), _) => path.clone(),
        (None, Some(cfg)) => cfg.data.get_macd_file(),
        (None, None) => bail!("No MACD file: pass --macd or --config"),
    };
    let prices = match (&data.prices, config) {
        (Some(path), _) => path.clone(),
        (None, Some(cfg)) => cfg.data.get_price_file(),
        (None, None) => bail!("No price file: pass --prices or --config"),
    };
    let code = data
        .code
        .clone()
        .or_else(|| config.map(|c| c.instrument_label()))
        .unwrap_or_else(|| "unknown".to_string());

    Ok(JsonFileSource::new(code, macd, prices))
}

fn simulation_config(config: Option<&Config>) -> SimulationConfig {
    config.map(SimulationConfig::from).unwrap_or_default()
}

/// Handle backtest command
async fn backtest_command(cmd: BacktestCmd, config: Option<&Config>) -> Result<()> {
    let source = build_source(&cmd.data, config)?;
    let series = load_aligned(&source)
        .await
        .with_context(|| format!("Failed to load series for {}", source.instrument()))?;

    let mut sim = simulation_config(config);
    if let Some(warmup) = cmd.warmup {
        sim = sim.with_warmup(warmup);
    }
    if let Some(entry) = cmd.entry {
        sim.entry_threshold = entry;
    }
    if let Some(exit) = cmd.exit {
        sim.exit_threshold = exit;
    }
    if let Some(capital) = cmd.capital {
        sim = sim.with_capital(capital);
    }
    if cmd.running {
        sim = sim.with_window_mode(WindowMode::Running);
    }

    let backtester = Backtester::new(sim).context("Invalid simulation parameters")?;
    let report = backtester.run(&series);

    print_report(&source.instrument(), &report, cmd.trades);

    if let Some(path) = &cmd.export_csv {
        write_csv(path, &report.trade_events)
            .with_context(|| format!("Failed to export CSV to {}", path.display()))?;
        println!("Trades exported to {}", path.display());
    }
    if let Some(path) = &cmd.export_json {
        write_json(path, &report)
            .with_context(|| format!("Failed to export JSON to {}", path.display()))?;
        println!("Report exported to {}", path.display());
    }

    Ok(())
}

fn print_report(instrument: &str, report: &SimulationReport, show_trades: bool) {
    let stats = &report.stats;

    println!("{}", "=".repeat(80));
    println!("Backtest: {}", instrument);
    println!("{}", "-".repeat(80));

    if show_trades {
        println!(
            "{:<10} {:<6} {:>10} {:>10} {:>10} {:>14} {:>14}",
            "date", "action", "price", "diff", "z-score", "trade pnl", "total pnl"
        );
        for event in &report.trade_events {
            let z = event
                .z_score
                .map(|z| format!("{:.4}", z))
                .unwrap_or_else(|| "n/a".to_string());
            println!(
                "{:<10} {:<6} {:>10.2} {:>10.4} {:>10} {:>14.2} {:>14.2}{}",
                event.date,
                event.action,
                event.price,
                event.indicator_value,
                z,
                event.trade_profit,
                event.cumulative_profit,
                if event.forced { "  (end of data)" } else { "" }
            );
        }
        println!("{}", "-".repeat(80));
    }

    println!(
        "Days scored: {} ({} without signal)",
        report.eligible_days - report.skipped_days,
        report.skipped_days
    );
    println!(
        "Trades: {} (wins {}, losses {}, win rate {:.1}%)",
        stats.total_trades,
        stats.winning_trades,
        stats.losing_trades,
        stats.win_rate()
    );
    println!(
        "Largest win: {:.2}  Largest loss: {:.2}  Profit factor: {:.2}",
        stats.largest_win,
        stats.largest_loss,
        stats.profit_factor()
    );
    println!("Max drawdown: {:.2}%", stats.max_drawdown_pct);
    println!("Final profit: {:.2} ({:.2}%)", report.final_profit, report.return_pct());
    println!("{}", "=".repeat(80));
}

/// Handle snapshot command
async fn snapshot_command(cmd: SnapshotCmd, config: Option<&Config>) -> Result<()> {
    let macd = match (&cmd.data.macd, config) {
        (Some(path), _) => path.clone(),
        (None, Some(cfg)) => cfg.data.get_macd_file(),
        (None, None) => bail!("No MACD file: pass --macd or --config"),
    };
    let code = cmd
        .data
        .code
        .clone()
        .or_else(|| config.map(|c| c.instrument_label()))
        .unwrap_or_else(|| "unknown".to_string());

    // Snapshot needs only the DIF series; the price path is never read
    let source = JsonFileSource::new(code, macd, PathBuf::new());
    let indicators = source
        .load_indicators()
        .await
        .with_context(|| format!("Failed to load DIF series for {}", source.instrument()))?;
    let diffs: Vec<f64> = indicators.iter().map(|p| p.diff).collect();

    let snap = snapshot(&diffs).context("Cannot compute DIF snapshot")?;
    let sim = simulation_config(config);

    println!("{}", "=".repeat(80));
    println!("DIF snapshot: {}", source.instrument());
    if let (Some(first), Some(last)) = (indicators.first(), indicators.last()) {
        println!("Range: {} - {} ({} days)", first.date, last.date, indicators.len());
    }
    println!("{}", "-".repeat(80));
    println!("Current DIF:   {:.4}", snap.current_diff);
    println!("Mean / std:    {:.4} / {:.4}", snap.mean, snap.std_dev);
    println!("Z-score:       {:.2} (percentile {:.1}%)", snap.z_score, snap.percentile * 100.0);
    println!("Buy above:     {:.4}", snap.buy_diff);
    println!("Sell below:    {:.4}", snap.sell_diff);
    println!("Zone:          {}", snap.zone(sim.entry_threshold, sim.exit_threshold));
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Handle sweep command
async fn sweep_command(cmd: SweepCmd, config: Option<&Config>) -> Result<()> {
    let source = build_source(&cmd.data, config)?;
    let series = load_aligned(&source)
        .await
        .with_context(|| format!("Failed to load series for {}", source.instrument()))?;

    let grid = threshold_grid(&cmd.entries, &cmd.exits);
    let base = simulation_config(config);
    let results = run_sweep(Arc::new(series), &base, &grid).await?;

    println!("{}", "=".repeat(80));
    println!("Threshold sweep: {} ({} combinations)", source.instrument(), results.len());
    println!("{}", "-".repeat(80));
    println!(
        "{:>8} {:>8} {:>8} {:>16} {:>10} {:>10} {:>10}",
        "entry", "exit", "trades", "profit", "return%", "win%", "maxDD%"
    );
    for r in &results {
        println!(
            "{:>8.2} {:>8.2} {:>8} {:>16.2} {:>10.2} {:>10.1} {:>10.2}",
            r.point.entry_threshold,
            r.point.exit_threshold,
            r.trades,
            r.final_profit,
            r.return_pct,
            r.win_rate,
            r.max_drawdown_pct
        );
    }
    if let Some(top) = best(&results) {
        println!("{}", "-".repeat(80));
        println!(
            "Best: entry {:.2} / exit {:.2} -> {:.2}",
            top.point.entry_threshold, top.point.exit_threshold, top.final_profit
        );
    }
    println!("{}", "=".repeat(80));

    if let Some(path) = &cmd.export_json {
        write_json(path, &results)
            .with_context(|| format!("Failed to export JSON to {}", path.display()))?;
        println!("Results exported to {}", path.display());
    }

    Ok(())
}
