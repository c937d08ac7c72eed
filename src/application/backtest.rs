//! Backtest Driver
//!
//! Walks the aligned series one day at a time: score the day's DIF against
//! all prior days, feed the score and close price to the simulator, collect
//! any trade event. An open position is liquidated at the final bar.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::domain::{
    AccountState, AlignedSeries, IndicatorPoint, PricePoint, SeriesError, TradeEvent, TradeStats,
};
use crate::strategy::params::{ConfigError, SimulationConfig, WindowMode};
use crate::strategy::simulator::PositionSimulator;
use crate::strategy::zscore::{self, ExpandingWindow, ZScoreResult};

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("Invalid input series: {0}")]
    Series(#[from] SeriesError),
    #[error("Invalid simulation config: {0}")]
    Config(#[from] ConfigError),
}

/// Outcome of one simulation run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Trade events in date order
    pub trade_events: Vec<TradeEvent>,
    /// Final account value minus initial capital, after any forced liquidation
    pub final_profit: f64,
    pub final_state: AccountState,
    pub stats: TradeStats,
    /// Days at or past the warm-up offset
    pub eligible_days: usize,
    /// Eligible days that produced no signal
    pub skipped_days: usize,
}

impl SimulationReport {
    pub fn return_pct(&self) -> f64 {
        self.final_profit / self.final_state.initial_capital * 100.0
    }
}

/// Runs the z-score strategy over pre-validated series
#[derive(Debug, Clone)]
pub struct Backtester {
    config: SimulationConfig,
    simulator: PositionSimulator,
}

impl Backtester {
    pub fn new(config: SimulationConfig) -> Result<Self, BacktestError> {
        config.validate()?;
        let simulator = PositionSimulator::from_config(&config);
        Ok(Self { config, simulator })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the simulation over `series`.
    pub fn run(&self, series: &AlignedSeries) -> SimulationReport {
        let bars = series.bars();
        let warmup = self.config.warmup;

        info!(
            "Backtest {} -> {} ({} days, warmup {}, entry z>{}, exit z<{}, mode {:?})",
            series.first_date(),
            series.last_date(),
            bars.len(),
            warmup,
            self.config.entry_threshold,
            self.config.exit_threshold,
            self.config.window_mode
        );

        let diffs = series.diffs();
        let mut window = ExpandingWindow::new();
        let mut state = AccountState::new(self.config.initial_capital);
        let mut events = Vec::new();
        let mut marks = Vec::with_capacity(bars.len().saturating_sub(warmup));
        let mut eligible_days = 0;
        let mut skipped_days = 0;
        let mut last_score = None;

        for (i, bar) in bars.iter().enumerate() {
            let result = if i < warmup {
                None
            } else {
                self.score_day(&diffs, i, &window)
            };
            if self.config.window_mode == WindowMode::Running {
                window.push(bar.diff);
            }
            if i < warmup {
                continue;
            }

            eligible_days += 1;
            last_score = result.map(|r| r.z_score);

            match result {
                None => {
                    skipped_days += 1;
                    trace!("{} no signal (history {})", bar.date, i);
                }
                Some(z) => {
                    debug!(
                        "{} diff={:.4} z={:.4} close={:.2}",
                        bar.date, bar.diff, z.z_score, bar.close
                    );
                    let (next, event) = self.simulator.step(state, bar, z.z_score);
                    state = next;
                    if let Some(event) = event {
                        info!("{}", event);
                        events.push(event);
                    }
                }
            }
            marks.push(state.value_at(bar.close));
        }

        let last = series.last();
        let (next, forced) = self.simulator.liquidate(state, last, last_score);
        state = next;
        if let Some(event) = forced {
            info!("{}", event);
            events.push(event);
        }

        let final_profit = state.cumulative_profit(last.close);
        let stats = TradeStats::from_run(&events, &marks);

        info!(
            "Backtest complete: {} trades, final profit {:.2} ({:.2}%)",
            events.len(),
            final_profit,
            final_profit / self.config.initial_capital * 100.0
        );

        SimulationReport {
            trade_events: events,
            final_profit,
            final_state: state,
            stats,
            eligible_days,
            skipped_days,
        }
    }

    fn score_day(&self, diffs: &[f64], i: usize, window: &ExpandingWindow) -> Option<ZScoreResult> {
        match self.config.window_mode {
            WindowMode::Recompute => zscore::score(&diffs[..i], diffs[i]),
            WindowMode::Running => window.score(diffs[i]),
        }
    }
}

/// Validate the raw series and run one simulation.
///
/// Fails before any simulation step on empty or misaligned input.
pub fn run_simulation(
    indicators: &[IndicatorPoint],
    prices: &[PricePoint],
    config: &SimulationConfig,
) -> Result<SimulationReport, BacktestError> {
    let backtester = Backtester::new(config.clone())?;
    let series = AlignedSeries::new(indicators, prices)?;
    Ok(backtester.run(&series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradeAction;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn day(n: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Days::new(n as u64)
    }

    fn build(diffs: &[f64], closes: &[f64]) -> (Vec<IndicatorPoint>, Vec<PricePoint>) {
        let ind = diffs.iter().enumerate().map(|(i, &d)| IndicatorPoint::new(day(i), d)).collect();
        let px = closes.iter().enumerate().map(|(i, &c)| PricePoint::new(day(i), c)).collect();
        (ind, px)
    }

    fn small_config() -> SimulationConfig {
        SimulationConfig::default().with_warmup(4).with_capital(1000.0)
    }

    #[test]
    fn test_entry_then_exit() {
        let diffs = [0.1, -0.1, 0.1, -0.1, 2.0, -3.0];
        let closes = [10.0, 10.0, 10.0, 10.0, 10.0, 12.5];
        let (ind, px) = build(&diffs, &closes);

        let report = run_simulation(&ind, &px, &small_config()).unwrap();
        assert_eq!(report.trade_events.len(), 2);
        assert_eq!(report.trade_events[0].action, TradeAction::Buy);
        assert_eq!(report.trade_events[0].date, day(4));
        assert_eq!(report.trade_events[1].action, TradeAction::Sell);
        assert!(!report.trade_events[1].forced);
        assert_relative_eq!(report.trade_events[1].trade_profit, 250.0);
        assert_relative_eq!(report.final_profit, 250.0);
        assert_eq!(report.eligible_days, 2);
        assert_eq!(report.skipped_days, 0);
        assert!(report.final_state.is_flat());
    }

    #[test]
    fn test_forced_liquidation_at_end() {
        let diffs = [0.1, -0.1, 0.1, -0.1, 2.0, 0.5];
        let closes = [10.0, 10.0, 10.0, 10.0, 10.0, 9.0];
        let (ind, px) = build(&diffs, &closes);

        let report = run_simulation(&ind, &px, &small_config()).unwrap();
        let last = report.trade_events.last().unwrap();
        assert_eq!(report.trade_events.len(), 2);
        assert!(last.forced);
        assert_eq!(last.date, day(5));
        assert_eq!(last.price, 9.0);
        assert!(last.z_score.is_some());
        assert_relative_eq!(last.trade_profit, -100.0);
        assert_relative_eq!(report.final_profit, -100.0);
        assert!(report.final_state.is_flat());
    }

    #[test]
    fn test_short_series_has_no_trades() {
        let (ind, px) = build(&[0.1, 5.0, -5.0, 7.0], &[1.0, 2.0, 3.0, 4.0]);
        let report = run_simulation(&ind, &px, &small_config()).unwrap();
        assert!(report.trade_events.is_empty());
        assert_eq!(report.final_profit, 0.0);
        assert_eq!(report.eligible_days, 0);
    }

    #[test]
    fn test_zero_variance_days_are_skipped() {
        let diffs = [0.0, 0.0, 0.0, 0.0, 9.0];
        let closes = [1.0, 1.0, 1.0, 1.0, 1.0];
        let (ind, px) = build(&diffs, &closes);
        let report = run_simulation(&ind, &px, &small_config()).unwrap();
        assert!(report.trade_events.is_empty());
        assert_eq!(report.skipped_days, 1);
    }

    #[test]
    fn test_running_mode_matches_recompute() {
        let diffs: Vec<f64> = (0..300).map(|i| ((i as f64) * 0.37).sin() * (1.0 + i as f64 / 100.0)).collect();
        let closes: Vec<f64> = (0..300).map(|i| 50.0 + ((i as f64) * 0.11).cos() * 5.0).collect();
        let (ind, px) = build(&diffs, &closes);

        let exact = run_simulation(&ind, &px, &SimulationConfig::default().with_warmup(30)).unwrap();
        let running = run_simulation(
            &ind,
            &px,
            &SimulationConfig::default()
                .with_warmup(30)
                .with_window_mode(WindowMode::Running),
        )
        .unwrap();

        assert_eq!(exact.trade_events.len(), running.trade_events.len());
        for (a, b) in exact.trade_events.iter().zip(&running.trade_events) {
            assert_eq!(a.date, b.date);
            assert_eq!(a.action, b.action);
        }
        assert_relative_eq!(exact.final_profit, running.final_profit, max_relative = 1e-9);
    }

    #[test]
    fn test_mismatched_lengths_fail_fast() {
        let (ind, mut px) = build(&[0.1, 0.2, 0.3], &[1.0, 1.0, 1.0]);
        px.pop();
        let err = run_simulation(&ind, &px, &small_config()).unwrap_err();
        assert!(matches!(err, BacktestError::Series(SeriesError::LengthMismatch { .. })));
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let (ind, px) = build(&[0.1, 0.2], &[1.0, 1.0]);
        let config = small_config().with_thresholds(f64::INFINITY, 0.0);
        let err = run_simulation(&ind, &px, &config).unwrap_err();
        assert!(matches!(err, BacktestError::Config(_)));
    }

    #[test]
    fn test_equal_thresholds_alternate() {
        let diffs = [0.1, -0.1, 0.1, -0.1, 1.0, -1.0, 1.0, -1.0];
        let closes = [10.0, 10.0, 10.0, 10.0, 10.0, 11.0, 10.0, 12.0];
        let (ind, px) = build(&diffs, &closes);
        let config = small_config().with_thresholds(0.0, 0.0);

        let report = run_simulation(&ind, &px, &config).unwrap();
        let actions: Vec<_> = report.trade_events.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![TradeAction::Buy, TradeAction::Sell, TradeAction::Buy, TradeAction::Sell]
        );
        assert!(report.trade_events.iter().all(|e| !e.forced));
        assert_relative_eq!(report.trade_events[1].trade_profit, 100.0, max_relative = 1e-12);
        assert_relative_eq!(report.trade_events[3].trade_profit, 220.0, max_relative = 1e-12);
        assert_relative_eq!(report.final_profit, 320.0, max_relative = 1e-12);
    }

    #[test]
    fn test_exit_above_entry_runs() {
        let diffs = [0.1, -0.1, 0.1, -0.1, 2.0, -3.0];
        let closes = [10.0, 10.0, 10.0, 10.0, 10.0, 12.5];
        let (ind, px) = build(&diffs, &closes);
        let config = small_config().with_thresholds(0.5, 1.0);

        let report = run_simulation(&ind, &px, &config).unwrap();
        assert_eq!(report.trade_events.len(), 2);
        assert!(report.trade_events[0].is_buy());
        assert!(report.trade_events[1].is_sell());
    }

    #[test]
    fn test_report_return_pct() {
        let diffs = [0.1, -0.1, 0.1, -0.1, 2.0, -3.0];
        let closes = [10.0, 10.0, 10.0, 10.0, 10.0, 11.0];
        let (ind, px) = build(&diffs, &closes);
        let report = run_simulation(&ind, &px, &small_config()).unwrap();
        assert_relative_eq!(report.return_pct(), 10.0, max_relative = 1e-9);
        assert_eq!(report.stats.winning_trades, 1);
    }
}
