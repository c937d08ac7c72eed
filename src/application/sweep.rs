//! Parameter Sweep
//!
//! Runs the backtest over a grid of entry/exit thresholds. Every run owns its
//! own account state; the series is shared read-only behind an `Arc`.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;

use super::backtest::{BacktestError, Backtester, SimulationReport};
use crate::domain::AlignedSeries;
use crate::strategy::params::SimulationConfig;

/// One entry/exit threshold combination
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub entry_threshold: f64,
    pub exit_threshold: f64,
}

/// Summary of one sweep run
#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    pub point: SweepPoint,
    pub trades: usize,
    pub final_profit: f64,
    pub return_pct: f64,
    pub win_rate: f64,
    pub max_drawdown_pct: f64,
}

impl SweepResult {
    fn from_report(point: SweepPoint, report: &SimulationReport) -> Self {
        Self {
            point,
            trades: report.trade_events.len(),
            final_profit: report.final_profit,
            return_pct: report.return_pct(),
            win_rate: report.stats.win_rate(),
            max_drawdown_pct: report.stats.max_drawdown_pct,
        }
    }
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Parameter grid is empty")]
    EmptyGrid,
    #[error("Invalid sweep point: {0}")]
    Backtest(#[from] BacktestError),
    #[error("Sweep task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Cartesian product of entry and exit thresholds, in entry-major order.
pub fn threshold_grid(entries: &[f64], exits: &[f64]) -> Vec<SweepPoint> {
    entries
        .iter()
        .flat_map(|&entry| {
            exits.iter().map(move |&exit| SweepPoint {
                entry_threshold: entry,
                exit_threshold: exit,
            })
        })
        .collect()
}

/// Run every grid point on the blocking pool. Results come back in grid order.
pub async fn run_sweep(
    series: Arc<AlignedSeries>,
    base: &SimulationConfig,
    points: &[SweepPoint],
) -> Result<Vec<SweepResult>, SweepError> {
    if points.is_empty() {
        return Err(SweepError::EmptyGrid);
    }

    // Validate the whole grid before starting any run
    let backtesters = points
        .iter()
        .map(|p| {
            let config = base.clone().with_thresholds(p.entry_threshold, p.exit_threshold);
            Backtester::new(config).map(|b| (*p, b))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        "Sweeping {} parameter combinations over {} days",
        backtesters.len(),
        series.len()
    );

    let handles: Vec<JoinHandle<SweepResult>> = backtesters
        .into_iter()
        .map(|(point, backtester)| {
            let series = Arc::clone(&series);
            tokio::task::spawn_blocking(move || {
                let report = backtester.run(&series);
                SweepResult::from_report(point, &report)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await?);
    }
    Ok(results)
}

/// Best result by final profit
pub fn best(results: &[SweepResult]) -> Option<&SweepResult> {
    results
        .iter()
        .max_by(|a, b| a.final_profit.total_cmp(&b.final_profit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IndicatorPoint, PricePoint};
    use chrono::NaiveDate;

    fn series() -> Arc<AlignedSeries> {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let ind: Vec<_> = (0..120)
            .map(|i| IndicatorPoint::new(start + chrono::Days::new(i), ((i as f64) * 0.3).sin() * (1.0 + i as f64 * 0.02)))
            .collect();
        let px: Vec<_> = (0..120)
            .map(|i| PricePoint::new(start + chrono::Days::new(i), 20.0 + ((i as f64) * 0.07).sin() * 3.0))
            .collect();
        Arc::new(AlignedSeries::new(&ind, &px).unwrap())
    }

    #[test]
    fn test_threshold_grid_keeps_every_pair() {
        let grid = threshold_grid(&[0.5, 1.0], &[-1.0, 0.75]);
        assert_eq!(
            grid,
            vec![
                SweepPoint { entry_threshold: 0.5, exit_threshold: -1.0 },
                SweepPoint { entry_threshold: 0.5, exit_threshold: 0.75 },
                SweepPoint { entry_threshold: 1.0, exit_threshold: -1.0 },
                SweepPoint { entry_threshold: 1.0, exit_threshold: 0.75 },
            ]
        );
    }

    #[tokio::test]
    async fn test_sweep_matches_individual_runs() {
        let series = series();
        let base = SimulationConfig::default().with_warmup(20);
        let grid = threshold_grid(&[0.5, 1.0, 1.5], &[-0.5, -1.0]);

        let results = run_sweep(Arc::clone(&series), &base, &grid).await.unwrap();
        assert_eq!(results.len(), grid.len());

        for (result, point) in results.iter().zip(&grid) {
            assert_eq!(result.point, *point);
            let config = base.clone().with_thresholds(point.entry_threshold, point.exit_threshold);
            let single = Backtester::new(config).unwrap().run(&series);
            assert_eq!(result.trades, single.trade_events.len());
            assert_eq!(result.final_profit, single.final_profit);
        }
        assert!(best(&results).is_some());
    }

    #[tokio::test]
    async fn test_empty_grid() {
        let err = run_sweep(series(), &SimulationConfig::default(), &[]).await.unwrap_err();
        assert!(matches!(err, SweepError::EmptyGrid));
    }

    #[tokio::test]
    async fn test_invalid_point_rejected() {
        let good = SweepPoint { entry_threshold: 1.0, exit_threshold: -1.0 };
        let bad = SweepPoint { entry_threshold: f64::NAN, exit_threshold: -1.0 };
        let err = run_sweep(series(), &SimulationConfig::default(), &[good, bad]).await.unwrap_err();
        assert!(matches!(err, SweepError::Backtest(_)));
    }

    #[tokio::test]
    async fn test_exit_above_entry_is_swept() {
        let base = SimulationConfig::default().with_warmup(20);
        let point = SweepPoint { entry_threshold: -0.5, exit_threshold: 0.5 };
        let results = run_sweep(series(), &base, &[point]).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].point, point);
    }
}
