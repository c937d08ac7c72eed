//! Position Simulator
//!
//! Two-state machine (flat / long) driven by the daily z-score.
//!
//! | From | Condition            | To   |
//! |------|----------------------|------|
//! | Flat | z > entry threshold  | Long |
//! | Long | z < exit threshold   | Flat |
//! | Long | end of series        | Flat |
//!
//! Entries deploy all cash; exits sell the whole position. Each transition is
//! a pure function of the incoming account state and the day's bar.

use tracing::{debug, warn};

use crate::domain::{AccountState, DailyBar, PositionState, TradeAction, TradeEvent};
use crate::strategy::params::SimulationConfig;

/// Next account state and the trade event, if any, that produced it
pub type Transition = (AccountState, Option<TradeEvent>);

/// Threshold-driven long/flat simulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSimulator {
    entry_threshold: f64,
    exit_threshold: f64,
}

impl PositionSimulator {
    pub fn new(entry_threshold: f64, exit_threshold: f64) -> Self {
        Self {
            entry_threshold,
            exit_threshold,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.entry_threshold, config.exit_threshold)
    }

    pub fn entry_threshold(&self) -> f64 {
        self.entry_threshold
    }

    pub fn exit_threshold(&self) -> f64 {
        self.exit_threshold
    }

    /// Evaluate one scored day. At most one transition fires.
    pub fn step(&self, state: AccountState, bar: &DailyBar, z_score: f64) -> Transition {
        match state.position() {
            PositionState::Flat if z_score > self.entry_threshold => {
                self.buy(state, bar, z_score)
            }
            PositionState::Long { .. } if z_score < self.exit_threshold => {
                self.sell(state, bar, Some(z_score), false)
            }
            _ => (state, None),
        }
    }

    /// Close any open position at the final bar of the series.
    ///
    /// `z_score` is the final day's score if it had one.
    pub fn liquidate(
        &self,
        state: AccountState,
        last: &DailyBar,
        z_score: Option<f64>,
    ) -> Transition {
        if state.is_flat() {
            return (state, None);
        }
        warn!(
            "Series ended while long - forcing liquidation on {} at {:.2}",
            last.date, last.close
        );
        self.sell(state, last, z_score, true)
    }

    fn buy(&self, state: AccountState, bar: &DailyBar, z_score: f64) -> Transition {
        let next = match state.open_long(bar.close) {
            Ok(next) => next,
            Err(e) => {
                warn!("Skipping entry on {}: {}", bar.date, e);
                return (state, None);
            }
        };

        debug!(
            "{} BUY {:.4} units @ {:.2} (z={:.4})",
            bar.date, next.position_size, bar.close, z_score
        );

        let event = TradeEvent {
            date: bar.date,
            action: TradeAction::Buy,
            price: bar.close,
            indicator_value: bar.diff,
            z_score: Some(z_score),
            trade_profit: 0.0,
            cumulative_profit: next.cumulative_profit(bar.close),
            forced: false,
        };
        (next, Some(event))
    }

    fn sell(
        &self,
        state: AccountState,
        bar: &DailyBar,
        z_score: Option<f64>,
        forced: bool,
    ) -> Transition {
        let (next, trade_profit) = match state.close_long(bar.close) {
            Ok(closed) => closed,
            Err(e) => {
                warn!("Skipping exit on {}: {}", bar.date, e);
                return (state, None);
            }
        };

        debug!(
            "{} SELL @ {:.2} profit={:.2}{}",
            bar.date,
            bar.close,
            trade_profit,
            if forced { " (forced)" } else { "" }
        );

        let event = TradeEvent {
            date: bar.date,
            action: TradeAction::Sell,
            price: bar.close,
            indicator_value: bar.diff,
            z_score,
            trade_profit,
            cumulative_profit: next.cumulative_profit(bar.close),
            forced,
        };
        (next, Some(event))
    }
}

impl Default for PositionSimulator {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}
