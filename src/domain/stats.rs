//! Trade Statistics
//!
//! Summary figures for a finished simulation run: trade counts, win/loss
//! breakdown and drawdown of the daily mark-to-market account value.

use serde::{Deserialize, Serialize};

use super::trade::{TradeAction, TradeEvent};

/// Performance statistics of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    /// Total number of trade events
    pub total_trades: u32,
    pub buy_count: u32,
    pub sell_count: u32,
    /// Sells closing with positive profit
    pub winning_trades: u32,
    /// Sells closing with negative profit
    pub losing_trades: u32,
    /// Sum of realized profit over all sells
    pub total_realized_profit: f64,
    pub largest_win: f64,
    /// Largest loss as a positive number
    pub largest_loss: f64,
    pub sum_wins: f64,
    /// Sum of losses as a positive number
    pub sum_losses: f64,
    /// Highest account value observed
    pub peak_value: f64,
    /// Maximum drawdown from a peak, in percent
    pub max_drawdown_pct: f64,
}

impl TradeStats {
    /// Build statistics from the trade log and the daily account values.
    pub fn from_run(events: &[TradeEvent], marks: &[f64]) -> Self {
        let mut stats = Self::default();
        for event in events {
            stats.record_trade(event);
        }
        for &value in marks {
            stats.observe_value(value);
        }
        stats
    }

    fn record_trade(&mut self, event: &TradeEvent) {
        self.total_trades += 1;

        match event.action {
            TradeAction::Buy => self.buy_count += 1,
            TradeAction::Sell => {
                self.sell_count += 1;
                let profit = event.trade_profit;
                self.total_realized_profit += profit;

                if profit > 0.0 {
                    self.winning_trades += 1;
                    self.sum_wins += profit;
                    self.largest_win = self.largest_win.max(profit);
                } else if profit < 0.0 {
                    self.losing_trades += 1;
                    self.sum_losses += profit.abs();
                    self.largest_loss = self.largest_loss.max(profit.abs());
                }
            }
        }
    }

    fn observe_value(&mut self, value: f64) {
        if value > self.peak_value {
            self.peak_value = value;
        } else if self.peak_value > 0.0 {
            let drawdown = (self.peak_value - value) / self.peak_value * 100.0;
            if drawdown > self.max_drawdown_pct {
                self.max_drawdown_pct = drawdown;
            }
        }
    }

    /// Win rate as a percentage (0-100)
    pub fn win_rate(&self) -> f64 {
        let closed = self.winning_trades + self.losing_trades;
        if closed == 0 {
            return 0.0;
        }
        (self.winning_trades as f64 / closed as f64) * 100.0
    }

    pub fn avg_win(&self) -> f64 {
        if self.winning_trades == 0 {
            return 0.0;
        }
        self.sum_wins / self.winning_trades as f64
    }

    pub fn avg_loss(&self) -> f64 {
        if self.losing_trades == 0 {
            return 0.0;
        }
        self.sum_losses / self.losing_trades as f64
    }

    /// Gross profits over gross losses
    pub fn profit_factor(&self) -> f64 {
        if self.sum_losses.abs() < 1e-10 {
            if self.sum_wins > 0.0 {
                return f64::INFINITY;
            }
            return 0.0;
        }
        self.sum_wins / self.sum_losses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn event(action: TradeAction, trade_profit: f64) -> TradeEvent {
        TradeEvent {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            action,
            price: 10.0,
            indicator_value: 0.0,
            z_score: Some(0.0),
            trade_profit,
            cumulative_profit: 0.0,
            forced: false,
        }
    }

    #[test]
    fn test_empty_run() {
        let stats = TradeStats::from_run(&[], &[]);
        assert_eq!(stats.total_trades, 0);
        assert_eq!(stats.win_rate(), 0.0);
        assert_eq!(stats.profit_factor(), 0.0);
    }

    #[test]
    fn test_win_loss_breakdown() {
        let events = vec![
            event(TradeAction::Buy, 0.0),
            event(TradeAction::Sell, 300.0),
            event(TradeAction::Buy, 0.0),
            event(TradeAction::Sell, -100.0),
            event(TradeAction::Buy, 0.0),
            event(TradeAction::Sell, 0.0),
        ];
        let stats = TradeStats::from_run(&events, &[]);

        assert_eq!(stats.total_trades, 6);
        assert_eq!(stats.buy_count, 3);
        assert_eq!(stats.sell_count, 3);
        assert_eq!(stats.winning_trades, 1);
        assert_eq!(stats.losing_trades, 1);
        assert_eq!(stats.win_rate(), 50.0);
        assert_relative_eq!(stats.total_realized_profit, 200.0);
        assert_relative_eq!(stats.largest_win, 300.0);
        assert_relative_eq!(stats.largest_loss, 100.0);
        assert_relative_eq!(stats.profit_factor(), 3.0);
    }

    #[test]
    fn test_profit_factor_without_losses() {
        let events = vec![event(TradeAction::Buy, 0.0), event(TradeAction::Sell, 5.0)];
        let stats = TradeStats::from_run(&events, &[]);
        assert!(stats.profit_factor().is_infinite());
        assert_relative_eq!(stats.avg_win(), 5.0);
        assert_eq!(stats.avg_loss(), 0.0);
    }

    #[test]
    fn test_max_drawdown() {
        let marks = [100.0, 120.0, 90.0, 130.0, 117.0];
        let stats = TradeStats::from_run(&[], &marks);
        assert_relative_eq!(stats.peak_value, 130.0);
        assert_relative_eq!(stats.max_drawdown_pct, 25.0);
    }
}
