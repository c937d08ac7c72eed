use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a simulated trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

/// A position transition emitted by the simulator. Append-only output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub date: NaiveDate,
    pub action: TradeAction,
    pub price: f64,
    /// DIF value on the trade day
    pub indicator_value: f64,
    /// `None` only for a forced liquidation on a day without a signal
    pub z_score: Option<f64>,
    /// Realized profit of the round trip; zero for buys
    pub trade_profit: f64,
    pub cumulative_profit: f64,
    /// Closed at end of data rather than on an exit signal
    #[serde(default)]
    pub forced: bool,
}

impl TradeEvent {
    pub fn is_buy(&self) -> bool {
        self.action == TradeAction::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.action == TradeAction::Sell
    }
}

impl fmt::Display for TradeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let z = self
            .z_score
            .map(|z| format!("{:.4}", z))
            .unwrap_or_else(|| "n/a".to_string());
        write!(
            f,
            "{} {:<4} {:>10.2} diff={:.4} z={} pnl={:.2} total={:.2}{}",
            self.date,
            self.action,
            self.price,
            self.indicator_value,
            z,
            self.trade_profit,
            self.cumulative_profit,
            if self.forced { " (forced)" } else { "" }
        )
    }
}
