use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the account stands relative to the instrument
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PositionState {
    Flat,
    Long { size: f64, entry_price: f64 },
}

/// Cash and holdings of a single simulation run.
///
/// Values are plain `Copy` data: the simulator takes a state and hands back
/// the next one instead of mutating shared variables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub cash: f64,
    pub position_size: f64,
    pub entry_price: Option<f64>,
    pub initial_capital: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum AccountError {
    #[error("Position is already open")]
    AlreadyOpen,
    #[error("No open position")]
    NotOpen,
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),
    #[error("No cash to deploy")]
    NoCash,
}

impl AccountState {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            position_size: 0.0,
            entry_price: None,
            initial_capital,
        }
    }

    pub fn position(&self) -> PositionState {
        match self.entry_price {
            Some(entry_price) if self.position_size > 0.0 => PositionState::Long {
                size: self.position_size,
                entry_price,
            },
            _ => PositionState::Flat,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self.position(), PositionState::Flat)
    }

    /// Mark-to-market value at `price`
    pub fn value_at(&self, price: f64) -> f64 {
        self.cash + self.position_size * price
    }

    /// Account value minus starting capital, recomputed from scratch
    pub fn cumulative_profit(&self, price: f64) -> f64 {
        self.value_at(price) - self.initial_capital
    }

    /// Put all cash into the instrument at `price`.
    pub fn open_long(self, price: f64) -> Result<Self, AccountError> {
        if !self.is_flat() {
            return Err(AccountError::AlreadyOpen);
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(AccountError::InvalidPrice(price));
        }
        if self.cash <= 0.0 {
            return Err(AccountError::NoCash);
        }

        let size = self.cash / price;
        Ok(Self {
            cash: 0.0,
            position_size: size,
            entry_price: Some(price),
            ..self
        })
    }

    /// Sell the whole position at `price`, returning the new state and the
    /// realized profit of the round trip.
    pub fn close_long(self, price: f64) -> Result<(Self, f64), AccountError> {
        let (size, entry_price) = match self.position() {
            PositionState::Long { size, entry_price } => (size, entry_price),
            PositionState::Flat => return Err(AccountError::NotOpen),
        };
        if !price.is_finite() || price <= 0.0 {
            return Err(AccountError::InvalidPrice(price));
        }

        let trade_profit = (price - entry_price) * size;
        let next = Self {
            cash: self.cash + size * price,
            position_size: 0.0,
            entry_price: None,
            ..self
        };
        Ok((next, trade_profit))
    }
}
