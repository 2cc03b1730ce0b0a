//! Ledger positions and closed trades.

use chrono::{DateTime, Utc};

use super::bar::Side;

/// An open position in the simulated account.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    pub quantity: f64,
    pub entry_time: DateTime<Utc>,
}

impl Position {
    pub fn is_long(&self) -> bool {
        self.side == Side::Buy
    }

    pub fn is_short(&self) -> bool {
        self.side == Side::Sell
    }

    pub fn notional(&self) -> f64 {
        self.entry_price * self.quantity
    }

    /// Price move in the position's favour times quantity, before commission.
    pub fn gross_pnl(&self, price: f64) -> f64 {
        match self.side {
            Side::Buy => (price - self.entry_price) * self.quantity,
            Side::Sell => (self.entry_price - price) * self.quantity,
        }
    }
}

/// A completed round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    /// Net of the exit commission.
    pub profit: f64,
    pub profit_percent: f64,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.profit > 0.0
    }
}
